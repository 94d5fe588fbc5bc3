// Strategy comparison tool: runs all four searches over random cell pairs of a maze
//
// Usage:
//   cargo run --release --bin compare_strategies -- [maze_file] [options]
//
// Options:
//   --pairs <n>      Number of (start, goal) pairs to sample (default: 2000)
//   --seed <n>       Sampling seed (default: simulation.seed from Chase.toml)
//   --config <path>  Path to Chase.toml (default: Chase.toml)
//
// Pairs are searched in parallel on the rayon thread pool. Searches see walls only,
// with no peers or blocked cells.

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::env;
use std::process;
use std::time::Instant;

use ghost_chase::config::Config;
use ghost_chase::grid::NeighborQuery;
use ghost_chase::maze::Maze;
use ghost_chase::search::{SearchOutcome, SearchStrategy};
use ghost_chase::types::Cell;

/// Outcomes of all four strategies on one pair, in `SearchStrategy::all()` order
struct PairResult {
    outcomes: Vec<SearchOutcome>,
    micros: Vec<u128>,
}

#[derive(Default)]
struct StrategyStats {
    solved: usize,
    total_steps: usize,
    total_expanded: usize,
    total_micros: u128,
    longer_than_shortest: usize,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let mut maze_path = None;
    let mut config_path = "Chase.toml".to_string();
    let mut pairs: usize = 2000;
    let mut seed = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pairs" | "--seed" | "--config" if i + 1 >= args.len() => {
                eprintln!("Error: {} requires an argument", args[i]);
                process::exit(1);
            }
            "--pairs" => {
                pairs = args[i + 1].parse().unwrap_or_else(|e| {
                    eprintln!("Error: invalid pair count '{}': {}", args[i + 1], e);
                    process::exit(1);
                });
                i += 1;
            }
            "--seed" => {
                seed = Some(args[i + 1].parse::<u64>().unwrap_or_else(|e| {
                    eprintln!("Error: invalid seed '{}': {}", args[i + 1], e);
                    process::exit(1);
                }));
                i += 1;
            }
            "--config" => {
                config_path = args[i + 1].clone();
                i += 1;
            }
            "--help" => {
                eprintln!(
                    "Usage: compare_strategies [maze_file] [--pairs N] [--seed N] [--config PATH]"
                );
                process::exit(0);
            }
            other if !other.starts_with("--") && maze_path.is_none() => {
                maze_path = Some(other.to_string());
            }
            other => {
                eprintln!("Error: Unknown option '{}'", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = Config::from_file(&config_path).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from '{}': {}", config_path, e);
        eprintln!("Using default configuration");
        Config::default_hardcoded()
    });
    let maze_path = maze_path.unwrap_or_else(|| config.simulation.maze_path.clone());
    let seed = seed.unwrap_or(config.simulation.seed);

    let layout = match Maze::load_layout(&maze_path) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    let cell_size = Maze::fit_cell_size(config.screen.width, config.screen.height, &layout);
    let maze = match Maze::from_layout(&layout, cell_size) {
        Ok(maze) => maze,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let open = maze.open_cells();
    let mut rng = StdRng::seed_from_u64(seed);
    let sampled: Vec<(Cell, Cell)> = (0..pairs)
        .filter_map(|_| {
            let start = *open.choose(&mut rng)?;
            let goal = *open.choose(&mut rng)?;
            Some((start, goal))
        })
        .collect();

    println!(
        "Maze {} ({} open cells), {} pairs, {} threads",
        maze_path,
        open.len(),
        sampled.len(),
        rayon::current_num_threads()
    );

    let occupied: HashSet<Cell> = HashSet::new();
    let blocked: HashMap<Cell, f64> = HashMap::new();
    let started = Instant::now();

    let results: Vec<PairResult> = sampled
        .par_iter()
        .map(|&(start, goal)| {
            let query = NeighborQuery::new(&maze, cell_size, &occupied, &blocked, 0.0);
            let mut outcomes = Vec::with_capacity(4);
            let mut micros = Vec::with_capacity(4);
            for strategy in SearchStrategy::all() {
                let t0 = Instant::now();
                outcomes.push(strategy.find_path(start, goal, |cell| query.neighbors(cell)));
                micros.push(t0.elapsed().as_micros());
            }
            PairResult { outcomes, micros }
        })
        .collect();

    let wall_time = started.elapsed();
    let strategies = SearchStrategy::all();
    let mut stats: Vec<StrategyStats> =
        strategies.iter().map(|_| StrategyStats::default()).collect();
    let mut astar_over_ucs = 0;
    let mut unreachable = 0;

    for result in &results {
        // BFS is the shortest-path reference
        let shortest = result.outcomes[0].steps();
        if shortest.is_none() {
            unreachable += 1;
        }

        for (idx, outcome) in result.outcomes.iter().enumerate() {
            let entry = &mut stats[idx];
            entry.total_expanded += outcome.expanded();
            entry.total_micros += result.micros[idx];
            if let Some(steps) = outcome.steps() {
                entry.solved += 1;
                entry.total_steps += steps;
                if shortest.map_or(false, |s| steps > s) {
                    entry.longer_than_shortest += 1;
                }
            }
        }

        let ucs = strategies.iter().position(|s| *s == SearchStrategy::Ucs);
        let astar = strategies.iter().position(|s| *s == SearchStrategy::AStar);
        if let (Some(u), Some(a)) = (ucs, astar) {
            if result.outcomes[a].expanded() > result.outcomes[u].expanded() {
                astar_over_ucs += 1;
            }
        }
    }

    println!();
    println!(
        "{:<8} {:>8} {:>10} {:>12} {:>10} {:>12}",
        "strategy", "solved", "avg steps", "avg expanded", "avg us", "non-shortest"
    );
    for (strategy, entry) in strategies.iter().zip(&stats) {
        let n = results.len().max(1) as f64;
        let avg_steps = if entry.solved > 0 {
            entry.total_steps as f64 / entry.solved as f64
        } else {
            0.0
        };
        println!(
            "{:<8} {:>8} {:>10.2} {:>12.1} {:>10.1} {:>12}",
            strategy.as_str(),
            entry.solved,
            avg_steps,
            entry.total_expanded as f64 / n,
            entry.total_micros as f64 / n,
            entry.longer_than_shortest
        );
    }

    println!();
    println!("Unreachable pairs: {}", unreachable);
    println!("Pairs where A* expanded more than UCS: {}", astar_over_ucs);
    println!("Wall time: {:.2?}", wall_time);
}
