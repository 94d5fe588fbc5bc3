// Headless ghost chase runner
//
// Usage:
//   cargo run --bin ghost-chase -- [options]
//
// Options:
//   --config <path>   Path to Chase.toml (default: Chase.toml)
//   --maze <path>     Override the maze layout file
//   --ticks <n>       Override timing.max_ticks
//   --seed <n>        Override simulation.seed
//   --games <n>       Play n consecutive levels (default: 1)
//   --trace           Write a JSONL tick trace (debug.log_file_path)
//   --debug           Capture ghost overlays in the trace

use log::info;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use std::env;
use std::process;

use ghost_chase::config::Config;
use ghost_chase::types::Direction;
use ghost_chase::world::{Outcome, World};

/// One in this many ticks the autopilot picks a new heading even while moving
const AUTOPILOT_TURN_ODDS: u32 = 40;

fn print_usage() {
    eprintln!("Ghost Chase headless runner");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("  ghost-chase [OPTIONS]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("  --config <path>   Path to Chase.toml (default: Chase.toml)");
    eprintln!("  --maze <path>     Override the maze layout file");
    eprintln!("  --ticks <n>       Override timing.max_ticks");
    eprintln!("  --seed <n>        Override simulation.seed");
    eprintln!("  --games <n>       Play n consecutive levels (default: 1)");
    eprintln!("  --trace           Write a JSONL tick trace");
    eprintln!("  --debug           Capture ghost overlays in the trace");
    eprintln!("  --help            Show this help message");
}

fn parse_number<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> T
where
    T::Err: std::fmt::Display,
{
    let value = match value {
        Some(v) => v,
        None => {
            eprintln!("Error: {} requires an argument", flag);
            process::exit(1);
        }
    };
    value.parse::<T>().unwrap_or_else(|e| {
        eprintln!("Error: invalid value '{}' for {}: {}", value, flag, e);
        process::exit(1);
    })
}

/// Random steering: pick a new heading when stopped, and occasionally while moving
fn autopilot<R: Rng>(world: &World, rng: &mut R) -> Option<Direction> {
    let stopped = world.player().heading().is_none();
    if stopped || rng.random_range(0..AUTOPILOT_TURN_ODDS) == 0 {
        Direction::all().choose(rng).copied()
    } else {
        None
    }
}

fn main() {
    // Info unless RUST_LOG says otherwise
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }

    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.contains(&"--help".to_string()) {
        print_usage();
        process::exit(0);
    }

    let mut config_path = "Chase.toml".to_string();
    let mut maze_path = None;
    let mut max_ticks = None;
    let mut seed = None;
    let mut games: u32 = 1;
    let mut trace = false;
    let mut debug = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                config_path = match args.get(i + 1) {
                    Some(path) => path.clone(),
                    None => {
                        eprintln!("Error: --config requires an argument");
                        process::exit(1);
                    }
                };
                i += 1;
            }
            "--maze" => {
                maze_path = args.get(i + 1).cloned();
                if maze_path.is_none() {
                    eprintln!("Error: --maze requires an argument");
                    process::exit(1);
                }
                i += 1;
            }
            "--ticks" => {
                max_ticks = Some(parse_number::<u64>("--ticks", args.get(i + 1)));
                i += 1;
            }
            "--seed" => {
                seed = Some(parse_number::<u64>("--seed", args.get(i + 1)));
                i += 1;
            }
            "--games" => {
                games = parse_number::<u32>("--games", args.get(i + 1)).max(1);
                i += 1;
            }
            "--trace" => trace = true,
            "--debug" => debug = true,
            _ => {
                eprintln!("Error: Unknown option '{}'", args[i]);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut config = if config_path == "Chase.toml" {
        Config::load_or_default()
    } else {
        Config::from_file(&config_path).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        })
    };
    if let Some(path) = maze_path {
        config.simulation.maze_path = path;
    }
    if let Some(ticks) = max_ticks {
        config.timing.max_ticks = ticks;
    }
    if let Some(seed) = seed {
        config.simulation.seed = seed;
    }
    config.debug.enabled |= trace;
    config.ghosts.debug |= debug;

    let max_ticks = config.timing.max_ticks;
    let mut pilot = StdRng::seed_from_u64(config.simulation.seed.wrapping_add(1));

    let mut world = match World::from_config(config) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("Error: could not build world: {}", e);
            process::exit(1);
        }
    };

    info!(
        "Starting {} game(s): {} ghosts, {} dots, cell size {}",
        games,
        world.registry().len(),
        world.maze().dots_remaining(),
        world.cell_size()
    );

    let mut cleared = 0;
    let mut captured = 0;
    for game in 1..=games {
        if game > 1 {
            if let Err(e) = world.reset() {
                eprintln!("Error: could not reset world: {}", e);
                process::exit(1);
            }
        }

        let mut outcome = Outcome::Running;
        while world.tick_count() < max_ticks && !outcome.is_over() {
            let input = autopilot(&world, &mut pilot);
            outcome = world.tick(input);
        }

        match &outcome {
            Outcome::Cleared => cleared += 1,
            Outcome::Captured { .. } => captured += 1,
            Outcome::Running => {}
        }

        let searches: u64 = world.registry().iter().map(|(_, g)| g.searches()).sum();
        println!(
            "Game {}: {:?} after {} ticks ({:.1}s), score {}, {} dots left, {} searches",
            game,
            outcome,
            world.tick_count(),
            world.now_secs(),
            world.score(),
            world.maze().dots_remaining(),
            searches
        );
    }

    println!();
    println!(
        "Summary: {} game(s), {} cleared, {} captured, {} timed out",
        games,
        cleared,
        captured,
        games - cleared - captured
    );
}
