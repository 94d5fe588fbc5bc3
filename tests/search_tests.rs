//! Search Engine Tests
//!
//! Runs the four strategies against real maze layouts through the shared
//! neighbor query, checking path validity, optimality and the unreachable case.

use std::collections::{HashMap, HashSet};

use ghost_chase::grid::{grid_of, pixel_center_of, NeighborQuery};
use ghost_chase::maze::Maze;
use ghost_chase::search::{SearchOutcome, SearchStrategy};
use ghost_chase::types::{Cell, Position};

const CELL: f32 = 20.0;

fn search(maze: &Maze, strategy: SearchStrategy, start: Cell, goal: Cell) -> SearchOutcome {
    let occupied = HashSet::new();
    let blocked = HashMap::new();
    let query = NeighborQuery::new(maze, maze.cell_size(), &occupied, &blocked, 0.0);
    strategy.find_path(start, goal, |cell| query.neighbors(cell))
}

fn assert_valid_path(maze: &Maze, path: &[Cell], start: Cell, goal: Cell) {
    assert_eq!(path.first(), Some(&start), "path must start at the start cell");
    assert_eq!(path.last(), Some(&goal), "path must end at the goal cell");
    for pair in path.windows(2) {
        assert_eq!(
            pair[0].manhattan_distance(&pair[1]),
            1,
            "{} -> {} is not a single step",
            pair[0],
            pair[1]
        );
    }
    for cell in path {
        assert!(!maze.is_wall(*cell), "path crosses wall at {}", cell);
    }
}

fn open_grid() -> Maze {
    Maze::from_layout(&[".....", ".....", ".....", ".....", "....."], CELL).unwrap()
}

fn classic() -> Maze {
    let layout = Maze::load_layout("mazes/classic.txt").expect("classic maze should load");
    Maze::from_layout(&layout, 24.0).unwrap()
}

#[test]
fn test_open_grid_corner_to_corner() {
    let maze = open_grid();
    let start = Cell::new(0, 0);
    let goal = Cell::new(4, 4);
    assert_eq!(start.manhattan_distance(&goal), 8, "heuristic at start");

    for strategy in SearchStrategy::all() {
        let outcome = search(&maze, strategy, start, goal);
        assert_valid_path(&maze, &outcome.path, start, goal);
        if strategy.is_optimal() {
            assert_eq!(
                outcome.path.len(),
                9,
                "{} should find the 8-step path",
                strategy.as_str()
            );
        }
    }
}

#[test]
fn test_start_equals_goal() {
    let maze = open_grid();
    let cell = Cell::new(2, 3);
    for strategy in SearchStrategy::all() {
        let outcome = search(&maze, strategy, cell, cell);
        assert_eq!(outcome.path, vec![cell], "{} on start == goal", strategy.as_str());
    }
}

#[test]
fn test_enclosed_goal_is_unreachable() {
    let maze = Maze::from_layout(
        &[".......", "...#...", "..#.#..", "...#...", "......."],
        CELL,
    )
    .unwrap();
    let goal = Cell::new(3, 2);
    for strategy in SearchStrategy::all() {
        let outcome = search(&maze, strategy, Cell::new(0, 0), goal);
        assert!(outcome.path.is_empty(), "{} reached an enclosed cell", strategy.as_str());
        assert!(outcome.is_unreachable());
        assert_eq!(outcome.steps(), None);
        // The whole outer region was explored before giving up
        assert_eq!(outcome.expanded(), 35 - 5);
    }
}

#[test]
fn test_optimal_strategies_agree_on_classic_maze() {
    let maze = classic();
    let open = maze.open_cells();
    let pairs = [
        (open[0], open[open.len() - 1]),
        (open[10], open[200]),
        (open[57], open[311]),
        (open[150], open[151]),
        (open[300], open[20]),
    ];

    for (start, goal) in pairs {
        let bfs = search(&maze, SearchStrategy::Bfs, start, goal);
        assert_valid_path(&maze, &bfs.path, start, goal);
        let shortest = bfs.steps();

        for strategy in [SearchStrategy::Ucs, SearchStrategy::AStar] {
            let outcome = search(&maze, strategy, start, goal);
            assert_valid_path(&maze, &outcome.path, start, goal);
            assert_eq!(
                outcome.steps(),
                shortest,
                "{} path from {} to {} is not shortest",
                strategy.as_str(),
                start,
                goal
            );
        }

        let dfs = search(&maze, SearchStrategy::Dfs, start, goal);
        assert_valid_path(&maze, &dfs.path, start, goal);
        assert!(dfs.steps() >= shortest);
    }
}

#[test]
fn test_astar_never_expands_more_than_ucs() {
    let maze = classic();
    let open = maze.open_cells();
    for i in (0..open.len()).step_by(23) {
        let start = open[i];
        let goal = open[(i * 7 + 101) % open.len()];
        let ucs = search(&maze, SearchStrategy::Ucs, start, goal);
        let astar = search(&maze, SearchStrategy::AStar, start, goal);
        assert!(
            astar.expanded() <= ucs.expanded(),
            "A* expanded {} vs UCS {} from {} to {}",
            astar.expanded(),
            ucs.expanded(),
            start,
            goal
        );
    }
}

#[test]
fn test_search_is_deterministic() {
    let maze = classic();
    let open = maze.open_cells();
    let (start, goal) = (open[5], open[250]);
    for strategy in SearchStrategy::all() {
        let first = search(&maze, strategy, start, goal);
        let second = search(&maze, strategy, start, goal);
        assert_eq!(first.path, second.path);
        assert_eq!(first.explored, second.explored);
    }
}

#[test]
fn test_pixel_round_trip_is_idempotent() {
    for &(x, y) in &[(0.0, 0.0), (19.9, 5.0), (20.0, 20.0), (137.5, 88.1), (399.0, 1.0)] {
        let cell = grid_of(Position::new(x, y), CELL);
        let center = pixel_center_of(cell, CELL);
        assert_eq!(grid_of(center, CELL), cell, "round trip drifted for ({}, {})", x, y);
        assert_eq!(pixel_center_of(grid_of(center, CELL), CELL), center);
    }
}
