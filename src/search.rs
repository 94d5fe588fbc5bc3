// Search engine: four interchangeable path searches over a neighbor function
//
// All strategies share one contract: given a start cell, a goal cell and a neighbor
// function, return the cell sequence start..=goal, or an empty sequence when the goal
// cannot be reached. An empty path is an ordinary outcome, never an error.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

use crate::types::Cell;

/// Path search algorithm used by an agent
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SearchStrategy {
    /// Breadth-first: FIFO frontier, shortest on unit-cost grids
    Bfs,
    /// Depth-first: LIFO frontier, some valid path but rarely the shortest
    Dfs,
    /// Uniform-cost: min-heap keyed by accumulated cost
    Ucs,
    /// A*: min-heap keyed by cost + Manhattan distance to goal
    AStar,
}

/// Result of one search call
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// start..=goal inclusive, or empty if unreachable
    pub path: Vec<Cell>,
    /// Cells expanded, in expansion order
    pub explored: Vec<Cell>,
}

impl SearchOutcome {
    /// Number of nodes expanded by the search
    pub fn expanded(&self) -> usize {
        self.explored.len()
    }

    pub fn is_unreachable(&self) -> bool {
        self.path.is_empty()
    }

    /// Edge count of the path (cells - 1), or None if unreachable
    pub fn steps(&self) -> Option<usize> {
        self.path.len().checked_sub(1)
    }
}

impl SearchStrategy {
    pub fn all() -> [SearchStrategy; 4] {
        [
            SearchStrategy::Bfs,
            SearchStrategy::Dfs,
            SearchStrategy::Ucs,
            SearchStrategy::AStar,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStrategy::Bfs => "bfs",
            SearchStrategy::Dfs => "dfs",
            SearchStrategy::Ucs => "ucs",
            SearchStrategy::AStar => "astar",
        }
    }

    /// Whether this strategy always returns a shortest path on a unit-cost grid
    pub fn is_optimal(&self) -> bool {
        !matches!(self, SearchStrategy::Dfs)
    }

    /// Finds a path from `start` to `goal`, expanding nodes through `neighbors`
    ///
    /// # Arguments
    /// * `start` - the agent's current cell (first element of the path)
    /// * `goal` - the target's cell (last element of the path)
    /// * `neighbors` - passable 4-connected neighbors of a cell
    pub fn find_path<F>(&self, start: Cell, goal: Cell, neighbors: F) -> SearchOutcome
    where
        F: FnMut(Cell) -> Vec<Cell>,
    {
        match self {
            SearchStrategy::Bfs => breadth_first(start, goal, neighbors),
            SearchStrategy::Dfs => depth_first(start, goal, neighbors),
            SearchStrategy::Ucs => best_first(start, goal, neighbors, |_| 0),
            SearchStrategy::AStar => {
                best_first(start, goal, neighbors, |cell| cell.manhattan_distance(&goal))
            }
        }
    }
}

fn breadth_first<F>(start: Cell, goal: Cell, mut neighbors: F) -> SearchOutcome
where
    F: FnMut(Cell) -> Vec<Cell>,
{
    let mut frontier = VecDeque::new();
    let mut visited = HashSet::new();
    let mut parents = HashMap::new();
    let mut explored = Vec::new();

    frontier.push_back(start);
    visited.insert(start);

    while let Some(current) = frontier.pop_front() {
        explored.push(current);

        if current == goal {
            return SearchOutcome {
                path: reconstruct(&parents, start, goal),
                explored,
            };
        }

        // Visited at insertion time so no cell enters the frontier twice
        for next in neighbors(current) {
            if visited.insert(next) {
                parents.insert(next, current);
                frontier.push_back(next);
            }
        }
    }

    SearchOutcome {
        path: Vec::new(),
        explored,
    }
}

fn depth_first<F>(start: Cell, goal: Cell, mut neighbors: F) -> SearchOutcome
where
    F: FnMut(Cell) -> Vec<Cell>,
{
    let mut frontier = vec![start];
    let mut visited = HashSet::new();
    let mut parents = HashMap::new();
    let mut explored = Vec::new();

    visited.insert(start);

    while let Some(current) = frontier.pop() {
        explored.push(current);

        if current == goal {
            return SearchOutcome {
                path: reconstruct(&parents, start, goal),
                explored,
            };
        }

        for next in neighbors(current) {
            if visited.insert(next) {
                parents.insert(next, current);
                frontier.push(next);
            }
        }
    }

    SearchOutcome {
        path: Vec::new(),
        explored,
    }
}

/// Shared driver for UCS (zero heuristic) and A* (Manhattan heuristic).
/// Unit step cost; frontier keyed by (g + h, insertion sequence).
fn best_first<F, H>(start: Cell, goal: Cell, mut neighbors: F, heuristic: H) -> SearchOutcome
where
    F: FnMut(Cell) -> Vec<Cell>,
    H: Fn(Cell) -> u32,
{
    let mut frontier = BinaryHeap::new();
    let mut best_cost: HashMap<Cell, u32> = HashMap::new();
    let mut parents = HashMap::new();
    let mut closed = HashSet::new();
    let mut explored = Vec::new();
    let mut sequence: u64 = 0;

    best_cost.insert(start, 0);
    frontier.push(Reverse((heuristic(start), sequence, 0u32, start)));

    while let Some(Reverse((_, _, cost, current))) = frontier.pop() {
        // Stale entry: the cell was already settled at a cost no greater than this one
        if closed.contains(&current) || best_cost.get(&current).map_or(false, |&c| c < cost) {
            continue;
        }
        closed.insert(current);
        explored.push(current);

        if current == goal {
            return SearchOutcome {
                path: reconstruct(&parents, start, goal),
                explored,
            };
        }

        for next in neighbors(current) {
            if closed.contains(&next) {
                continue;
            }
            let next_cost = cost + 1;
            let improves = best_cost.get(&next).map_or(true, |&known| next_cost < known);
            if improves {
                best_cost.insert(next, next_cost);
                parents.insert(next, current);
                sequence += 1;
                frontier.push(Reverse((
                    next_cost + heuristic(next),
                    sequence,
                    next_cost,
                    next,
                )));
            }
        }
    }

    SearchOutcome {
        path: Vec::new(),
        explored,
    }
}

/// Walks parent pointers back from `goal` and reverses
fn reconstruct(parents: &HashMap<Cell, Cell>, start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut node = goal;
    while node != start {
        match parents.get(&node) {
            Some(parent) => {
                node = *parent;
                path.push(node);
            }
            None => return Vec::new(),
        }
    }
    path.reverse();
    path
}
