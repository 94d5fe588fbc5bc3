// Grid adapter: pixel <-> cell conversion and neighbor expansion
//
// Every search algorithm expands nodes through `NeighborQuery::neighbors`, so wall,
// peer and blocked-cell filtering apply identically to all of them.

use std::collections::{HashMap, HashSet};

use crate::types::{Cell, Direction, Position, Rect};

/// What the core needs from a maze: wall collision over arbitrary rects plus grid bounds
pub trait CollisionMap {
    /// True if `rect` overlaps any wall
    fn check_collision(&self, rect: &Rect) -> bool;

    /// Number of grid columns
    fn columns(&self) -> i32;

    /// Number of grid rows
    fn rows(&self) -> i32;

    fn in_bounds(&self, cell: Cell) -> bool {
        cell.col >= 0 && cell.row >= 0 && cell.col < self.columns() && cell.row < self.rows()
    }
}

/// Cell containing pixel position (x, y)
pub fn grid_of(position: Position, cell_size: f32) -> Cell {
    Cell {
        col: (position.x / cell_size).floor() as i32,
        row: (position.y / cell_size).floor() as i32,
    }
}

/// Pixel centre of `cell`
pub fn pixel_center_of(cell: Cell, cell_size: f32) -> Position {
    Position {
        x: cell.col as f32 * cell_size + cell_size / 2.0,
        y: cell.row as f32 * cell_size + cell_size / 2.0,
    }
}

/// Bounding box of side `cell_size` centred on `cell`
pub fn cell_rect(cell: Cell, cell_size: f32) -> Rect {
    Rect::centered(pixel_center_of(cell, cell_size), cell_size)
}

/// A read-only view of everything that decides whether a cell may be entered
/// by one particular agent during one search.
pub struct NeighborQuery<'a, M: CollisionMap> {
    map: &'a M,
    cell_size: f32,
    occupied: &'a HashSet<Cell>,
    blocked: &'a HashMap<Cell, f64>,
    now: f64,
    goal: Option<Cell>,
}

impl<'a, M: CollisionMap> NeighborQuery<'a, M> {
    /// # Arguments
    /// * `occupied` - cells held by other agents (snapshot taken at tick start)
    /// * `blocked` - the querying agent's own blocked cells, keyed to expiry time
    /// * `now` - simulation time used to honour block expiry
    pub fn new(
        map: &'a M,
        cell_size: f32,
        occupied: &'a HashSet<Cell>,
        blocked: &'a HashMap<Cell, f64>,
        now: f64,
    ) -> Self {
        NeighborQuery {
            map,
            cell_size,
            occupied,
            blocked,
            now,
            goal: None,
        }
    }

    /// Exempts the search goal from occupancy filtering so agents can converge on it
    pub fn with_goal(mut self, goal: Cell) -> Self {
        self.goal = Some(goal);
        self
    }

    /// Valid 4-connected neighbors of `cell`, in up/right/down/left order
    pub fn neighbors(&self, cell: Cell) -> Vec<Cell> {
        Direction::all()
            .iter()
            .map(|dir| cell.step(*dir))
            .filter(|next| self.is_passable(*next))
            .collect()
    }

    fn is_passable(&self, cell: Cell) -> bool {
        // Out-of-bounds cells never reach the collision query
        if !self.map.in_bounds(cell) {
            return false;
        }

        if self.map.check_collision(&cell_rect(cell, self.cell_size)) {
            return false;
        }

        if self.goal != Some(cell) && self.occupied.contains(&cell) {
            return false;
        }

        match self.blocked.get(&cell) {
            Some(expiry) => self.now >= *expiry,
            None => true,
        }
    }
}
