// Agent motion: follows a path one cell at a time with a bounded per-tick step

use serde::Serialize;

use crate::grid::pixel_center_of;
use crate::types::{Cell, Direction, Position};

/// Immutable cell sequence with a cursor marking the cell the agent last departed from.
/// Recomputing a path always builds a new `Path`; the cursor never rewinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Path {
    cells: Vec<Cell>,
    cursor: usize,
}

impl Path {
    pub fn new(cells: Vec<Cell>) -> Self {
        Path { cells, cursor: 0 }
    }

    pub fn empty() -> Self {
        Path::default()
    }

    /// Cells not yet departed from; head is the agent's current cell
    pub fn remaining(&self) -> &[Cell] {
        &self.cells[self.cursor.min(self.cells.len())..]
    }

    /// The whole path as computed, including cells already passed
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cells already departed from
    pub fn traversed(&self) -> &[Cell] {
        &self.cells[..self.cursor.min(self.cells.len())]
    }

    pub fn current(&self) -> Option<Cell> {
        self.remaining().first().copied()
    }

    pub fn next(&self) -> Option<Cell> {
        self.remaining().get(1).copied()
    }

    pub fn goal(&self) -> Option<Cell> {
        self.cells.last().copied()
    }

    /// True when there is nothing left to follow (arrived or no path)
    pub fn is_exhausted(&self) -> bool {
        self.remaining().len() < 2
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Departs the current cell: `next` becomes `current`
    pub fn advance(&mut self) {
        if self.cursor < self.cells.len() {
            self.cursor += 1;
        }
    }
}

/// Per-agent motion state
#[derive(Debug, Clone)]
pub struct Motion {
    speed: f32,
    facing: Direction,
}

impl Motion {
    pub fn new(speed: f32) -> Self {
        Motion {
            speed,
            facing: Direction::Right,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Direction label for presentation
    pub fn facing(&self) -> Direction {
        self.facing
    }

    /// Advances `position` one tick along `path`
    ///
    /// Moves toward the centre of the next cell by min(speed, remaining distance) so the
    /// agent never overshoots. Once within `speed` pixels of that centre on both axes the
    /// departed cell is dropped from the path.
    ///
    /// # Returns
    /// `true` if the path cursor advanced this tick
    pub fn step(&mut self, position: &mut Position, path: &mut Path, cell_size: f32) -> bool {
        let (current, next) = match (path.current(), path.next()) {
            (Some(current), Some(next)) => (current, next),
            _ => return false,
        };

        self.update_facing(current, next);

        let target = pixel_center_of(next, cell_size);
        let dx = target.x - position.x;
        let dy = target.y - position.y;
        let distance = (dx * dx + dy * dy).sqrt();

        if distance > 0.0 {
            let step = self.speed.min(distance);
            position.x += dx / distance * step;
            position.y += dy / distance * step;
        }

        if (position.x - target.x).abs() < self.speed && (position.y - target.y).abs() < self.speed
        {
            path.advance();
            return true;
        }
        false
    }

    /// Right/left take priority over down/up whenever the column changes
    fn update_facing(&mut self, current: Cell, next: Cell) {
        let dx = next.col - current.col;
        let dy = next.row - current.row;
        if dx > 0 {
            self.facing = Direction::Right;
        } else if dx < 0 {
            self.facing = Direction::Left;
        } else if dy > 0 {
            self.facing = Direction::Down;
        } else if dy < 0 {
            self.facing = Direction::Up;
        }
    }
}
