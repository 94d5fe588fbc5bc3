// Core value types shared by every module
// Grid cells address the maze for search; positions and rects live in pixel space

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::search::SearchStrategy;

/// Discrete (column, row) address on the maze grid
#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct Cell {
    pub col: i32,
    pub row: i32,
}

impl Cell {
    pub fn new(col: i32, row: i32) -> Self {
        Cell { col, row }
    }

    /// Manhattan distance: |dx| + |dy|
    pub fn manhattan_distance(&self, other: &Cell) -> u32 {
        ((self.col - other.col).abs() + (self.row - other.row).abs()) as u32
    }

    /// The adjacent cell one step away in `dir`
    pub fn step(&self, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        Cell {
            col: self.col + dx,
            row: self.row + dy,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// Continuous pixel-space position (y grows downward)
#[derive(Deserialize, Serialize, Debug, PartialEq, Clone, Copy, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Position { x, y }
    }

    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Axis-aligned rectangle in pixel space, anchored at its top-left corner
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Rect { x, y, w, h }
    }

    /// Square of side `side` centred on `center`
    pub fn centered(center: Position, side: f32) -> Self {
        Rect {
            x: center.x - side / 2.0,
            y: center.y - side / 2.0,
            w: side,
            h: side,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Position {
        Position {
            x: self.x + self.w / 2.0,
            y: self.y + self.h / 2.0,
        }
    }

    /// Strict overlap test; rectangles that only share an edge do not collide
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

/// The four grid directions, listed in neighbor-expansion order
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// Up, right, down, left. Searches without a total-order priority depend on this order.
    pub fn all() -> [Direction; 4] {
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left]
    }

    /// Unit (dx, dy) in grid space
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Right => (1, 0),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// The ghost roster; each kind hunts with its own search strategy
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GhostKind {
    Red,
    Pink,
    Blue,
    Orange,
}

impl GhostKind {
    pub fn all() -> [GhostKind; 4] {
        [GhostKind::Red, GhostKind::Pink, GhostKind::Blue, GhostKind::Orange]
    }

    pub fn strategy(&self) -> SearchStrategy {
        match self {
            GhostKind::Red => SearchStrategy::AStar,
            GhostKind::Pink => SearchStrategy::Dfs,
            GhostKind::Blue => SearchStrategy::Bfs,
            GhostKind::Orange => SearchStrategy::Ucs,
        }
    }

    /// Layout letter marking this ghost's spawn cell
    pub fn marker(&self) -> char {
        match self {
            GhostKind::Red => 'R',
            GhostKind::Pink => 'P',
            GhostKind::Blue => 'B',
            GhostKind::Orange => 'O',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GhostKind::Red => "red",
            GhostKind::Pink => "pink",
            GhostKind::Blue => "blue",
            GhostKind::Orange => "orange",
        }
    }
}
