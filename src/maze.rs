// Maze collaborator: wall layout, dots and spawn markers built from a text grid
//
// Layout legend: '#' wall, '.' dot, any letter a spawn marker, anything else empty.

use log::info;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use crate::grid::{cell_rect, pixel_center_of, CollisionMap};
use crate::types::{Cell, Position, Rect};

/// Side length of a dot's hit box in pixels
const DOT_SIZE: f32 = 4.0;

#[derive(Debug, Clone)]
pub struct Maze {
    cell_size: f32,
    columns: i32,
    rows: i32,
    walls: Vec<Rect>,
    wall_cells: HashSet<Cell>,
    dots: Vec<Rect>,
    dots_remaining: usize,
    spawns: HashMap<char, Cell>,
}

impl Maze {
    /// Builds a maze from layout rows
    ///
    /// # Returns
    /// * `Err` if the layout has no rows or no open cells
    pub fn from_layout<S: AsRef<str>>(layout: &[S], cell_size: f32) -> Result<Self, String> {
        if layout.is_empty() {
            return Err("Maze layout is empty".to_string());
        }
        if !(cell_size > 0.0) {
            return Err(format!("Cell size must be positive, got {}", cell_size));
        }

        let mut walls = Vec::new();
        let mut wall_cells = HashSet::new();
        let mut dots = Vec::new();
        let mut spawns = HashMap::new();
        let mut columns = 0;
        let mut open_cells = 0;

        for (row, line) in layout.iter().enumerate() {
            let line = line.as_ref();
            columns = columns.max(line.chars().count() as i32);

            for (col, symbol) in line.chars().enumerate() {
                let cell = Cell::new(col as i32, row as i32);
                match symbol {
                    '#' => {
                        walls.push(Rect::new(
                            cell.col as f32 * cell_size,
                            cell.row as f32 * cell_size,
                            cell_size,
                            cell_size,
                        ));
                        wall_cells.insert(cell);
                    }
                    '.' => {
                        let center = pixel_center_of(cell, cell_size);
                        dots.push(Rect::centered(center, DOT_SIZE));
                        open_cells += 1;
                    }
                    c if c.is_ascii_alphabetic() => {
                        spawns.entry(c).or_insert(cell);
                        open_cells += 1;
                    }
                    _ => open_cells += 1,
                }
            }
        }

        if open_cells == 0 {
            return Err("Maze layout has no open cells".to_string());
        }

        let dots_remaining = dots.len();
        Ok(Maze {
            cell_size,
            columns,
            rows: layout.len() as i32,
            walls,
            wall_cells,
            dots,
            dots_remaining,
            spawns,
        })
    }

    /// Reads a layout file, one maze row per line, trailing whitespace trimmed
    pub fn load_layout<P: AsRef<Path>>(path: P) -> Result<Vec<String>, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| {
                format!(
                    "Failed to read maze file '{}': {}",
                    path.as_ref().display(),
                    e
                )
            })?;

        let layout: Vec<String> = contents
            .lines()
            .map(|line| line.trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        info!(
            "Loaded maze layout from {} ({} rows)",
            path.as_ref().display(),
            layout.len()
        );
        Ok(layout)
    }

    /// Largest integral cell size that fits the whole layout on a width x height screen
    pub fn fit_cell_size<S: AsRef<str>>(width: u32, height: u32, layout: &[S]) -> f32 {
        let rows = layout.len().max(1) as u32;
        let cols = layout
            .iter()
            .map(|row| row.as_ref().chars().count())
            .max()
            .unwrap_or(1)
            .max(1) as u32;
        (width / cols).min(height / rows).max(1) as f32
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn walls(&self) -> &[Rect] {
        &self.walls
    }

    pub fn dots(&self) -> &[Rect] {
        &self.dots
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.wall_cells.contains(&cell)
    }

    /// Centre of the cell carrying spawn marker `marker`
    pub fn spawn(&self, marker: char) -> Option<Position> {
        self.spawns
            .get(&marker)
            .map(|cell| pixel_center_of(*cell, self.cell_size))
    }

    /// Every in-bounds cell that is not a wall, in row-major order
    pub fn open_cells(&self) -> Vec<Cell> {
        let mut cells = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.columns {
                let cell = Cell::new(col, row);
                if !self.wall_cells.contains(&cell) {
                    cells.push(cell);
                }
            }
        }
        cells
    }

    /// Removes every dot overlapping `rect`
    ///
    /// # Returns
    /// Number of dots consumed by this call
    pub fn check_dot_collision(&mut self, rect: &Rect) -> u32 {
        let before = self.dots.len();
        self.dots.retain(|dot| !rect.intersects(dot));
        let eaten = before - self.dots.len();
        self.dots_remaining = self.dots_remaining.saturating_sub(eaten);
        eaten as u32
    }

    pub fn dots_remaining(&self) -> usize {
        self.dots_remaining
    }

    pub fn are_all_dots_eaten(&self) -> bool {
        self.dots_remaining == 0
    }
}

impl CollisionMap for Maze {
    /// Only wall cells under the rect's footprint are tested
    fn check_collision(&self, rect: &Rect) -> bool {
        let size = self.cell_size;
        let first_col = (rect.left() / size).floor() as i32;
        let last_col = (rect.right() / size).ceil() as i32 - 1;
        let first_row = (rect.top() / size).floor() as i32;
        let last_row = (rect.bottom() / size).ceil() as i32 - 1;

        for row in first_row..=last_row {
            for col in first_col..=last_col {
                let cell = Cell::new(col, row);
                if self.wall_cells.contains(&cell) && rect.intersects(&cell_rect(cell, size)) {
                    return true;
                }
            }
        }
        false
    }

    fn columns(&self) -> i32 {
        self.columns
    }

    fn rows(&self) -> i32 {
        self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: [&str; 5] = [
        "#######",
        "#M...R#",
        "#.###.#",
        "#P...B#",
        "#######",
    ];

    #[test]
    fn test_parses_walls_dots_and_spawns() {
        let maze = Maze::from_layout(&LAYOUT, 20.0).unwrap();
        assert_eq!(maze.columns(), 7);
        assert_eq!(maze.rows(), 5);
        assert_eq!(maze.dots_remaining(), 8);
        assert!(maze.is_wall(Cell::new(3, 2)));
        assert_eq!(maze.spawn('M'), Some(Position::new(30.0, 30.0)));
        assert_eq!(maze.spawn('O'), None);
    }

    #[test]
    fn test_cell_sized_box_fits_corridor() {
        let maze = Maze::from_layout(&LAYOUT, 20.0).unwrap();
        assert!(!maze.check_collision(&cell_rect(Cell::new(2, 1), 20.0)));
        assert!(maze.check_collision(&cell_rect(Cell::new(2, 2), 20.0)));
        // Nudged one pixel into the wall row
        assert!(maze.check_collision(&Rect::new(40.0, 21.0, 20.0, 20.0)));
    }

    #[test]
    fn test_dot_collection_counts_and_removes() {
        let mut maze = Maze::from_layout(&LAYOUT, 20.0).unwrap();
        let rect = cell_rect(Cell::new(2, 1), 20.0);
        assert_eq!(maze.check_dot_collision(&rect), 1);
        assert_eq!(maze.check_dot_collision(&rect), 0);
        assert_eq!(maze.dots_remaining(), 7);
        assert!(!maze.are_all_dots_eaten());
    }

    #[test]
    fn test_empty_layout_is_rejected() {
        let empty: [&str; 0] = [];
        assert!(Maze::from_layout(&empty, 20.0).is_err());
        assert!(Maze::from_layout(&["###", "###"], 20.0).is_err());
    }

    #[test]
    fn test_fit_cell_size() {
        let layout = ["#".repeat(31), "#".repeat(31)];
        assert_eq!(Maze::fit_cell_size(744, 650, &layout), 24.0);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(Maze::load_layout("does/not/exist.txt").is_err());
    }
}
