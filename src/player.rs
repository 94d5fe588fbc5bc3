// Player agent: continuous position steered in four directions, stopped by walls
//
// Ghosts only ever read the player's position. Turns are taken once the player is
// close enough to the lane centre of its cell, which keeps its cell-sized box inside
// the corridors.

use crate::grid::{grid_of, pixel_center_of, CollisionMap};
use crate::types::{Direction, Position, Rect};

#[derive(Debug, Clone)]
pub struct Player {
    position: Position,
    speed: f32,
    cell_size: f32,
    heading: Option<Direction>,
    queued: Option<Direction>,
}

impl Player {
    pub fn new(spawn: Position, speed: f32, cell_size: f32) -> Self {
        Player {
            position: spawn,
            speed,
            cell_size,
            heading: None,
            queued: None,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Direction currently being travelled, None while stopped
    pub fn heading(&self) -> Option<Direction> {
        self.heading
    }

    /// Steering request still waiting for a lane to open
    pub fn queued(&self) -> Option<Direction> {
        self.queued
    }

    /// Bounding box of side `cell_size` centred on the player
    pub fn rect(&self) -> Rect {
        Rect::centered(self.position, self.cell_size)
    }

    /// Requests a turn; it is taken on the first tick the lane allows it
    pub fn steer(&mut self, direction: Direction) {
        self.queued = Some(direction);
    }

    /// Advances one tick
    ///
    /// # Returns
    /// `true` if the player moved
    pub fn update<M: CollisionMap>(&mut self, map: &M) -> bool {
        if let Some(turn) = self.queued {
            if self.heading == Some(turn) {
                self.queued = None;
            } else if let Some(aligned) = self.aligned_for(turn) {
                if !map.check_collision(&self.box_after(aligned, turn)) {
                    self.position = aligned;
                    self.heading = Some(turn);
                    self.queued = None;
                }
            }
        }

        let heading = match self.heading {
            Some(h) => h,
            None => return false,
        };

        if map.check_collision(&self.box_after(self.position, heading)) {
            // Come to rest flush with the wall, on the lane centre
            self.position = self.lane_center();
            self.heading = None;
            return false;
        }

        let (dx, dy) = heading.delta();
        self.position = self
            .position
            .offset(dx as f32 * self.speed, dy as f32 * self.speed);
        true
    }

    fn lane_center(&self) -> Position {
        pixel_center_of(grid_of(self.position, self.cell_size), self.cell_size)
    }

    /// Position snapped onto the lane for `turn`, if the player is within one step of it
    fn aligned_for(&self, turn: Direction) -> Option<Position> {
        let center = self.lane_center();
        if turn.is_horizontal() {
            if (self.position.y - center.y).abs() <= self.speed {
                return Some(Position::new(self.position.x, center.y));
            }
        } else if (self.position.x - center.x).abs() <= self.speed {
            return Some(Position::new(center.x, self.position.y));
        }
        None
    }

    fn box_after(&self, from: Position, direction: Direction) -> Rect {
        let (dx, dy) = direction.delta();
        Rect::centered(
            from.offset(dx as f32 * self.speed, dy as f32 * self.speed),
            self.cell_size,
        )
    }
}
