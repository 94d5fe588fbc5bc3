// Multi-agent coordination: overlap resolution between peers and per-agent
// suppression of over-visited cells

use log::debug;
use rand::Rng;
use std::collections::{HashMap, VecDeque};
use std::f32::consts::TAU;

use crate::types::{Cell, Position, Rect};

/// Rectangle overlap between two bounding boxes, measured centre to centre
pub fn boxes_overlap(a: &Rect, b: &Rect) -> bool {
    let ca = a.center();
    let cb = b.center();
    let dx = ca.x - cb.x;
    let dy = ca.y - cb.y;
    dx.abs() * 2.0 < a.w + b.w && dy.abs() * 2.0 < a.h + b.h
}

/// Sums one push of length `factor` away from each colliding peer
///
/// Coincident peers get a random unit direction so the tie still breaks.
///
/// # Returns
/// The (dx, dy) to add to `own`
pub fn separation_impulse<R: Rng>(
    own: Position,
    peers: &[Position],
    factor: f32,
    rng: &mut R,
) -> (f32, f32) {
    let mut dx = 0.0;
    let mut dy = 0.0;

    for peer in peers {
        let away_x = own.x - peer.x;
        let away_y = own.y - peer.y;
        let distance = (away_x * away_x + away_y * away_y).sqrt();

        let (ux, uy) = if distance > f32::EPSILON {
            (away_x / distance, away_y / distance)
        } else {
            let angle = rng.random_range(0.0..TAU);
            (angle.cos(), angle.sin())
        };

        dx += ux * factor;
        dy += uy * factor;
    }

    (dx, dy)
}

/// Visit-frequency history and temporary cell blocks owned by a single agent
#[derive(Debug, Clone)]
pub struct ThrashGuard {
    window: f64,
    threshold: usize,
    block_duration: f64,
    visits: HashMap<Cell, VecDeque<f64>>,
    blocked: HashMap<Cell, f64>,
    last_cell: Option<Cell>,
}

impl ThrashGuard {
    /// # Arguments
    /// * `window` - trailing time span in which visits are counted
    /// * `threshold` - a cell is blocked once its visit count exceeds this
    /// * `block_duration` - how long a block lasts
    pub fn new(window: f64, threshold: usize, block_duration: f64) -> Self {
        ThrashGuard {
            window,
            threshold,
            block_duration,
            visits: HashMap::new(),
            blocked: HashMap::new(),
            last_cell: None,
        }
    }

    /// Called every tick with the agent's cell; counts a visit only on entry
    ///
    /// # Returns
    /// The cell if this visit caused it to be blocked
    pub fn observe(&mut self, cell: Cell, now: f64) -> Option<Cell> {
        if self.last_cell == Some(cell) {
            return None;
        }
        self.last_cell = Some(cell);

        if self.record_visit(cell, now) {
            Some(cell)
        } else {
            None
        }
    }

    /// Records one visit to `cell` at `now`
    ///
    /// # Returns
    /// `true` if the cell became blocked
    pub fn record_visit(&mut self, cell: Cell, now: f64) -> bool {
        let window = self.window;
        let history = self.visits.entry(cell).or_default();
        history.push_back(now);
        while let Some(&oldest) = history.front() {
            if now - oldest > window {
                history.pop_front();
            } else {
                break;
            }
        }

        if history.len() <= self.threshold || self.blocked.contains_key(&cell) {
            return false;
        }

        history.clear();
        let expiry = now + self.block_duration;
        self.blocked.insert(cell, expiry);
        debug!("Blocking over-visited cell {} until t={:.2}", cell, expiry);
        true
    }

    /// Visits to `cell` inside the trailing window ending at `now`
    pub fn visits_in_window(&self, cell: Cell, now: f64) -> usize {
        self.visits
            .get(&cell)
            .map(|h| h.iter().filter(|&&t| now - t <= self.window).count())
            .unwrap_or(0)
    }

    /// Drops blocks whose expiry has passed
    ///
    /// # Returns
    /// The cells that were unblocked
    pub fn sweep(&mut self, now: f64) -> Vec<Cell> {
        let expired: Vec<Cell> = self
            .blocked
            .iter()
            .filter(|(_, expiry)| now >= **expiry)
            .map(|(cell, _)| *cell)
            .collect();

        for cell in &expired {
            self.blocked.remove(cell);
            debug!("Unblocking cell {} at t={:.2}", cell, now);
        }
        expired
    }

    pub fn is_blocked(&self, cell: Cell, now: f64) -> bool {
        self.blocked.get(&cell).map_or(false, |&expiry| now < expiry)
    }

    /// Blocked cells keyed to their expiry time
    pub fn blocked(&self) -> &HashMap<Cell, f64> {
        &self.blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_overlap_is_rectangular_not_circular() {
        let a = Rect::centered(Position::new(0.0, 0.0), 20.0);
        // Diagonal offset: circles of radius 10 would not touch, squares do
        let b = Rect::centered(Position::new(15.0, 15.0), 20.0);
        assert!(boxes_overlap(&a, &b));

        let c = Rect::centered(Position::new(20.0, 0.0), 20.0);
        assert!(!boxes_overlap(&a, &c), "touching edges do not overlap");
    }

    #[test]
    fn test_impulse_points_away_from_peer() {
        let mut rng = StdRng::seed_from_u64(7);
        let (dx, dy) = separation_impulse(
            Position::new(10.0, 0.0),
            &[Position::new(0.0, 0.0)],
            20.0,
            &mut rng,
        );
        assert_eq!((dx, dy), (20.0, 0.0));
    }

    #[test]
    fn test_impulses_compound_per_peer() {
        let mut rng = StdRng::seed_from_u64(7);
        let (dx, dy) = separation_impulse(
            Position::new(0.0, 0.0),
            &[Position::new(-5.0, 0.0), Position::new(-1.0, 0.0)],
            10.0,
            &mut rng,
        );
        assert_eq!((dx, dy), (20.0, 0.0));
    }

    #[test]
    fn test_coincident_peer_gets_unit_push() {
        let mut rng = StdRng::seed_from_u64(42);
        let own = Position::new(5.0, 5.0);
        let (dx, dy) = separation_impulse(own, &[own], 20.0, &mut rng);
        let magnitude = (dx * dx + dy * dy).sqrt();
        assert!((magnitude - 20.0).abs() < 1e-3, "magnitude was {}", magnitude);
    }

    #[test]
    fn test_fourth_visit_in_window_blocks() {
        let mut guard = ThrashGuard::new(2.0, 3, 5.0);
        let cell = Cell::new(3, 3);
        assert!(!guard.record_visit(cell, 0.0));
        assert!(!guard.record_visit(cell, 0.5));
        assert!(!guard.record_visit(cell, 1.0));
        assert!(guard.record_visit(cell, 1.5));
        assert!(guard.is_blocked(cell, 1.5));
        assert_eq!(guard.blocked().get(&cell), Some(&6.5));
    }

    #[test]
    fn test_old_visits_age_out() {
        let mut guard = ThrashGuard::new(2.0, 3, 5.0);
        let cell = Cell::new(1, 1);
        guard.record_visit(cell, 0.0);
        guard.record_visit(cell, 0.5);
        guard.record_visit(cell, 1.0);
        assert!(
            !guard.record_visit(cell, 2.6),
            "visit at t=0.0 and 0.5 fell out of the window"
        );
        assert_eq!(guard.visits_in_window(cell, 2.6), 2);
    }

    #[test]
    fn test_dwelling_in_a_cell_is_one_visit() {
        let mut guard = ThrashGuard::new(2.0, 3, 5.0);
        let cell = Cell::new(0, 0);
        for tick in 0..10 {
            assert_eq!(guard.observe(cell, tick as f64 * 0.1), None);
        }
        assert_eq!(guard.visits_in_window(cell, 1.0), 1);
    }

    #[test]
    fn test_sweep_releases_expired_blocks() {
        let mut guard = ThrashGuard::new(2.0, 0, 5.0);
        let cell = Cell::new(2, 2);
        assert!(guard.record_visit(cell, 1.0));
        assert!(guard.sweep(5.9).is_empty());
        assert_eq!(guard.sweep(6.0), vec![cell]);
        assert!(!guard.is_blocked(cell, 6.0));
    }
}
