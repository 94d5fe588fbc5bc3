// Replanning scheduler: throttles path searches to a tick-count cadence

use crate::types::Position;

/// Decides when an agent's path is stale
#[derive(Debug, Clone)]
pub struct ReplanScheduler {
    delay: u32,
    counter: u32,
    last_target: Option<Position>,
}

impl ReplanScheduler {
    /// Starts primed at the threshold so the first tick with a target plans immediately
    pub fn new(delay: u32) -> Self {
        ReplanScheduler {
            delay,
            counter: delay,
            last_target: None,
        }
    }

    pub fn delay(&self) -> u32 {
        self.delay
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn last_target(&self) -> Option<Position> {
        self.last_target
    }

    /// Counts one tick and reports whether a recompute is due
    ///
    /// Due when the target is set, the counter has reached the delay, and either the
    /// target moved since the last plan or the current path has run out.
    pub fn tick(&mut self, target: Option<Position>, path_exhausted: bool) -> bool {
        self.counter = self.counter.saturating_add(1);

        let target = match target {
            Some(t) => t,
            None => return false,
        };

        if self.counter < self.delay {
            return false;
        }

        let moved = self.last_target != Some(target);
        moved || path_exhausted
    }

    /// Records a completed recompute against `target`
    pub fn mark_planned(&mut self, target: Position) {
        self.counter = 0;
        self.last_target = Some(target);
    }

    /// Winds the counter to the threshold so the next staleness check passes the delay
    pub fn force(&mut self) {
        self.counter = self.delay;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tick_plans_immediately() {
        let mut scheduler = ReplanScheduler::new(30);
        assert!(scheduler.tick(Some(Position::new(1.0, 1.0)), true));
    }

    #[test]
    fn test_no_target_never_plans() {
        let mut scheduler = ReplanScheduler::new(1);
        for _ in 0..5 {
            assert!(!scheduler.tick(None, true));
        }
    }

    #[test]
    fn test_delay_throttles_moving_target() {
        let mut scheduler = ReplanScheduler::new(30);
        scheduler.mark_planned(Position::new(0.0, 0.0));

        for i in 1..30 {
            assert!(
                !scheduler.tick(Some(Position::new(i as f32, 0.0)), false),
                "should not replan at tick {}",
                i
            );
        }
        assert!(scheduler.tick(Some(Position::new(30.0, 0.0)), false));
    }

    #[test]
    fn test_stationary_target_with_live_path_is_not_replanned() {
        let mut scheduler = ReplanScheduler::new(3);
        let target = Position::new(5.0, 5.0);
        scheduler.mark_planned(target);
        for _ in 0..10 {
            assert!(!scheduler.tick(Some(target), false));
        }
        // Path ran out: retry at the next scheduled slot
        assert!(scheduler.tick(Some(target), true));
    }

    #[test]
    fn test_force_winds_counter_to_threshold() {
        let mut scheduler = ReplanScheduler::new(30);
        scheduler.mark_planned(Position::new(0.0, 0.0));
        scheduler.force();
        assert_eq!(scheduler.counter(), 30);
        assert!(scheduler.tick(Some(Position::new(1.0, 0.0)), false));
    }
}
