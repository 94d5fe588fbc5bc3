// Pursuing agent: one type for every ghost, parameterised by its search strategy
//
// Per tick: the scheduler decides whether to replan, the motion controller advances
// along the current path, then the coordinator records the visit and resolves overlap
// with peers.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::coordinator::{boxes_overlap, separation_impulse, ThrashGuard};
use crate::grid::{grid_of, CollisionMap, NeighborQuery};
use crate::motion::{Motion, Path};
use crate::registry::AgentId;
use crate::scheduler::ReplanScheduler;
use crate::search::SearchStrategy;
use crate::types::{Cell, Direction, Position, Rect};

/// What an agent chases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The player agent
    Player,
    /// Another agent in the registry
    Agent(AgentId),
}

/// Tunables shared by every agent on a level
#[derive(Debug, Clone)]
pub struct AgentParams {
    pub cell_size: f32,
    pub speed: f32,
    pub replan_delay_ticks: u32,
    pub visit_window_secs: f64,
    pub visit_threshold: usize,
    pub block_duration_secs: f64,
}

/// Read-only world state an agent sees during its update
pub struct TickContext<'a, M: CollisionMap> {
    pub map: &'a M,
    pub player: Position,
    /// Simulation time in seconds
    pub now: f64,
}

/// Position of one agent as captured for peer queries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeerSnapshot {
    pub id: AgentId,
    pub position: Position,
}

/// What happened to an agent during one tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentReport {
    pub replanned: bool,
    pub advanced_cell: bool,
    /// Number of peers this agent was pushed away from
    pub separated_from: usize,
    pub newly_blocked: Option<Cell>,
}

/// Explored cells and current path for external debug rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub name: String,
    pub strategy: SearchStrategy,
    pub explored: Vec<Cell>,
    pub path: Vec<Cell>,
}

pub struct Agent {
    name: String,
    strategy: SearchStrategy,
    position: Position,
    spawn: Position,
    cell_size: f32,
    path: Path,
    target: Option<Target>,
    motion: Motion,
    scheduler: ReplanScheduler,
    guard: ThrashGuard,
    debug_mode: bool,
    explored: Vec<Cell>,
    last_expanded: usize,
    searches: u64,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        strategy: SearchStrategy,
        spawn: Position,
        params: &AgentParams,
    ) -> Self {
        Agent {
            name: name.into(),
            strategy,
            position: spawn,
            spawn,
            cell_size: params.cell_size,
            path: Path::empty(),
            target: None,
            motion: Motion::new(params.speed),
            scheduler: ReplanScheduler::new(params.replan_delay_ticks),
            guard: ThrashGuard::new(
                params.visit_window_secs,
                params.visit_threshold,
                params.block_duration_secs,
            ),
            debug_mode: false,
            explored: Vec::new(),
            last_expanded: 0,
            searches: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub fn spawn(&self) -> Position {
        self.spawn
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn grid_cell(&self) -> Cell {
        grid_of(self.position, self.cell_size)
    }

    /// Square box of side `cell_size` centred on the agent
    pub fn bounding_box(&self) -> Rect {
        Rect::centered(self.position, self.cell_size)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn target(&self) -> Option<Target> {
        self.target
    }

    pub fn set_target(&mut self, target: Option<Target>) {
        self.target = target;
    }

    pub fn facing(&self) -> Direction {
        self.motion.facing()
    }

    pub fn scheduler(&self) -> &ReplanScheduler {
        &self.scheduler
    }

    pub fn guard(&self) -> &ThrashGuard {
        &self.guard
    }

    /// Nodes expanded by the most recent search
    pub fn last_expanded(&self) -> usize {
        self.last_expanded
    }

    /// Searches run since spawn
    pub fn searches(&self) -> u64 {
        self.searches
    }

    pub fn debug_mode(&self) -> bool {
        self.debug_mode
    }

    pub fn toggle_debug(&mut self) {
        self.debug_mode = !self.debug_mode;
        if !self.debug_mode {
            self.explored.clear();
        }
    }

    /// Debug overlay, present only while debug mode is on
    pub fn overlay(&self) -> Option<Overlay> {
        if !self.debug_mode {
            return None;
        }
        Some(Overlay {
            name: self.name.clone(),
            strategy: self.strategy,
            explored: self.explored.clone(),
            path: self.path.remaining().to_vec(),
        })
    }

    /// Runs one simulation tick for this agent
    ///
    /// # Arguments
    /// * `id` - this agent's registry handle, used to skip itself among `peers`
    /// * `ctx` - maze, player position and current time
    /// * `peers` - positions of all live agents (may include this one)
    /// * `rng` - tie-break source for coincident separation
    pub fn update<M: CollisionMap, R: Rng>(
        &mut self,
        id: AgentId,
        ctx: &TickContext<'_, M>,
        peers: &[PeerSnapshot],
        rng: &mut R,
    ) -> AgentReport {
        let mut report = AgentReport::default();
        let target = self.resolve_target(ctx, peers);

        if self.scheduler.tick(target, self.path.is_exhausted()) {
            if let Some(goal) = target {
                self.replan(id, ctx, peers, goal);
                report.replanned = true;
            }
        }

        report.advanced_cell =
            self.motion
                .step(&mut self.position, &mut self.path, self.cell_size);

        report.newly_blocked = self.guard.observe(self.grid_cell(), ctx.now);

        let own_box = self.bounding_box();
        let colliding: Vec<Position> = peers
            .iter()
            .filter(|peer| peer.id != id)
            .filter(|peer| {
                boxes_overlap(&own_box, &Rect::centered(peer.position, self.cell_size))
            })
            .map(|peer| peer.position)
            .collect();

        if !colliding.is_empty() {
            let factor = own_box.w.max(own_box.h);
            let (dx, dy) = separation_impulse(self.position, &colliding, factor, rng);
            self.position = self.position.offset(dx, dy);
            debug!(
                "{} separated from {} peer(s), moved by ({:.1}, {:.1})",
                self.name,
                colliding.len(),
                dx,
                dy
            );

            if let Some(goal) = target {
                self.replan(id, ctx, peers, goal);
                report.replanned = true;
            }
            self.scheduler.force();
            report.separated_from = colliding.len();
        }

        report
    }

    /// Recomputes the path from the current cell to `goal_position`
    ///
    /// # Returns
    /// `true` if the goal was reachable
    pub fn replan<M: CollisionMap>(
        &mut self,
        id: AgentId,
        ctx: &TickContext<'_, M>,
        peers: &[PeerSnapshot],
        goal_position: Position,
    ) -> bool {
        let start = self.grid_cell();
        let goal = grid_of(goal_position, self.cell_size);

        let occupied: HashSet<Cell> = peers
            .iter()
            .filter(|peer| peer.id != id)
            .map(|peer| grid_of(peer.position, self.cell_size))
            .collect();

        self.guard.sweep(ctx.now);

        let outcome = {
            let query = NeighborQuery::new(
                ctx.map,
                self.cell_size,
                &occupied,
                self.guard.blocked(),
                ctx.now,
            )
            .with_goal(goal);
            self.strategy.find_path(start, goal, |cell| query.neighbors(cell))
        };

        self.scheduler.mark_planned(goal_position);
        self.searches += 1;
        self.last_expanded = outcome.expanded();

        if outcome.is_unreachable() {
            debug!(
                "{} ({}): goal {} unreachable from {}, holding position",
                self.name,
                self.strategy.as_str(),
                goal,
                start
            );
        } else {
            debug!(
                "{} ({}): {} -> {} in {} steps, {} nodes expanded",
                self.name,
                self.strategy.as_str(),
                start,
                goal,
                outcome.path.len() - 1,
                outcome.expanded()
            );
        }

        let reachable = !outcome.is_unreachable();
        if self.debug_mode {
            self.explored = outcome.explored;
        }
        self.path = Path::new(outcome.path);
        reachable
    }

    fn resolve_target<M: CollisionMap>(
        &self,
        ctx: &TickContext<'_, M>,
        peers: &[PeerSnapshot],
    ) -> Option<Position> {
        match self.target? {
            Target::Player => Some(ctx.player),
            Target::Agent(other) => peers
                .iter()
                .find(|peer| peer.id == other)
                .map(|peer| peer.position),
        }
    }
}
