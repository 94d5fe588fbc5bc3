// Simulation owner: maze, player, ghost registry and the fixed per-tick order
//
// Tick order: input -> player -> ghosts -> dots -> clear/capture -> trace.
// Simulated time is derived from the tick count, so runs with the same seed replay
// identically.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentReport, Overlay, Target, TickContext};
use crate::config::Config;
use crate::coordinator::boxes_overlap;
use crate::maze::Maze;
use crate::player::Player;
use crate::registry::{AgentId, AgentRegistry};
use crate::trace::{GhostRecord, TickRecord, TraceLogger};
use crate::types::{Direction, GhostKind, Position};

/// State of the level after a tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Running,
    /// A ghost's box overlapped the player's
    Captured { by: String },
    /// Every dot was eaten
    Cleared,
}

impl Outcome {
    pub fn is_over(&self) -> bool {
        *self != Outcome::Running
    }
}

pub struct World {
    config: Config,
    layout: Vec<String>,
    cell_size: f32,
    maze: Maze,
    player: Player,
    registry: AgentRegistry,
    ghosts: Vec<(GhostKind, AgentId)>,
    tick: u64,
    score: u64,
    rng: StdRng,
    outcome: Outcome,
    trace: TraceLogger,
    last_reports: Vec<(AgentId, AgentReport)>,
}

impl World {
    /// Builds a world from an in-memory layout
    ///
    /// # Arguments
    /// * `config` - simulation parameters
    /// * `layout` - maze rows
    ///
    /// # Returns
    /// * `Err` if the layout cannot form a maze
    pub fn new(config: Config, layout: Vec<String>) -> Result<Self, String> {
        let cell_size =
            Maze::fit_cell_size(config.screen.width, config.screen.height, &layout);
        let maze = Maze::from_layout(&layout, cell_size)?;
        let player = Player::new(Position::default(), config.player.speed, cell_size);
        let trace = TraceLogger::new(config.debug.enabled, &config.debug.log_file_path);
        let rng = StdRng::seed_from_u64(config.simulation.seed);

        let mut world = World {
            config,
            layout,
            cell_size,
            maze,
            player,
            registry: AgentRegistry::new(),
            ghosts: Vec::new(),
            tick: 0,
            score: 0,
            rng,
            outcome: Outcome::Running,
            trace,
            last_reports: Vec::new(),
        };
        world.populate();
        Ok(world)
    }

    /// Builds a world from the maze file named in the configuration
    pub fn from_config(config: Config) -> Result<Self, String> {
        let layout = Maze::load_layout(&config.simulation.maze_path)?;
        World::new(config, layout)
    }

    /// Spawns the player and the enabled roster on the current maze
    fn populate(&mut self) {
        let marker = self.config.player.spawn_marker;
        let player_spawn = self.maze.spawn(marker).unwrap_or_else(|| {
            let fallback = Position::new(
                (self.config.screen.width / 2) as f32,
                (self.config.screen.height.saturating_sub(50) / 2) as f32,
            );
            warn!(
                "No player marker '{}' in maze, spawning player at ({}, {})",
                marker, fallback.x, fallback.y
            );
            fallback
        });
        self.player = Player::new(player_spawn, self.config.player.speed, self.cell_size);

        self.registry.clear();
        self.ghosts.clear();
        let params = self.config.agent_params(self.cell_size);

        for entry in self.config.ghosts.roster.iter().filter(|s| s.enabled) {
            if self.ghosts.iter().any(|(kind, _)| *kind == entry.kind) {
                warn!(
                    "Ghost {} listed twice in roster, ignoring duplicate",
                    entry.kind.as_str()
                );
                continue;
            }
            let spawn = match self.maze.spawn(entry.kind.marker()) {
                Some(p) => p,
                None => {
                    warn!(
                        "No spawn marker '{}' for {} ghost, skipping",
                        entry.kind.marker(),
                        entry.kind.as_str()
                    );
                    continue;
                }
            };

            let mut agent = Agent::new(entry.kind.as_str(), entry.kind.strategy(), spawn, &params);
            if self.config.ghosts.debug {
                agent.toggle_debug();
            }
            let id = self.registry.insert(agent);
            self.ghosts.push((entry.kind, id));
            info!(
                "Spawned {} ghost ({}) at ({}, {})",
                entry.kind.as_str(),
                entry.kind.strategy().as_str(),
                spawn.x,
                spawn.y
            );
        }

        for entry in self.config.ghosts.roster.iter().filter(|s| s.enabled) {
            let id = match self.ghost_id(entry.kind) {
                Some(id) => id,
                None => continue,
            };
            let target = match entry.follow {
                None => Target::Player,
                Some(leader) => match self.ghost_id(leader) {
                    Some(leader_id) if leader_id != id => Target::Agent(leader_id),
                    _ => {
                        warn!(
                            "{} ghost cannot follow {}, chasing the player instead",
                            entry.kind.as_str(),
                            leader.as_str()
                        );
                        Target::Player
                    }
                },
            };
            if let Some(agent) = self.registry.get_mut(id) {
                agent.set_target(Some(target));
            }
        }
    }

    /// Runs one simulation tick
    ///
    /// # Arguments
    /// * `input` - steering request for the player this tick, if any
    ///
    /// # Returns
    /// The outcome after the tick; once the level is over further ticks are no-ops
    pub fn tick(&mut self, input: Option<Direction>) -> Outcome {
        if self.outcome.is_over() {
            return self.outcome.clone();
        }

        let now = self.now_secs();

        if let Some(direction) = input {
            self.player.steer(direction);
        }
        self.player.update(&self.maze);

        let ctx = TickContext {
            map: &self.maze,
            player: self.player.position(),
            now,
        };
        self.last_reports = self.registry.update_all(&ctx, &mut self.rng);

        let player_box = self.player.rect();
        let eaten = self.maze.check_dot_collision(&player_box);
        self.score += eaten as u64 * self.config.scoring.points_per_dot as u64;

        if self.maze.are_all_dots_eaten() {
            info!("Level cleared at tick {} with score {}", self.tick, self.score);
            self.outcome = Outcome::Cleared;
        } else if let Some((_, ghost)) = self
            .registry
            .iter()
            .find(|(_, ghost)| boxes_overlap(&ghost.bounding_box(), &player_box))
        {
            info!(
                "Player captured by {} ghost at tick {} with score {}",
                ghost.name(),
                self.tick,
                self.score
            );
            self.outcome = Outcome::Captured {
                by: ghost.name().to_string(),
            };
        }

        if self.trace.is_enabled() {
            let record = self.tick_record(now);
            self.trace.log_tick(&record);
        }

        self.tick += 1;
        self.outcome.clone()
    }

    /// Restarts the level: fresh maze, respawned player and ghosts, score zeroed
    pub fn reset(&mut self) -> Result<(), String> {
        self.maze = Maze::from_layout(&self.layout, self.cell_size)?;
        self.populate();
        self.tick = 0;
        self.score = 0;
        self.outcome = Outcome::Running;
        self.rng = StdRng::seed_from_u64(self.config.simulation.seed);
        self.last_reports.clear();
        info!("Level reset");
        Ok(())
    }

    fn tick_record(&self, now: f64) -> TickRecord {
        let ghosts = self
            .ghosts
            .iter()
            .filter_map(|(_, id)| self.registry.get(*id).map(|ghost| (*id, ghost)))
            .map(|(id, ghost)| {
                let report = self
                    .last_reports
                    .iter()
                    .find(|(rid, _)| *rid == id)
                    .map(|(_, r)| r.clone())
                    .unwrap_or_default();
                GhostRecord {
                    name: ghost.name().to_string(),
                    strategy: ghost.strategy(),
                    position: ghost.position(),
                    cell: ghost.grid_cell(),
                    path_remaining: ghost.path().remaining().len(),
                    replanned: report.replanned,
                    expanded: ghost.last_expanded(),
                    blocked_cells: ghost.guard().blocked().len(),
                    separated_from: report.separated_from,
                }
            })
            .collect();

        TickRecord {
            tick: self.tick,
            time_secs: now,
            player: self.player.position(),
            score: self.score,
            dots_remaining: self.maze.dots_remaining(),
            outcome: self.outcome.clone(),
            ghosts,
            overlays: self.overlays(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Simulated seconds elapsed at the start of the current tick
    pub fn now_secs(&self) -> f64 {
        self.tick as f64 * self.config.timing.seconds_per_tick()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AgentRegistry {
        &mut self.registry
    }

    /// Handle of the live ghost of `kind`
    pub fn ghost_id(&self, kind: GhostKind) -> Option<AgentId> {
        self.ghosts
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .filter(|id| self.registry.contains(*id))
    }

    pub fn ghost(&self, kind: GhostKind) -> Option<&Agent> {
        self.ghost_id(kind).and_then(|id| self.registry.get(id))
    }

    /// Reports from the most recent tick's ghost updates
    pub fn last_reports(&self) -> &[(AgentId, AgentReport)] {
        &self.last_reports
    }

    /// Switches debug capture on or off for every ghost; kept across `reset`
    pub fn set_ghost_debug(&mut self, enabled: bool) {
        self.config.ghosts.debug = enabled;
        self.registry.set_debug_all(enabled);
    }

    /// Debug overlays of ghosts with debug mode on
    pub fn overlays(&self) -> Vec<Overlay> {
        self.registry
            .overlays()
            .into_iter()
            .map(|(_, overlay)| overlay)
            .collect()
    }
}
