// Configuration module for reading Chase.toml
// All tunable simulation parameters live here; Chase.toml mirrors default_hardcoded()

use log::warn;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::agent::AgentParams;
use crate::types::GhostKind;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub screen: ScreenConfig,
    pub timing: TimingConfig,
    pub player: PlayerConfig,
    pub ghosts: GhostsConfig,
    pub coordination: CoordinationConfig,
    pub scoring: ScoringConfig,
    pub debug: DebugConfig,
    pub simulation: SimulationConfig,
}

/// Playfield size in pixels; the maze is scaled to fit
#[derive(Debug, Deserialize, Clone)]
pub struct ScreenConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TimingConfig {
    pub tick_rate_hz: u32,
    /// Headless runs stop after this many ticks
    pub max_ticks: u64,
}

impl TimingConfig {
    /// Simulated seconds per tick
    pub fn seconds_per_tick(&self) -> f64 {
        1.0 / self.tick_rate_hz.max(1) as f64
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlayerConfig {
    pub speed: f32,
    pub spawn_marker: char,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GhostsConfig {
    pub speed: f32,
    pub replan_delay_ticks: u32,
    /// Capture explored cells and paths for overlays on every ghost
    pub debug: bool,
    pub roster: Vec<GhostSpec>,
}

/// One roster entry
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GhostSpec {
    pub kind: GhostKind,
    pub enabled: bool,
    /// Chase this ghost instead of the player
    #[serde(default)]
    pub follow: Option<GhostKind>,
}

/// Thrash suppression tunables, in seconds of simulated time
#[derive(Debug, Deserialize, Clone)]
pub struct CoordinationConfig {
    pub visit_window_secs: f64,
    pub visit_threshold: usize,
    pub block_duration_secs: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScoringConfig {
    pub points_per_dot: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulationConfig {
    pub maze_path: String,
    pub seed: u64,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Chase.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        toml::from_str(&contents).map_err(|e| format!("Failed to parse config file: {}", e))
    }

    /// Loads default configuration from Chase.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Chase.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Chase.toml
    pub fn default_hardcoded() -> Self {
        Config {
            screen: ScreenConfig {
                width: 744,
                height: 650,
            },
            timing: TimingConfig {
                tick_rate_hz: 60,
                max_ticks: 36000,
            },
            player: PlayerConfig {
                speed: 3.0,
                spawn_marker: 'M',
            },
            ghosts: GhostsConfig {
                speed: 1.0,
                replan_delay_ticks: 30,
                debug: false,
                roster: vec![
                    GhostSpec {
                        kind: GhostKind::Red,
                        enabled: true,
                        follow: None,
                    },
                    GhostSpec {
                        kind: GhostKind::Pink,
                        enabled: true,
                        follow: Some(GhostKind::Red),
                    },
                    GhostSpec {
                        kind: GhostKind::Blue,
                        enabled: true,
                        follow: None,
                    },
                    GhostSpec {
                        kind: GhostKind::Orange,
                        enabled: true,
                        follow: None,
                    },
                ],
            },
            coordination: CoordinationConfig {
                visit_window_secs: 2.0,
                visit_threshold: 3,
                block_duration_secs: 5.0,
            },
            scoring: ScoringConfig { points_per_dot: 1 },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "ghost_chase_trace.jsonl".to_string(),
            },
            simulation: SimulationConfig {
                maze_path: "mazes/classic.txt".to_string(),
                seed: 2024,
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            warn!("Could not load Chase.toml ({}), using hardcoded defaults", e);
            Self::default_hardcoded()
        })
    }

    /// Per-agent tunables for a maze with the given cell size
    pub fn agent_params(&self, cell_size: f32) -> AgentParams {
        AgentParams {
            cell_size,
            speed: self.ghosts.speed,
            replan_delay_ticks: self.ghosts.replan_delay_ticks,
            visit_window_secs: self.coordination.visit_window_secs,
            visit_threshold: self.coordination.visit_threshold,
            block_duration_secs: self.coordination.block_duration_secs,
        }
    }
}
