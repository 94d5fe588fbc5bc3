// Library exports for the ghost chase simulation
// The headless runner and the analysis tools all drive the simulation through these modules

pub mod agent;
pub mod config;
pub mod coordinator;
pub mod grid;
pub mod maze;
pub mod motion;
pub mod player;
pub mod registry;
pub mod scheduler;
pub mod search;
pub mod trace;
pub mod types;
pub mod world;
