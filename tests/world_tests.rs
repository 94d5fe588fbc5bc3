//! World Simulation Tests
//!
//! End-to-end ticks: ghost spawning from the roster, follow targets, capture,
//! level clear, scoring, reset and deterministic replay.

use ghost_chase::agent::Target;
use ghost_chase::config::{Config, GhostSpec};
use ghost_chase::grid::grid_of;
use ghost_chase::types::{Direction, GhostKind, Position};
use ghost_chase::world::{Outcome, World};

fn layout(rows: &[&str]) -> Vec<String> {
    rows.iter().map(|r| r.to_string()).collect()
}

fn roster_entry(kind: GhostKind, follow: Option<GhostKind>) -> GhostSpec {
    GhostSpec {
        kind,
        enabled: true,
        follow,
    }
}

fn config_with(roster: Vec<GhostSpec>) -> Config {
    let mut config = Config::default_hardcoded();
    config.debug.enabled = false;
    config.ghosts.roster = roster;
    config
}

#[test]
fn test_default_world_spawns_full_roster() {
    let world =
        World::from_config(Config::default_hardcoded()).expect("classic maze should build");
    assert_eq!(world.registry().len(), 4);
    assert_eq!(world.cell_size(), 24.0);
    assert_eq!(world.outcome(), &Outcome::Running);

    for kind in GhostKind::all() {
        let ghost = world.ghost(kind).expect("every roster ghost has a marker");
        assert_eq!(ghost.strategy(), kind.strategy());
        assert_eq!(ghost.name(), kind.as_str());
    }

    let red = world.ghost_id(GhostKind::Red).unwrap();
    assert_eq!(
        world.ghost(GhostKind::Pink).unwrap().target(),
        Some(Target::Agent(red)),
        "pink follows red in the default roster"
    );
    assert_eq!(world.ghost(GhostKind::Blue).unwrap().target(), Some(Target::Player));
}

#[test]
fn test_ghost_without_marker_is_skipped() {
    let config = config_with(vec![
        roster_entry(GhostKind::Red, None),
        roster_entry(GhostKind::Orange, None),
    ]);
    let world = World::new(config, layout(&["#######", "#M..R.#", "#######"])).unwrap();
    assert_eq!(world.registry().len(), 1);
    assert!(world.ghost(GhostKind::Orange).is_none());
}

#[test]
fn test_follow_of_missing_ghost_falls_back_to_player() {
    let config = config_with(vec![roster_entry(GhostKind::Pink, Some(GhostKind::Red))]);
    let world = World::new(config, layout(&["#######", "#M.R.P#", "#######"])).unwrap();
    assert_eq!(world.ghost(GhostKind::Pink).unwrap().target(), Some(Target::Player));
}

#[test]
fn test_stationary_player_is_captured() {
    let config = config_with(vec![roster_entry(GhostKind::Red, None)]);
    let mut world = World::new(config, layout(&["#######", "#M.R..#", "#######"])).unwrap();

    let mut outcome = Outcome::Running;
    while world.tick_count() < 1000 && !outcome.is_over() {
        outcome = world.tick(None);
    }

    assert_eq!(
        outcome,
        Outcome::Captured {
            by: "red".to_string()
        }
    );

    // Ticks after the end are no-ops
    let ticks = world.tick_count();
    assert_eq!(world.tick(Some(Direction::Right)), outcome);
    assert_eq!(world.tick_count(), ticks);
}

#[test]
fn test_eating_every_dot_clears_level() {
    let mut config = config_with(Vec::new());
    config.scoring.points_per_dot = 10;
    let mut world = World::new(config, layout(&["####", "#M.#", "####"])).unwrap();
    assert_eq!(world.maze().dots_remaining(), 1);

    let mut outcome = world.tick(Some(Direction::Right));
    while world.tick_count() < 200 && !outcome.is_over() {
        outcome = world.tick(None);
    }

    assert_eq!(outcome, Outcome::Cleared);
    assert_eq!(world.score(), 10);
    assert!(world.maze().are_all_dots_eaten());
}

#[test]
fn test_missing_player_marker_uses_fallback_spawn() {
    let config = config_with(Vec::new());
    let world = World::new(config, layout(&["#####", "#...#", "#####"])).unwrap();
    assert_eq!(world.player().position(), Position::new(372.0, 300.0));
}

#[test]
fn test_invalid_layout_is_an_error() {
    let config = config_with(Vec::new());
    assert!(World::new(config.clone(), Vec::new()).is_err());
    assert!(World::new(config, layout(&["###", "###"])).is_err());
}

#[test]
fn test_reset_restores_level_and_invalidates_handles() {
    let mut world = World::from_config(Config::default_hardcoded()).unwrap();
    let old_red = world.ghost_id(GhostKind::Red).unwrap();
    let dots = world.maze().dots_remaining();

    world.tick(Some(Direction::Left));
    for _ in 0..120 {
        world.tick(None);
    }
    assert!(world.tick_count() > 0);

    world.reset().unwrap();
    assert_eq!(world.tick_count(), 0);
    assert_eq!(world.score(), 0);
    assert_eq!(world.outcome(), &Outcome::Running);
    assert_eq!(world.maze().dots_remaining(), dots);
    assert!(!world.registry().contains(old_red), "handles from the previous level are stale");

    let red = world.ghost(GhostKind::Red).unwrap();
    assert_eq!(red.position(), red.spawn());
    assert_eq!(red.searches(), 0);
}

#[test]
fn test_same_seed_replays_identically() {
    let inputs = [
        Some(Direction::Left),
        None,
        None,
        Some(Direction::Up),
        None,
        Some(Direction::Right),
    ];
    let run = || {
        let mut world = World::from_config(Config::default_hardcoded()).unwrap();
        for tick in 0..600 {
            world.tick(inputs[tick % inputs.len()]);
        }
        let ghosts: Vec<Position> = world
            .registry()
            .iter()
            .map(|(_, g)| g.position())
            .collect();
        (world.player().position(), ghosts, world.score(), world.outcome().clone())
    };
    assert_eq!(run(), run());
}

#[test]
fn test_ghost_paths_avoid_walls() {
    let mut world = World::from_config(Config::default_hardcoded()).unwrap();
    for tick in 0..900 {
        let input = match (tick / 45) % 4 {
            0 => Direction::Left,
            1 => Direction::Up,
            2 => Direction::Right,
            _ => Direction::Down,
        };
        if world.tick(Some(input)).is_over() {
            break;
        }
        for (_, ghost) in world.registry().iter() {
            // The first cell is wherever the ghost stood when it planned
            for cell in ghost.path().cells().iter().skip(1) {
                assert!(
                    !world.maze().is_wall(*cell),
                    "{} planned through wall {}",
                    ghost.name(),
                    cell
                );
            }
        }
    }
    assert!(world.registry().iter().all(|(_, g)| g.searches() > 0));
}

#[test]
fn test_now_is_derived_from_ticks() {
    let mut world = World::from_config(Config::default_hardcoded()).unwrap();
    for _ in 0..90 {
        world.tick(None);
    }
    assert!((world.now_secs() - 1.5).abs() < 1e-9);
}

#[test]
fn test_every_ghost_leaves_its_spawn_row() {
    let mut world = World::from_config(Config::default_hardcoded()).unwrap();
    let cell_size = world.cell_size();
    let spawn_rows: Vec<(GhostKind, i32)> = GhostKind::all()
        .into_iter()
        .map(|kind| {
            let ghost = world.ghost(kind).expect("default roster ghost");
            (kind, grid_of(ghost.spawn(), cell_size).row)
        })
        .collect();

    // Stationary player: nobody may stay boxed in at spawn
    let mut departed: Vec<GhostKind> = Vec::new();
    while departed.len() < spawn_rows.len() && world.tick_count() < 300 {
        assert_eq!(world.tick(None), Outcome::Running);
        for (kind, row) in &spawn_rows {
            let cell = world.ghost(*kind).unwrap().grid_cell();
            if cell.row != *row && !departed.contains(kind) {
                departed.push(*kind);
            }
        }
    }
    for (kind, _) in &spawn_rows {
        assert!(
            departed.contains(kind),
            "{} ghost never left its spawn row",
            kind.as_str()
        );
    }

    // The A* ghost runs the player down
    let mut outcome = Outcome::Running;
    while world.tick_count() < 1500 && !outcome.is_over() {
        outcome = world.tick(None);
    }
    assert_eq!(
        outcome,
        Outcome::Captured {
            by: "red".to_string()
        }
    );
}

#[test]
fn test_ghost_debug_overlays() {
    let mut config = Config::default_hardcoded();
    config.ghosts.debug = true;
    let mut world = World::from_config(config).unwrap();
    world.tick(None);

    let overlays = world.overlays();
    assert_eq!(overlays.len(), 4);
    for overlay in &overlays {
        let id = world.registry().find_by_name(&overlay.name).unwrap();
        let ghost = world.registry().get(id).unwrap();
        assert_eq!(overlay.strategy, ghost.strategy());
        assert!(!overlay.explored.is_empty());
        assert_eq!(overlay.explored.len(), ghost.last_expanded());
        assert_eq!(overlay.path, ghost.path().remaining());
    }

    world.set_ghost_debug(false);
    assert!(world.overlays().is_empty());

    // Survives a level reset
    world.set_ghost_debug(true);
    world.reset().unwrap();
    assert!(world.registry().iter().all(|(_, g)| g.debug_mode()));
}

#[test]
fn test_debug_overlays_do_not_change_the_game() {
    let run = |debug: bool| {
        let mut config = Config::default_hardcoded();
        config.ghosts.debug = debug;
        let mut world = World::from_config(config).unwrap();
        for tick in 0..400 {
            let input = if tick % 90 == 0 {
                Some(Direction::Left)
            } else {
                None
            };
            world.tick(input);
        }
        let ghosts: Vec<Position> = world
            .registry()
            .iter()
            .map(|(_, g)| g.position())
            .collect();
        (ghosts, world.score(), world.outcome().clone())
    };
    assert_eq!(run(true), run(false));
}
