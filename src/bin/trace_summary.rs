// Summarises a JSONL tick trace written by the ghost-chase runner
//
// Usage:
//   cargo run --bin trace_summary -- <trace_file> [--oscillation <ticks>]
//
// Reports per-ghost search activity, separation events and cell blocks, and flags
// ghosts that bounced between the same two cells for a long stretch.

use std::collections::HashMap;
use std::env;
use std::process;

use ghost_chase::trace::{load_trace, TickRecord};
use ghost_chase::types::Cell;
use ghost_chase::world::Outcome;

#[derive(Default)]
struct GhostSummary {
    strategy: String,
    replans: usize,
    total_expanded: usize,
    max_expanded: usize,
    separations: usize,
    peak_blocked: usize,
    cells_entered: usize,
    longest_bounce: usize,
}

/// Longest run of cell entries alternating between exactly two cells
fn longest_bounce(cells: &[Cell]) -> usize {
    let mut best = 0;
    let mut run = 0;
    for window in cells.windows(3) {
        if window[0] == window[2] && window[0] != window[1] {
            run += 1;
            best = best.max(run + 2);
        } else {
            run = 0;
        }
    }
    best
}

fn summarise(records: &[TickRecord]) -> Vec<(String, GhostSummary)> {
    let mut order: Vec<String> = Vec::new();
    let mut summaries: HashMap<String, GhostSummary> = HashMap::new();
    let mut entered: HashMap<String, Vec<Cell>> = HashMap::new();

    for record in records {
        for ghost in &record.ghosts {
            if !summaries.contains_key(&ghost.name) {
                order.push(ghost.name.clone());
            }
            let summary = summaries.entry(ghost.name.clone()).or_default();
            summary.strategy = ghost.strategy.as_str().to_string();
            if ghost.replanned {
                summary.replans += 1;
                summary.total_expanded += ghost.expanded;
                summary.max_expanded = summary.max_expanded.max(ghost.expanded);
            }
            if ghost.separated_from > 0 {
                summary.separations += 1;
            }
            summary.peak_blocked = summary.peak_blocked.max(ghost.blocked_cells);

            let cells = entered.entry(ghost.name.clone()).or_default();
            if cells.last() != Some(&ghost.cell) {
                cells.push(ghost.cell);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|name| {
            let mut summary = summaries.remove(&name)?;
            let cells = entered.get(&name).map(|c| c.as_slice()).unwrap_or(&[]);
            summary.cells_entered = cells.len();
            summary.longest_bounce = longest_bounce(cells);
            Some((name, summary))
        })
        .collect()
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: trace_summary <trace_file.jsonl> [--oscillation <entries>]");
        process::exit(1);
    }

    let mut oscillation_threshold = 8;
    if let Some(pos) = args.iter().position(|a| a == "--oscillation") {
        oscillation_threshold = match args.get(pos + 1).map(|v| v.parse::<usize>()) {
            Some(Ok(n)) => n,
            _ => {
                eprintln!("Error: --oscillation requires a number");
                process::exit(1);
            }
        };
    }

    let records = match load_trace(&args[1]) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error loading trace: {}", e);
            process::exit(1);
        }
    };

    let last = match records.last() {
        Some(last) => last,
        None => {
            eprintln!("Error: Trace file is empty");
            process::exit(1);
        }
    };

    println!("Trace: {} ticks, {:.1}s simulated", records.len(), last.time_secs);
    println!(
        "Final score {}, {} dots left, outcome: {}",
        last.score,
        last.dots_remaining,
        match &last.outcome {
            Outcome::Running => "running".to_string(),
            Outcome::Cleared => "cleared".to_string(),
            Outcome::Captured { by } => format!("captured by {}", by),
        }
    );
    println!();
    println!(
        "{:<8} {:<6} {:>7} {:>12} {:>12} {:>11} {:>12} {:>8} {:>8}",
        "ghost",
        "algo",
        "replans",
        "avg expanded",
        "max expanded",
        "separations",
        "peak blocked",
        "entered",
        "bounce"
    );

    let summaries = summarise(&records);
    for (name, s) in &summaries {
        let avg = if s.replans > 0 {
            s.total_expanded as f64 / s.replans as f64
        } else {
            0.0
        };
        println!(
            "{:<8} {:<6} {:>7} {:>12.1} {:>12} {:>11} {:>12} {:>8} {:>8}",
            name,
            s.strategy,
            s.replans,
            avg,
            s.max_expanded,
            s.separations,
            s.peak_blocked,
            s.cells_entered,
            s.longest_bounce
        );
    }

    let oscillating: Vec<&String> = summaries
        .iter()
        .filter(|(_, s)| s.longest_bounce >= oscillation_threshold)
        .map(|(name, _)| name)
        .collect();
    if !oscillating.is_empty() {
        println!();
        for name in oscillating {
            println!(
                "⚠ {} bounced between two cells for {}+ entries",
                name, oscillation_threshold
            );
        }
    }
}
