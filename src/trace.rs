// Tick trace: one JSON object per simulation tick, appended to a JSONL file
//
// Traces are written synchronously at the end of each tick and can be loaded back
// for offline analysis (see the trace_summary tool).

use log::{error, info};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::agent::Overlay;
use crate::search::SearchStrategy;
use crate::types::{Cell, Position};
use crate::world::Outcome;

/// State of one ghost at the end of a tick
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GhostRecord {
    pub name: String,
    pub strategy: SearchStrategy,
    pub position: Position,
    pub cell: Cell,
    pub path_remaining: usize,
    pub replanned: bool,
    /// Nodes expanded by the ghost's most recent search
    pub expanded: usize,
    pub blocked_cells: usize,
    pub separated_from: usize,
}

/// A single trace line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    pub time_secs: f64,
    pub player: Position,
    pub score: u64,
    pub dots_remaining: usize,
    pub outcome: Outcome,
    pub ghosts: Vec<GhostRecord>,
    #[serde(default)]
    pub overlays: Vec<Overlay>,
    pub timestamp: String,
}

pub struct TraceLogger {
    writer: Option<BufWriter<File>>,
}

impl TraceLogger {
    /// Creates a trace logger
    /// If enabled is true, initializes the trace file (truncating if it exists)
    pub fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return TraceLogger::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
        {
            Ok(file) => {
                info!("Tick trace enabled: {}", log_file_path);
                TraceLogger {
                    writer: Some(BufWriter::new(file)),
                }
            }
            Err(e) => {
                error!("Failed to create trace file '{}': {}", log_file_path, e);
                TraceLogger::disabled()
            }
        }
    }

    /// Creates a disabled logger (no-op)
    pub fn disabled() -> Self {
        TraceLogger { writer: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }

    /// Appends one record; write failures are logged and disable the trace
    pub fn log_tick(&mut self, record: &TickRecord) {
        let writer = match self.writer.as_mut() {
            Some(w) => w,
            None => return,
        };

        let json_line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to serialize trace record: {}", e);
                return;
            }
        };

        let written = writeln!(writer, "{}", json_line).and_then(|_| writer.flush());
        if let Err(e) = written {
            error!("Failed to write trace record: {}", e);
            self.writer = None;
        }
    }
}

/// Loads all records from a JSONL trace file
pub fn load_trace<P: AsRef<Path>>(path: P) -> Result<Vec<TickRecord>, String> {
    let file =
        File::open(path.as_ref()).map_err(|e| format!("Failed to open trace file: {}", e))?;

    let reader = BufReader::new(file);
    let mut records = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

        if line.trim().is_empty() {
            continue;
        }

        let record: TickRecord = serde_json::from_str(&line)
            .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

        records.push(record);
    }

    info!("Loaded {} trace records", records.len());
    Ok(records)
}
