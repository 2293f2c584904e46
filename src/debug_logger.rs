// Debug logging module for asynchronous game state logging
//
// This module provides fire-and-forget async logging to avoid blocking
// the main request/response cycle. Each turn's state is written to a JSONL file
// that the replay and diagnose_decision tools read back.

use log::{error, warn};
use serde::Serialize;
use std::sync::Arc;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::runtime::Handle;
use tokio::sync::Mutex;

use crate::types::{Board, Direction};

/// Represents a single debug log entry
#[derive(Debug, Serialize)]
struct DebugLogEntry {
    turn: i32,
    you_id: String,
    chosen_move: String,
    board: Board,
    timestamp: String,
}

/// Shared debug logger state
/// Uses Arc<Mutex<File>> to allow concurrent async writes from multiple tasks
#[derive(Clone)]
pub struct DebugLogger {
    file: Arc<Mutex<Option<File>>>,
    enabled: bool,
}

impl DebugLogger {
    /// Creates a new debug logger
    /// If enabled is true, initializes the log file (truncating if it exists)
    pub async fn new(enabled: bool, log_file_path: &str) -> Self {
        if !enabled {
            return Self::disabled();
        }

        match OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_file_path)
            .await
        {
            Ok(file) => {
                log::info!("Debug logging enabled: {}", log_file_path);
                Self::from_file(file)
            }
            Err(e) => {
                error!("Failed to create debug log file '{}': {}", log_file_path, e);
                Self::disabled()
            }
        }
    }

    fn from_file(file: File) -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(Some(file))),
            enabled: true,
        }
    }

    /// Creates a disabled debug logger (no-op)
    pub fn disabled() -> Self {
        DebugLogger {
            file: Arc::new(Mutex::new(None)),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs a move decision asynchronously (fire-and-forget)
    /// This spawns a tokio task that writes to the file without blocking.
    /// Outside a tokio runtime the entry is dropped with a warning.
    pub fn log_move(&self, turn: i32, you_id: &str, board: Board, chosen_move: Direction) {
        if !self.enabled {
            return;
        }

        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!("Turn {}: no async runtime, debug log entry dropped", turn);
                return;
            }
        };

        let file_handle = self.file.clone();
        let entry = DebugLogEntry {
            turn,
            you_id: you_id.to_string(),
            chosen_move: chosen_move.as_str().to_string(),
            board,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        // Spawn fire-and-forget task
        handle.spawn(async move {
            Self::log_move_internal(file_handle, entry).await;
        });
    }

    /// Internal async function that performs the actual file write
    /// The first I/O failure closes the file and later entries are dropped.
    async fn log_move_internal(file_handle: Arc<Mutex<Option<File>>>, entry: DebugLogEntry) {
        let mut file_guard = file_handle.lock().await;

        let failure = match file_guard.as_mut() {
            Some(file) => Self::write_entry(file, &entry).await.err(),
            None => None,
        };
        if let Some(e) = failure {
            error!("{}; debug logging disabled", e);
            *file_guard = None;
        }
    }

    async fn write_entry(file: &mut File, entry: &DebugLogEntry) -> Result<(), String> {
        let json_line = serde_json::to_string(entry)
            .map_err(|e| format!("Failed to serialize debug log entry: {}", e))?;
        file.write_all(format!("{}\n", json_line).as_bytes())
            .await
            .map_err(|e| format!("Failed to write debug log entry: {}", e))?;
        file.flush()
            .await
            .map_err(|e| format!("Failed to flush debug log: {}", e))
    }
}
