// Replay module for analyzing historical game states and debugging decision-making
//
// This module provides functionality to:
// 1. Parse JSONL debug logs
// 2. Replay the decision pipeline on historical states
// 3. Compare expected vs actual moves
// 4. Generate detailed analysis reports
//
// Turns are independent, so replay_all fans them out over rayon.

use log::{info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use crate::config::Config;
use crate::engine::{Decision, MoveEngine};
use crate::observer::NoopObserver;
use crate::selector::Rationale;
use crate::types::{Battlesnake, Board, Direction};

/// Represents a single log entry from the debug JSONL file
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LogEntry {
    pub turn: i32,
    /// Older logs omit this; the first snake on the board is assumed to be ours
    #[serde(default)]
    pub you_id: String,
    pub chosen_move: String,
    pub board: Board,
    pub timestamp: String,
}

impl LogEntry {
    /// The snake that made the logged move
    pub fn you(&self) -> Result<&Battlesnake, String> {
        if self.you_id.is_empty() {
            return self
                .board
                .snakes
                .first()
                .ok_or_else(|| "No snakes found in board state".to_string());
        }
        self.board
            .snakes
            .iter()
            .find(|s| s.id == self.you_id)
            .ok_or_else(|| format!("Snake with id '{}' not found in board state", self.you_id))
    }
}

/// Result of replaying a single turn
#[derive(Debug, Clone)]
pub struct ReplayResult {
    pub turn: i32,
    pub original_move: Direction,
    pub replayed_move: Direction,
    pub matches: bool,
    pub rationale: Rationale,
    pub computation_time_us: u128,
}

/// Statistics for a complete replay session
#[derive(Debug, Default)]
pub struct ReplayStats {
    pub total_turns: usize,
    pub matches: usize,
    pub mismatches: usize,
    pub match_rate: f64,
}

/// Replay engine for analyzing debug logs
pub struct ReplayEngine {
    config: Config,
    verbose: bool,
}

impl ReplayEngine {
    /// Creates a new replay engine with the given configuration
    pub fn new(config: Config, verbose: bool) -> Self {
        ReplayEngine { config, verbose }
    }

    /// Loads all log entries from a JSONL file
    pub fn load_log_file<P: AsRef<Path>>(&self, log_path: P) -> Result<Vec<LogEntry>, String> {
        let file = File::open(log_path.as_ref())
            .map_err(|e| format!("Failed to open log file: {}", e))?;

        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| format!("Failed to read line {}: {}", line_num + 1, e))?;

            if line.trim().is_empty() {
                continue;
            }

            let entry: LogEntry = serde_json::from_str(&line)
                .map_err(|e| format!("Failed to parse JSON on line {}: {}", line_num + 1, e))?;

            entries.push(entry);
        }

        info!("Loaded {} log entries", entries.len());
        Ok(entries)
    }

    /// Runs the pipeline on one logged state, with the same tie-breaker the server would build
    pub fn decide_entry(&self, entry: &LogEntry) -> Result<Decision, String> {
        let you = entry.you()?;
        let mut tie_breaker = self.config.selection.tie_breaker(entry.turn);
        Ok(MoveEngine::new(&self.config).decide(
            &entry.board,
            you,
            tie_breaker.as_mut(),
            &NoopObserver,
        ))
    }

    /// Replays a single log entry and compares the result
    pub fn replay_entry(&self, entry: &LogEntry) -> Result<ReplayResult, String> {
        if self.verbose {
            info!("Replaying turn {}...", entry.turn);
        }

        let original_move: Direction = entry.chosen_move.parse()?;

        let start_time = Instant::now();
        let decision = self.decide_entry(entry)?;
        let computation_time_us = start_time.elapsed().as_micros();

        let matches = original_move == decision.direction;

        let result = ReplayResult {
            turn: entry.turn,
            original_move,
            replayed_move: decision.direction,
            matches,
            rationale: decision.rationale,
            computation_time_us,
        };

        if self.verbose {
            if matches {
                info!(
                    "Turn {}: ✓ MATCH - {} ({}, time: {}us)",
                    entry.turn,
                    decision.direction.as_str(),
                    decision.rationale,
                    computation_time_us
                );
            } else {
                warn!(
                    "Turn {}: ✗ MISMATCH - Original: {}, Replayed: {} ({}, time: {}us)",
                    entry.turn,
                    original_move.as_str(),
                    decision.direction.as_str(),
                    decision.rationale,
                    computation_time_us
                );
            }
        }

        Ok(result)
    }

    /// Replays all entries in a log file, in parallel, keeping log order in the output
    pub fn replay_all(&self, entries: &[LogEntry]) -> Vec<ReplayResult> {
        entries
            .par_iter()
            .filter_map(|entry| match self.replay_entry(entry) {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", entry.turn, e);
                    None
                }
            })
            .collect()
    }

    /// Replays specific turns from a log file
    pub fn replay_turns(
        &self,
        entries: &[LogEntry],
        turn_numbers: &[i32],
    ) -> Result<Vec<ReplayResult>, String> {
        let mut results = Vec::new();

        for turn_num in turn_numbers {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn_num)
                .ok_or_else(|| format!("Turn {} not found in log file", turn_num))?;

            match self.replay_entry(entry) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Failed to replay turn {}: {}", turn_num, e);
                }
            }
        }

        Ok(results)
    }

    /// Generates statistics from replay results
    pub fn generate_stats(&self, results: &[ReplayResult]) -> ReplayStats {
        let total_turns = results.len();
        let matches = results.iter().filter(|r| r.matches).count();
        let mismatches = total_turns - matches;
        let match_rate = if total_turns > 0 {
            (matches as f64 / total_turns as f64) * 100.0
        } else {
            0.0
        };

        ReplayStats {
            total_turns,
            matches,
            mismatches,
            match_rate,
        }
    }

    /// Prints a detailed report of replay results
    pub fn print_report(&self, results: &[ReplayResult]) {
        let stats = self.generate_stats(results);

        println!("\n═══════════════════════════════════════════════════════════");
        println!("                    REPLAY REPORT");
        println!("═══════════════════════════════════════════════════════════");
        println!("Total Turns:    {}", stats.total_turns);
        println!("Matches:        {} ({:.1}%)", stats.matches, stats.match_rate);
        println!("Mismatches:     {}", stats.mismatches);
        println!("═══════════════════════════════════════════════════════════\n");

        if !results.is_empty() {
            let avg_time: f64 = results
                .iter()
                .map(|r| r.computation_time_us as f64)
                .sum::<f64>()
                / results.len() as f64;
            println!("Average Computation Time:   {:.1}us", avg_time);

            for rationale in [
                Rationale::Food,
                Rationale::MostSpace,
                Rationale::LeastTrapped,
                Rationale::Fallback,
            ] {
                let count = results.iter().filter(|r| r.rationale == rationale).count();
                println!("  {:<14} {}", rationale.as_str(), count);
            }
            println!();
        }

        // Show mismatches in detail
        let mismatches: Vec<_> = results.iter().filter(|r| !r.matches).collect();
        if !mismatches.is_empty() {
            println!("═══════════════════════════════════════════════════════════");
            println!("                  DETAILED MISMATCHES");
            println!("═══════════════════════════════════════════════════════════");

            for result in mismatches {
                println!(
                    "Turn {}: {} → {} ({}, time: {}us)",
                    result.turn,
                    result.original_move.as_str(),
                    result.replayed_move.as_str(),
                    result.rationale,
                    result.computation_time_us
                );
            }
            println!();
        }
    }

    /// Validates that specific expected moves were made
    pub fn validate_expected_moves(
        &self,
        entries: &[LogEntry],
        expected_moves: &[(i32, Vec<Direction>)], // (turn, acceptable_moves)
    ) -> Result<(), String> {
        for (turn, acceptable) in expected_moves {
            let entry = entries
                .iter()
                .find(|e| e.turn == *turn)
                .ok_or_else(|| format!("Turn {} not found in log", turn))?;

            let actual_move: Direction = entry.chosen_move.parse()?;

            if !acceptable.contains(&actual_move) {
                return Err(format!(
                    "Turn {}: Expected one of {:?}, but got {}",
                    turn,
                    acceptable.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    actual_move.as_str()
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coord;

    fn entry(you_id: &str, chosen_move: &str) -> LogEntry {
        let you = Battlesnake::from_body(
            "you",
            90,
            vec![Coord::new(5, 5), Coord::new(5, 4), Coord::new(5, 3)],
        );
        let rival = Battlesnake::from_body("rival", 90, vec![Coord::new(0, 10), Coord::new(1, 10)]);
        LogEntry {
            turn: 3,
            you_id: you_id.to_string(),
            chosen_move: chosen_move.to_string(),
            board: Board {
                height: 11,
                width: 11,
                food: vec![],
                snakes: vec![you, rival],
                hazards: vec![],
            },
            timestamp: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_you_defaults_to_first_snake() {
        assert_eq!(entry("", "up").you().unwrap().id, "you");
        assert_eq!(entry("rival", "up").you().unwrap().id, "rival");
        assert!(entry("ghost", "up").you().is_err());
    }

    #[test]
    fn test_replay_entry_matches() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let result = engine.replay_entry(&entry("you", "up")).unwrap();
        assert!(result.matches);
        assert_eq!(result.rationale, Rationale::MostSpace);

        let result = engine.replay_entry(&entry("you", "left")).unwrap();
        assert!(!result.matches);
        assert_eq!(result.replayed_move, Direction::Up);
    }

    #[test]
    fn test_invalid_logged_move_is_an_error() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        assert!(engine.replay_entry(&entry("you", "sideways")).is_err());
    }

    #[test]
    fn test_stats() {
        let engine = ReplayEngine::new(Config::default_hardcoded(), false);
        let results = engine.replay_all(&[entry("you", "up"), entry("you", "left")]);
        let stats = engine.generate_stats(&results);
        assert_eq!(stats.total_turns, 2);
        assert_eq!(stats.matches, 1);
        assert_eq!(stats.mismatches, 1);
        assert!((stats.match_rate - 50.0).abs() < f64::EPSILON);
    }
}
