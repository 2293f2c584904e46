// Welcome to
// __________         __    __  .__                               __
// \______   \_____ _/  |__/  |_|  |   ____   ______ ____ _____  |  | __ ____
//  |    |  _/\__  \\   __\   __\  | _/ __ \ /  ___//    \\__  \ |  |/ // __ \
//  |    |   \ / __ \|  |  |  | |  |_\  ___/ \___ \|   |  \/ __ \|    <\  ___/
//  |________/(______/__|  |__| |____/\_____>______>___|__(______/__|__\\_____>
//
// The Bot is the API-facing side of the snake: it owns the configuration, builds a fresh
// tie-breaker for each turn, runs the decision engine and reports the result.
// For more info see docs.battlesnake.com

use log::info;
use serde_json::{json, Value};
use std::time::Instant;

use crate::config::Config;
use crate::debug_logger::DebugLogger;
use crate::engine::{Decision, MoveEngine};
use crate::observer::LogObserver;
use crate::types::{Battlesnake, Board, Direction, Game};

/// Battlesnake Bot with OOP-style API
/// Takes static configuration dependencies and exposes methods corresponding to API endpoints
pub struct Bot {
    config: Config,
    debug_logger: DebugLogger,
}

impl Bot {
    /// Creates a new Bot instance with the given configuration and no debug log
    ///
    /// # Arguments
    /// * `config` - Static configuration that does not change during the bot's lifetime
    pub fn new(config: Config) -> Self {
        Bot {
            config,
            debug_logger: DebugLogger::disabled(),
        }
    }

    /// Creates a Bot that records every move to the given debug logger
    pub fn with_debug_logger(config: Config, debug_logger: DebugLogger) -> Self {
        Bot {
            config,
            debug_logger,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns bot metadata and appearance
    /// Corresponds to GET / endpoint
    pub fn info(&self) -> Value {
        info!("INFO");

        json!({
            "apiversion": "1",
            "author": "ksiopiolosz-aterlo",
            "color": "#00DEAD",
            "head": "default",
            "tail": "default",
        })
    }

    /// Called when a game starts
    /// Corresponds to POST /start endpoint
    pub fn start(&self, game: &Game, _turn: &i32, board: &Board, _you: &Battlesnake) {
        info!(
            "GAME START {} ({}x{}, {} snakes)",
            game.id,
            board.width,
            board.height,
            board.snakes.len()
        );
    }

    /// Called when a game ends
    /// Corresponds to POST /end endpoint
    pub fn end(&self, game: &Game, turn: &i32, _board: &Board, _you: &Battlesnake) {
        info!("GAME OVER {} after {} turns", game.id, turn);
    }

    /// Computes and returns the next move
    /// Corresponds to POST /move endpoint
    ///
    /// # Arguments
    /// * `_game` - Current game metadata
    /// * `turn` - Current turn number
    /// * `board` - Current board state
    /// * `you` - Your snake's current state
    ///
    /// # Returns
    /// * `Value` - JSON response containing the chosen move direction
    pub fn get_move(&self, _game: &Game, turn: &i32, board: &Board, you: &Battlesnake) -> Value {
        let decision = self.decide(*turn, board, you);

        self.debug_logger
            .log_move(*turn, &you.id, board.clone(), decision.direction);

        json!({ "move": decision.direction.as_str() })
    }

    /// Runs the decision pipeline for one turn and logs a summary
    pub fn decide(&self, turn: i32, board: &Board, you: &Battlesnake) -> Decision {
        let start_time = Instant::now();

        let mut tie_breaker = self.config.selection.tie_breaker(turn);
        let observer = LogObserver::new(turn);
        let decision =
            MoveEngine::new(&self.config).decide(board, you, tie_breaker.as_mut(), &observer);

        info!(
            "Turn {}: Chose {} ({}, safe: {}, time: {}us)",
            turn,
            decision.direction.as_str(),
            decision.rationale,
            Self::describe_safe(&decision),
            start_time.elapsed().as_micros()
        );

        decision
    }

    /// Safe directions with their reachable area, e.g. "up=119 left=119"
    fn describe_safe(decision: &Decision) -> String {
        let parts: Vec<String> = Direction::all()
            .into_iter()
            .filter(|&dir| decision.safety.is_safe(dir))
            .map(|dir| format!("{}={}", dir.as_str(), decision.space.area_or_zero(dir)))
            .collect();
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}
