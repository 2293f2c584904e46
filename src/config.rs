// Configuration module for reading Snake.toml
// Every policy knob of the decision pipeline lives here so behaviour changes never need a rebuild

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::selector::{PriorityTieBreaker, RandomTieBreaker, TieBreaker};
use crate::types::Direction;

/// Main configuration structure containing all tunable parameters
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub safety: SafetyConfig,
    pub space: SpaceConfig,
    pub food: FoodConfig,
    pub selection: SelectionConfig,
    pub debug: DebugConfig,
}

/// Safety filter policy
#[derive(Debug, Deserialize, Clone)]
pub struct SafetyConfig {
    /// Our own tail leaves its cell this turn, so it does not block
    pub tail_vacates: bool,
    /// Refuse moves deeper into a corner pocket when the head is diagonal to a corner
    pub corner_avoidance: bool,
    /// Smallest board side on which the corner heuristic applies; 0 means every board
    pub corner_min_board_size: i32,
}

/// Flood-fill trap detection policy
#[derive(Debug, Deserialize, Clone)]
pub struct SpaceConfig {
    /// Reachable area must be at least body length times this
    pub threshold_multiplier: usize,
}

impl SpaceConfig {
    /// Minimum reachable area for a snake of `length` segments
    pub fn threshold_for(&self, length: usize) -> usize {
        length * self.threshold_multiplier.max(1)
    }
}

/// How a rival's distance to a food cell is compared with ours
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContestRule {
    /// Rival distance < ours
    StrictlyCloser,
    /// Rival distance <= ours
    CloserOrEqual,
    /// Rival distance <= ours + proximity_margin
    WithinMargin,
}

/// Food arbitration policy
#[derive(Debug, Deserialize, Clone)]
pub struct FoodConfig {
    pub contest_rule: ContestRule,
    pub proximity_margin: i32,
    pub avoid_corner_food: bool,
    /// Food is only pursued while health is below this value
    pub hunger_threshold: i32,
}

impl FoodConfig {
    /// True when a rival at `rival_distance` beats us to food we reach in `our_distance`
    pub fn is_contested(&self, our_distance: i32, rival_distance: i32) -> bool {
        match self.contest_rule {
            ContestRule::StrictlyCloser => rival_distance < our_distance,
            ContestRule::CloserOrEqual => rival_distance <= our_distance,
            ContestRule::WithinMargin => rival_distance <= our_distance + self.proximity_margin,
        }
    }
}

/// Tie-break source for equally good moves
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakMode {
    Priority,
    Random,
}

/// Final move selection policy
#[derive(Debug, Deserialize, Clone)]
pub struct SelectionConfig {
    pub tie_break: TieBreakMode,
    /// Preference order used by the priority tie-breaker
    pub priority: [Direction; 4],
    /// Seed for the random tie-breaker; mixed with the turn number. Entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Returned when no move survives the pipeline
    pub fallback: Direction,
}

impl SelectionConfig {
    /// Builds a fresh tie-breaker for one turn
    pub fn tie_breaker(&self, turn: i32) -> Box<dyn TieBreaker + Send> {
        match self.tie_break {
            TieBreakMode::Priority => Box::new(PriorityTieBreaker::new(self.priority)),
            TieBreakMode::Random => {
                let rng = match self.seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(turn as u64)),
                    None => StdRng::from_os_rng(),
                };
                Box::new(RandomTieBreaker::new(rng))
            }
        }
    }
}

/// Debug configuration
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    pub enabled: bool,
    pub log_file_path: String,
}

impl Config {
    /// Loads configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the Snake.toml configuration file
    ///
    /// # Returns
    /// * `Result<Config, String>` - Parsed configuration or error message
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let contents = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, String> {
        let config: Config =
            toml::from_str(contents).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads default configuration from Snake.toml in the project root
    pub fn load_default() -> Result<Self, String> {
        Self::from_file("Snake.toml")
    }

    /// Creates a configuration with hardcoded default values as fallback
    /// This should match the constants defined in Snake.toml
    pub fn default_hardcoded() -> Self {
        Config {
            safety: SafetyConfig {
                tail_vacates: true,
                corner_avoidance: true,
                corner_min_board_size: 0,
            },
            space: SpaceConfig {
                threshold_multiplier: 1,
            },
            food: FoodConfig {
                contest_rule: ContestRule::CloserOrEqual,
                proximity_margin: 1,
                avoid_corner_food: true,
                hunger_threshold: 101,
            },
            selection: SelectionConfig {
                tie_break: TieBreakMode::Priority,
                priority: [Direction::Up, Direction::Down, Direction::Left, Direction::Right],
                seed: None,
                fallback: Direction::Down,
            },
            debug: DebugConfig {
                enabled: false,
                log_file_path: "battlesnake_debug.jsonl".to_string(),
            },
        }
    }

    /// Attempts to load from file, falls back to hardcoded defaults on error
    pub fn load_or_default() -> Self {
        Self::load_default().unwrap_or_else(|e| {
            log::warn!(
                "Could not load Snake.toml ({}), using hardcoded defaults",
                e
            );
            Self::default_hardcoded()
        })
    }

    /// Rejects values the pipeline cannot honour
    fn validate(&self) -> Result<(), String> {
        if self.space.threshold_multiplier == 0 {
            return Err("space.threshold_multiplier must be at least 1".to_string());
        }
        if self.food.proximity_margin < 0 {
            return Err("food.proximity_margin must not be negative".to_string());
        }
        let mut seen = [false; 4];
        for dir in self.selection.priority {
            if std::mem::replace(&mut seen[dir.index()], true) {
                return Err(format!(
                    "selection.priority lists '{}' more than once",
                    dir.as_str()
                ));
            }
        }
        Ok(())
    }
}
