// Contested food arbitration
//
// Picks the nearest food a stronger rival cannot reach first, and proposes the first safe
// direction that heads toward it, horizontal before vertical.

use serde::Serialize;
use std::fmt;

use crate::config::FoodConfig;
use crate::safety::SafetyMap;
use crate::types::{Battlesnake, Board, Coord, Direction};

/// The food the arbiter settled on and the move toward it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FoodTarget {
    pub food: Coord,
    pub distance: i32,
    pub direction: Direction,
}

/// Why a food cell was not pursued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FoodRejection {
    Corner,
    /// A rival at least as long as us wins the race
    Contested { rival_id: String, rival_distance: i32 },
    /// No direction toward it is safe this turn; carries the preferred one
    Unsafe(Direction),
}

impl fmt::Display for FoodRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FoodRejection::Corner => f.write_str("corner"),
            FoodRejection::Contested {
                rival_id,
                rival_distance,
            } => write!(f, "contested by {} at distance {}", rival_id, rival_distance),
            FoodRejection::Unsafe(dir) => write!(f, "{} is unsafe", dir),
        }
    }
}

pub struct ContestedResourceArbiter<'a> {
    config: &'a FoodConfig,
}

impl<'a> ContestedResourceArbiter<'a> {
    pub fn new(config: &'a FoodConfig) -> Self {
        ContestedResourceArbiter { config }
    }

    /// Proposes a safe move toward the nearest uncontested food, if there is one
    pub fn propose_food_move(
        &self,
        board: &Board,
        you: &Battlesnake,
        safety: &SafetyMap,
    ) -> Option<FoodTarget> {
        self.propose_with(board, you, safety, |_, _| {})
    }

    /// Same as `propose_food_move`, reporting each skipped food cell to `on_reject`
    pub fn propose_with<F>(
        &self,
        board: &Board,
        you: &Battlesnake,
        safety: &SafetyMap,
        mut on_reject: F,
    ) -> Option<FoodTarget>
    where
        F: FnMut(Coord, FoodRejection),
    {
        if you.health >= self.config.hunger_threshold {
            return None;
        }
        let head = you.head()?;

        let mut candidates: Vec<(Coord, i32)> = Vec::with_capacity(board.food.len());
        for &food in &board.food {
            if self.config.avoid_corner_food && board.is_corner(food) {
                on_reject(food, FoodRejection::Corner);
                continue;
            }
            let distance = head.manhattan(food);
            if let Some(rejection) = self.contest(board, you, food, distance) {
                on_reject(food, rejection);
                continue;
            }
            candidates.push((food, distance));
        }

        // Stable, so equally distant food keeps snapshot order
        candidates.sort_by_key(|&(_, distance)| distance);

        for (food, distance) in candidates {
            let toward = Self::directions_toward(head, food);
            match toward.iter().copied().find(|&dir| safety.is_safe(dir)) {
                Some(direction) => {
                    return Some(FoodTarget {
                        food,
                        distance,
                        direction,
                    })
                }
                None => {
                    if let Some(&primary) = toward.first() {
                        on_reject(food, FoodRejection::Unsafe(primary));
                    }
                }
            }
        }

        None
    }

    /// The first rival that contests `food`, if any
    fn contest(
        &self,
        board: &Board,
        you: &Battlesnake,
        food: Coord,
        our_distance: i32,
    ) -> Option<FoodRejection> {
        board
            .rivals(&you.id)
            .filter(|rival| rival.len() >= you.len())
            .find_map(|rival| {
                let rival_distance = rival.head()?.manhattan(food);
                if self.config.is_contested(our_distance, rival_distance) {
                    Some(FoodRejection::Contested {
                        rival_id: rival.id.clone(),
                        rival_distance,
                    })
                } else {
                    None
                }
            })
    }

    /// Moves that close the distance to `food`, horizontal first. Empty when the food is
    /// under the head.
    pub fn directions_toward(head: Coord, food: Coord) -> Vec<Direction> {
        let mut dirs = Vec::with_capacity(2);
        if food.x < head.x {
            dirs.push(Direction::Left);
        } else if food.x > head.x {
            dirs.push(Direction::Right);
        }
        if food.y < head.y {
            dirs.push(Direction::Down);
        } else if food.y > head.y {
            dirs.push(Direction::Up);
        }
        dirs
    }
}
