// Final move selection
//
// Food proposals win outright. Otherwise the safe move with the most room is taken, then the
// least-bad self-trap, then the configured fallback direction.

use rand::Rng;
use serde::Serialize;
use std::fmt;

use crate::safety::SafetyMap;
use crate::space::SpaceScore;
use crate::types::Direction;

/// Source of tie-break decisions between equally scored directions
pub trait TieBreaker {
    /// Picks one of `tied`, which is never empty and is in `Direction::all()` order
    fn pick(&mut self, tied: &[Direction]) -> Direction;
}

/// Deterministic tie-break: first direction in a fixed preference order
#[derive(Debug, Clone)]
pub struct PriorityTieBreaker {
    order: [Direction; 4],
}

impl PriorityTieBreaker {
    pub fn new(order: [Direction; 4]) -> Self {
        PriorityTieBreaker { order }
    }
}

impl Default for PriorityTieBreaker {
    fn default() -> Self {
        Self::new(Direction::all())
    }
}

impl TieBreaker for PriorityTieBreaker {
    fn pick(&mut self, tied: &[Direction]) -> Direction {
        self.order
            .iter()
            .copied()
            .find(|dir| tied.contains(dir))
            .unwrap_or(tied[0])
    }
}

/// Uniform random tie-break over an injected generator
#[derive(Debug, Clone)]
pub struct RandomTieBreaker<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomTieBreaker<R> {
    pub fn new(rng: R) -> Self {
        RandomTieBreaker { rng }
    }
}

impl<R: Rng> TieBreaker for RandomTieBreaker<R> {
    fn pick(&mut self, tied: &[Direction]) -> Direction {
        tied[self.rng.random_range(0..tied.len())]
    }
}

/// How the final move was arrived at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rationale {
    /// Heading for uncontested food
    Food,
    /// Safe move with the largest reachable area
    MostSpace,
    /// Nothing safe; every survivor of the safety filter was a self-trap, took the roomiest
    LeastTrapped,
    /// Nothing survived; configured default
    Fallback,
}

impl Rationale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rationale::Food => "food",
            Rationale::MostSpace => "most_space",
            Rationale::LeastTrapped => "least_trapped",
            Rationale::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Rationale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct MoveSelector {
    fallback: Direction,
}

impl MoveSelector {
    pub fn new(fallback: Direction) -> Self {
        MoveSelector { fallback }
    }

    /// Always returns one of the four directions
    pub fn select(
        &self,
        safety: &SafetyMap,
        space: &SpaceScore,
        food: Option<Direction>,
        tie_breaker: &mut dyn TieBreaker,
    ) -> (Direction, Rationale) {
        if let Some(dir) = food {
            return (dir, Rationale::Food);
        }

        let safe = safety.safe_directions();
        if !safe.is_empty() {
            return (Self::roomiest(&safe, space, tie_breaker), Rationale::MostSpace);
        }

        let trapped: Vec<Direction> = space
            .scored()
            .filter(|&(_, area)| area > 0)
            .map(|(dir, _)| dir)
            .collect();
        if !trapped.is_empty() {
            return (
                Self::roomiest(&trapped, space, tie_breaker),
                Rationale::LeastTrapped,
            );
        }

        (self.fallback, Rationale::Fallback)
    }

    /// Highest-area direction among `candidates`, ties resolved by the tie-breaker
    fn roomiest(
        candidates: &[Direction],
        space: &SpaceScore,
        tie_breaker: &mut dyn TieBreaker,
    ) -> Direction {
        let best = candidates
            .iter()
            .map(|&dir| space.area_or_zero(dir))
            .max()
            .unwrap_or(0);
        let tied: Vec<Direction> = candidates
            .iter()
            .copied()
            .filter(|&dir| space.area_or_zero(dir) == best)
            .collect();

        if tied.len() == 1 {
            tied[0]
        } else {
            tie_breaker.pick(&tied)
        }
    }
}
