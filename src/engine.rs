// Per-turn decision pipeline
//
// safety filter -> space evaluator -> food arbiter -> move selector
//
// Everything here is synchronous and bounded by the board area. The only state is the turn's
// own safety map and space scores, so one engine can serve any number of games at once.

use crate::config::Config;
use crate::food::{ContestedResourceArbiter, FoodTarget};
use crate::observer::{DecisionEvent, DecisionObserver, NoopObserver};
use crate::safety::{SafetyFilter, SafetyMap};
use crate::selector::{MoveSelector, PriorityTieBreaker, Rationale, TieBreaker};
use crate::space::{SpaceEvaluator, SpaceScore};
use crate::types::{Battlesnake, Board, Direction};

/// Everything the pipeline worked out for one turn
#[derive(Debug, Clone)]
pub struct Decision {
    pub direction: Direction,
    pub rationale: Rationale,
    /// Safety map after the safety filter and trap rejection
    pub safety: SafetyMap,
    pub space: SpaceScore,
    pub food: Option<FoodTarget>,
}

pub struct MoveEngine<'a> {
    config: &'a Config,
}

impl<'a> MoveEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        MoveEngine { config }
    }

    /// Picks a move with the priority tie-breaker and no observer
    pub fn choose_move(&self, board: &Board, you: &Battlesnake) -> Direction {
        let mut tie_breaker = PriorityTieBreaker::new(self.config.selection.priority);
        self.decide(board, you, &mut tie_breaker, &NoopObserver).direction
    }

    /// Runs the full pipeline for `you` on `board`
    pub fn decide(
        &self,
        board: &Board,
        you: &Battlesnake,
        tie_breaker: &mut dyn TieBreaker,
        observer: &dyn DecisionObserver,
    ) -> Decision {
        let selector = MoveSelector::new(self.config.selection.fallback);

        let mut safety = SafetyFilter::new(&self.config.safety).evaluate(board, you);
        Self::report_eliminations(&SafetyMap::all_safe(), &safety, observer);

        let before_space = safety;
        let space = SpaceEvaluator::new(&self.config.space, &self.config.safety)
            .evaluate(board, you, &mut safety);
        let threshold = self.config.space.threshold_for(you.len());
        for (direction, area) in space.scored() {
            observer.observe(&DecisionEvent::SpaceMeasured {
                direction,
                area,
                threshold,
            });
        }
        Self::report_eliminations(&before_space, &safety, observer);

        let food = ContestedResourceArbiter::new(&self.config.food).propose_with(
            board,
            you,
            &safety,
            |food, why| {
                observer.observe(&DecisionEvent::FoodSkipped {
                    food,
                    reason: why.to_string(),
                })
            },
        );
        if let Some(target) = food {
            observer.observe(&DecisionEvent::FoodTargeted {
                food: target.food,
                distance: target.distance,
                direction: target.direction,
            });
        }

        let (direction, rationale) =
            selector.select(&safety, &space, food.map(|t| t.direction), tie_breaker);
        observer.observe(&DecisionEvent::Chosen {
            direction,
            rationale,
        });

        Decision {
            direction,
            rationale,
            safety,
            space,
            food,
        }
    }

    /// Emits an event for every direction safe in `before` but not in `after`
    fn report_eliminations(before: &SafetyMap, after: &SafetyMap, observer: &dyn DecisionObserver) {
        for direction in Direction::all() {
            if !before.is_safe(direction) {
                continue;
            }
            if let Some(reason) = after.reason(direction) {
                observer.observe(&DecisionEvent::Eliminated { direction, reason });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observer::RecordingObserver;
    use crate::safety::EliminationReason;
    use crate::types::Coord;

    fn snake(id: &str, body: &[(i32, i32)]) -> Battlesnake {
        Battlesnake::from_body(id, 90, body.iter().map(|&(x, y)| Coord::new(x, y)).collect())
    }

    #[test]
    fn test_observer_sees_each_stage() {
        let config = Config::default_hardcoded();
        let you = snake("you", &[(5, 5), (5, 4), (5, 3)]);
        let board = Board {
            height: 11,
            width: 11,
            food: vec![Coord::new(8, 5)],
            snakes: vec![you.clone()],
            hazards: vec![],
        };

        let observer = RecordingObserver::new();
        let decision = MoveEngine::new(&config).decide(
            &board,
            &you,
            &mut PriorityTieBreaker::default(),
            &observer,
        );
        let events = observer.take();

        assert_eq!(decision.direction, Direction::Right);
        assert_eq!(decision.rationale, Rationale::Food);
        assert_eq!(
            events.first(),
            Some(&DecisionEvent::Eliminated {
                direction: Direction::Down,
                reason: EliminationReason::Reverse
            })
        );
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, DecisionEvent::SpaceMeasured { .. }))
                .count(),
            3
        );
        assert!(events.contains(&DecisionEvent::FoodTargeted {
            food: Coord::new(8, 5),
            distance: 3,
            direction: Direction::Right
        }));
        assert_eq!(
            events.last(),
            Some(&DecisionEvent::Chosen {
                direction: Direction::Right,
                rationale: Rationale::Food
            })
        );
    }

    #[test]
    fn test_observer_does_not_change_the_decision() {
        let config = Config::default_hardcoded();
        let you = snake("you", &[(3, 3), (3, 2), (2, 2), (2, 3)]);
        let rival = snake("rival", &[(5, 3), (6, 3), (7, 3), (8, 3)]);
        let board = Board {
            height: 11,
            width: 11,
            food: vec![Coord::new(3, 7)],
            snakes: vec![you.clone(), rival],
            hazards: vec![Coord::new(3, 4)],
        };
        let engine = MoveEngine::new(&config);

        let quiet = engine.decide(&board, &you, &mut PriorityTieBreaker::default(), &NoopObserver);
        let watched = engine.decide(
            &board,
            &you,
            &mut PriorityTieBreaker::default(),
            &RecordingObserver::new(),
        );
        assert_eq!(quiet.direction, watched.direction);
        assert_eq!(quiet.safety, watched.safety);
        assert_eq!(quiet.space, watched.space);
    }

    #[test]
    fn test_empty_body_returns_fallback() {
        let config = Config::default_hardcoded();
        let you = snake("you", &[]);
        let board = Board {
            height: 11,
            width: 11,
            food: vec![Coord::new(1, 1)],
            snakes: vec![],
            hazards: vec![],
        };
        let decision = MoveEngine::new(&config).decide(
            &board,
            &you,
            &mut PriorityTieBreaker::default(),
            &NoopObserver,
        );
        assert_eq!(decision.direction, Direction::Down);
        assert_eq!(decision.rationale, Rationale::Fallback);
    }
}
