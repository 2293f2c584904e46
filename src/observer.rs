// Decision observability
//
// The engine reports structured events to an injected observer. Observers only watch: nothing
// they do feeds back into the decision, and the engine runs the same with `NoopObserver`.

use log::debug;
use parking_lot::Mutex;
use serde::Serialize;

use crate::safety::EliminationReason;
use crate::selector::Rationale;
use crate::types::{Coord, Direction};

/// One step of a turn's decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DecisionEvent {
    Eliminated {
        direction: Direction,
        reason: EliminationReason,
    },
    SpaceMeasured {
        direction: Direction,
        area: usize,
        threshold: usize,
    },
    FoodSkipped {
        food: Coord,
        reason: String,
    },
    FoodTargeted {
        food: Coord,
        distance: i32,
        direction: Direction,
    },
    Chosen {
        direction: Direction,
        rationale: Rationale,
    },
}

pub trait DecisionObserver {
    fn observe(&self, event: &DecisionEvent);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl DecisionObserver for NoopObserver {
    fn observe(&self, _event: &DecisionEvent) {}
}

/// Writes each event at debug level, tagged with the turn
#[derive(Debug, Clone, Copy)]
pub struct LogObserver {
    turn: i32,
}

impl LogObserver {
    pub fn new(turn: i32) -> Self {
        LogObserver { turn }
    }
}

impl DecisionObserver for LogObserver {
    fn observe(&self, event: &DecisionEvent) {
        match event {
            DecisionEvent::Eliminated { direction, reason } => {
                debug!("Turn {}: {} eliminated ({})", self.turn, direction, reason)
            }
            DecisionEvent::SpaceMeasured {
                direction,
                area,
                threshold,
            } => debug!(
                "Turn {}: {} reaches {} cells (need {})",
                self.turn, direction, area, threshold
            ),
            DecisionEvent::FoodSkipped { food, reason } => {
                debug!("Turn {}: food at {} skipped: {}", self.turn, food, reason)
            }
            DecisionEvent::FoodTargeted {
                food,
                distance,
                direction,
            } => debug!(
                "Turn {}: targeting food at {} (distance {}) via {}",
                self.turn, food, distance, direction
            ),
            DecisionEvent::Chosen {
                direction,
                rationale,
            } => debug!("Turn {}: chose {} ({})", self.turn, direction, rationale),
        }
    }
}

/// Keeps every event in memory, for tests and offline diagnosis
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<DecisionEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DecisionEvent> {
        self.events.lock().clone()
    }

    pub fn take(&self) -> Vec<DecisionEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl DecisionObserver for RecordingObserver {
    fn observe(&self, event: &DecisionEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_keeps_order() {
        let observer = RecordingObserver::new();
        observer.observe(&DecisionEvent::Eliminated {
            direction: Direction::Down,
            reason: EliminationReason::Reverse,
        });
        observer.observe(&DecisionEvent::Chosen {
            direction: Direction::Up,
            rationale: Rationale::MostSpace,
        });

        let events = observer.take();
        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[1],
            DecisionEvent::Chosen {
                direction: Direction::Up,
                ..
            }
        ));
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_events_serialize_with_tag() {
        let event = DecisionEvent::SpaceMeasured {
            direction: Direction::Left,
            area: 12,
            threshold: 3,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "space_measured");
        assert_eq!(json["direction"], "left");
        assert_eq!(json["area"], 12);
    }
}
