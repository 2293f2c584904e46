// Space evaluator: bounded flood fill used to reject self-traps and rank fallback moves

use std::collections::VecDeque;

use crate::config::{SafetyConfig, SpaceConfig};
use crate::grid::CellSet;
use crate::safety::{EliminationReason, SafetyMap};
use crate::types::{Battlesnake, Board, Coord, Direction};

/// Reachable area per direction. Only directions that were safe when the evaluator ran
/// carry a score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceScore {
    areas: [Option<usize>; 4],
}

impl SpaceScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, dir: Direction, area: usize) {
        self.areas[dir.index()] = Some(area);
    }

    pub fn get(&self, dir: Direction) -> Option<usize> {
        self.areas[dir.index()]
    }

    /// Score used for ranking; unscored directions rank as zero
    pub fn area_or_zero(&self, dir: Direction) -> usize {
        self.get(dir).unwrap_or(0)
    }

    /// Scored directions in `Direction::all()` order
    pub fn scored(&self) -> impl Iterator<Item = (Direction, usize)> + '_ {
        Direction::all()
            .into_iter()
            .filter_map(move |dir| self.get(dir).map(|area| (dir, area)))
    }
}

/// Breadth-first flood fill from `origin`
///
/// Counts cells that are in bounds and not in `blocked`, including the origin itself. An origin
/// that is out of bounds or blocked has an area of zero. The queue and visited set are sized to
/// the board, so the cost is bounded by `width * height`.
pub fn reachable_area(origin: Coord, blocked: &CellSet, board: &Board) -> usize {
    if !board.contains(origin) || blocked.contains(origin) {
        return 0;
    }

    let mut visited = CellSet::for_board(board);
    let mut queue = VecDeque::with_capacity(board.area());
    visited.insert(origin);
    queue.push_back(origin);
    let mut count = 0;

    while let Some(cell) = queue.pop_front() {
        count += 1;
        for next in cell.neighbors() {
            if board.contains(next) && !blocked.contains(next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }

    count
}

/// Runs the flood fill for every still-safe direction and rejects self-traps
pub struct SpaceEvaluator<'a> {
    space: &'a SpaceConfig,
    safety: &'a SafetyConfig,
}

impl<'a> SpaceEvaluator<'a> {
    pub fn new(space: &'a SpaceConfig, safety: &'a SafetyConfig) -> Self {
        SpaceEvaluator { space, safety }
    }

    /// Scores each safe direction and eliminates those whose area cannot hold the body
    pub fn evaluate(&self, board: &Board, you: &Battlesnake, map: &mut SafetyMap) -> SpaceScore {
        let mut scores = SpaceScore::new();
        let head = match you.head() {
            Some(head) => head,
            None => return scores,
        };
        let threshold = self.space.threshold_for(you.len());

        for dir in map.safe_directions() {
            let candidate = dir.apply(&head);
            let blocked = self.blocked_after_move(board, you, candidate);
            let area = reachable_area(candidate, &blocked, board);
            scores.set(dir, area);

            if area < threshold {
                map.eliminate(dir, EliminationReason::SelfTrap);
            }
        }

        scores
    }

    /// Cells occupied once our head has moved to `candidate`
    ///
    /// Rival bodies stay whole. Our body shifts forward one step: the old head becomes the neck
    /// and the tail drops off when it vacates. The candidate itself is left open as the origin.
    pub fn blocked_after_move(&self, board: &Board, you: &Battlesnake, candidate: Coord) -> CellSet {
        let mut blocked = CellSet::for_board(board);

        for rival in board.rivals(&you.id) {
            blocked.extend(rival.body.iter().copied());
        }

        let kept = if self.safety.tail_vacates {
            you.body.len().saturating_sub(1)
        } else {
            you.body.len()
        };
        blocked.extend(you.body[..kept].iter().copied());
        blocked.remove(candidate);

        blocked
    }
}
