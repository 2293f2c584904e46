// Safety filter: eliminates moves that are immediately or predictably fatal
//
// The map starts all-safe and each filter can only turn entries off. The first reason that
// removed a direction is kept for diagnostics.

use serde::Serialize;
use std::fmt;

use crate::config::SafetyConfig;
use crate::types::{Battlesnake, Board, Coord, Direction};

/// Why a direction was removed from the safety map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationReason {
    Reverse,
    OutOfBounds,
    SelfCollision,
    RivalBody,
    Hazard,
    HeadToHead,
    CornerPocket,
    SelfTrap,
}

impl EliminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            EliminationReason::Reverse => "reverse",
            EliminationReason::OutOfBounds => "out_of_bounds",
            EliminationReason::SelfCollision => "self_collision",
            EliminationReason::RivalBody => "rival_body",
            EliminationReason::Hazard => "hazard",
            EliminationReason::HeadToHead => "head_to_head",
            EliminationReason::CornerPocket => "corner_pocket",
            EliminationReason::SelfTrap => "self_trap",
        }
    }
}

impl fmt::Display for EliminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-direction safety, indexed by `Direction::index()`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SafetyMap {
    eliminated: [Option<EliminationReason>; 4],
}

impl Default for SafetyMap {
    fn default() -> Self {
        Self::all_safe()
    }
}

impl SafetyMap {
    pub fn all_safe() -> Self {
        SafetyMap {
            eliminated: [None; 4],
        }
    }

    pub fn is_safe(&self, dir: Direction) -> bool {
        self.eliminated[dir.index()].is_none()
    }

    /// Marks a direction unsafe. There is no way back to safe.
    pub fn eliminate(&mut self, dir: Direction, reason: EliminationReason) {
        let slot = &mut self.eliminated[dir.index()];
        if slot.is_none() {
            *slot = Some(reason);
        }
    }

    /// First reason the direction was eliminated for, if it was
    pub fn reason(&self, dir: Direction) -> Option<EliminationReason> {
        self.eliminated[dir.index()]
    }

    /// Safe directions in `Direction::all()` order
    pub fn safe_directions(&self) -> Vec<Direction> {
        Direction::all()
            .into_iter()
            .filter(|&dir| self.is_safe(dir))
            .collect()
    }

    pub fn safe_count(&self) -> usize {
        self.eliminated.iter().filter(|r| r.is_none()).count()
    }

    pub fn any_safe(&self) -> bool {
        self.safe_count() > 0
    }
}

/// Applies the fixed sequence of elimination filters
pub struct SafetyFilter<'a> {
    config: &'a SafetyConfig,
}

impl<'a> SafetyFilter<'a> {
    pub fn new(config: &'a SafetyConfig) -> Self {
        SafetyFilter { config }
    }

    /// Builds the safety map for `you` on `board`
    ///
    /// A snake without a body has no head to move, so every direction is eliminated as
    /// out of bounds.
    pub fn evaluate(&self, board: &Board, you: &Battlesnake) -> SafetyMap {
        let mut map = SafetyMap::all_safe();

        let head = match you.head() {
            Some(head) => head,
            None => {
                for dir in Direction::all() {
                    map.eliminate(dir, EliminationReason::OutOfBounds);
                }
                return map;
            }
        };

        self.filter_reverse(you, head, &mut map);
        self.filter_bounds(board, head, &mut map);
        self.filter_self_collision(you, head, &mut map);
        self.filter_rival_bodies(board, you, head, &mut map);
        self.filter_hazards(board, head, &mut map);
        self.filter_head_to_head(board, you, head, &mut map);
        if self.config.corner_avoidance {
            self.filter_corner_pocket(board, head, &mut map);
        }

        map
    }

    /// Can't reverse onto the neck. A body shorter than two segments, or a neck stacked on the
    /// head at spawn, has no reversal constraint.
    fn filter_reverse(&self, you: &Battlesnake, head: Coord, map: &mut SafetyMap) {
        if let Some(dir) = you.neck().and_then(|neck| Direction::between(head, neck)) {
            map.eliminate(dir, EliminationReason::Reverse);
        }
    }

    fn filter_bounds(&self, board: &Board, head: Coord, map: &mut SafetyMap) {
        for dir in Direction::all() {
            if !board.contains(dir.apply(&head)) {
                map.eliminate(dir, EliminationReason::OutOfBounds);
            }
        }
    }

    fn filter_self_collision(&self, you: &Battlesnake, head: Coord, map: &mut SafetyMap) {
        let blocking = self.own_blocking_segments(you);
        for dir in Direction::all() {
            if blocking.contains(&dir.apply(&head)) {
                map.eliminate(dir, EliminationReason::SelfCollision);
            }
        }
    }

    fn filter_rival_bodies(&self, board: &Board, you: &Battlesnake, head: Coord, map: &mut SafetyMap) {
        for rival in board.rivals(&you.id) {
            for dir in Direction::all() {
                if rival.body.contains(&dir.apply(&head)) {
                    map.eliminate(dir, EliminationReason::RivalBody);
                }
            }
        }
    }

    /// Hazards count as walls regardless of health
    fn filter_hazards(&self, board: &Board, head: Coord, map: &mut SafetyMap) {
        for dir in Direction::all() {
            if board.hazards.contains(&dir.apply(&head)) {
                map.eliminate(dir, EliminationReason::Hazard);
            }
        }
    }

    /// Avoid cells a rival of equal or greater length could also move into this turn
    fn filter_head_to_head(&self, board: &Board, you: &Battlesnake, head: Coord, map: &mut SafetyMap) {
        for rival in board.rivals(&you.id) {
            if rival.len() < you.len() {
                continue;
            }
            let rival_head = match rival.head() {
                Some(h) => h,
                None => continue,
            };
            let rival_reach = rival_head.neighbors();
            for dir in Direction::all() {
                if rival_reach.contains(&dir.apply(&head)) {
                    map.eliminate(dir, EliminationReason::HeadToHead);
                }
            }
        }
    }

    /// When the head sits diagonally next to a corner, refuse both moves toward that corner
    fn filter_corner_pocket(&self, board: &Board, head: Coord, map: &mut SafetyMap) {
        let min_size = self.config.corner_min_board_size;
        if board.width < min_size || board.height < min_size {
            return;
        }

        for corner in board.corners() {
            let (dx, dy) = (corner.x - head.x, corner.y - head.y);
            if dx.abs() != 1 || dy.abs() != 1 {
                continue;
            }
            let horizontal = if dx < 0 { Direction::Left } else { Direction::Right };
            let vertical = if dy < 0 { Direction::Down } else { Direction::Up };
            map.eliminate(horizontal, EliminationReason::CornerPocket);
            map.eliminate(vertical, EliminationReason::CornerPocket);
        }
    }

    /// Own segments that still occupy their cell after this move
    fn own_blocking_segments<'b>(&self, you: &'b Battlesnake) -> &'b [Coord] {
        if self.config.tail_vacates {
            &you.body[..you.body.len().saturating_sub(1)]
        } else {
            &you.body
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn board(width: i32, height: i32, snakes: Vec<Battlesnake>) -> Board {
        Board {
            height,
            width,
            food: vec![],
            snakes,
            hazards: vec![],
        }
    }

    fn snake(id: &str, body: &[(i32, i32)]) -> Battlesnake {
        Battlesnake::from_body(id, 90, body.iter().map(|&(x, y)| Coord::new(x, y)).collect())
    }

    fn evaluate(board: &Board, you: &Battlesnake) -> SafetyMap {
        let config = Config::default_hardcoded();
        SafetyFilter::new(&config.safety).evaluate(board, you)
    }

    #[test]
    fn test_map_only_narrows() {
        let mut map = SafetyMap::all_safe();
        assert_eq!(map.safe_count(), 4);
        map.eliminate(Direction::Up, EliminationReason::Hazard);
        map.eliminate(Direction::Up, EliminationReason::Reverse);
        assert!(!map.is_safe(Direction::Up));
        assert_eq!(map.reason(Direction::Up), Some(EliminationReason::Hazard));
        assert_eq!(
            map.safe_directions(),
            vec![Direction::Down, Direction::Left, Direction::Right]
        );
    }

    #[test]
    fn test_reverse_is_unsafe() {
        let you = snake("you", &[(5, 5), (5, 4), (5, 3)]);
        let map = evaluate(&board(11, 11, vec![you.clone()]), &you);
        assert_eq!(map.reason(Direction::Down), Some(EliminationReason::Reverse));
        assert_eq!(map.safe_count(), 3);
    }

    #[test]
    fn test_single_segment_has_no_reverse_constraint() {
        let you = snake("you", &[(5, 5)]);
        let map = evaluate(&board(11, 11, vec![you.clone()]), &you);
        assert_eq!(map.safe_count(), 4);
    }

    #[test]
    fn test_stacked_spawn_body_has_no_reverse_constraint() {
        let you = snake("you", &[(5, 5), (5, 5), (5, 5)]);
        let map = evaluate(&board(11, 11, vec![you.clone()]), &you);
        assert_eq!(map.safe_count(), 4);
    }

    #[test]
    fn test_bounds_at_bottom_left_edge() {
        let you = snake("you", &[(0, 5), (1, 5), (2, 5)]);
        let map = evaluate(&board(11, 11, vec![you.clone()]), &you);
        assert_eq!(map.reason(Direction::Left), Some(EliminationReason::OutOfBounds));
        assert!(map.is_safe(Direction::Up));
        assert!(map.is_safe(Direction::Down));
    }

    #[test]
    fn test_self_collision_respects_tail_policy() {
        // Head at (5,5) with the tail curled round to (6,5)
        let you = snake("you", &[(5, 5), (5, 4), (6, 4), (6, 5)]);
        let b = board(11, 11, vec![you.clone()]);

        let mut config = Config::default_hardcoded();
        let map = SafetyFilter::new(&config.safety).evaluate(&b, &you);
        assert!(map.is_safe(Direction::Right), "tail vacates, so Right is free");

        config.safety.tail_vacates = false;
        let map = SafetyFilter::new(&config.safety).evaluate(&b, &you);
        assert_eq!(map.reason(Direction::Right), Some(EliminationReason::SelfCollision));
    }

    #[test]
    fn test_stacked_tail_still_blocks() {
        // Just ate: tail segment doubled at (6,5)
        let you = snake("you", &[(5, 5), (5, 4), (6, 4), (6, 5), (6, 5)]);
        let map = evaluate(&board(11, 11, vec![you.clone()]), &you);
        assert_eq!(map.reason(Direction::Right), Some(EliminationReason::SelfCollision));
    }

    #[test]
    fn test_rival_body_including_tail_blocks() {
        let you = snake("you", &[(5, 5), (5, 4)]);
        let rival = snake("rival", &[(8, 8), (8, 7), (7, 7), (6, 7), (6, 6), (6, 5)]);
        let map = evaluate(&board(11, 11, vec![you.clone(), rival]), &you);
        assert_eq!(map.reason(Direction::Right), Some(EliminationReason::RivalBody));
    }

    #[test]
    fn test_hazard_is_a_wall() {
        let you = snake("you", &[(5, 5), (5, 4)]);
        let mut b = board(11, 11, vec![you.clone()]);
        b.hazards.push(Coord::new(4, 5));
        let map = evaluate(&b, &you);
        assert_eq!(map.reason(Direction::Left), Some(EliminationReason::Hazard));
    }

    #[test]
    fn test_head_to_head_only_against_equal_or_longer() {
        let you = snake("you", &[(5, 5), (5, 4), (5, 3)]);

        let longer = snake("rival", &[(7, 5), (8, 5), (9, 5)]);
        let map = evaluate(&board(11, 11, vec![you.clone(), longer]), &you);
        assert_eq!(map.reason(Direction::Right), Some(EliminationReason::HeadToHead));

        let shorter = snake("rival", &[(7, 5), (8, 5)]);
        let map = evaluate(&board(11, 11, vec![you.clone(), shorter]), &you);
        assert!(map.is_safe(Direction::Right));
    }

    #[test]
    fn test_you_is_not_its_own_rival() {
        let you = snake("you", &[(5, 5), (5, 4), (5, 3)]);
        let map = evaluate(&board(11, 11, vec![you.clone()]), &you);
        assert!(map.is_safe(Direction::Up));
        assert!(map.is_safe(Direction::Left));
        assert!(map.is_safe(Direction::Right));
    }

    #[test]
    fn test_corner_pocket() {
        let you = snake("you", &[(1, 1), (2, 1), (3, 1)]);
        let map = evaluate(&board(11, 11, vec![you.clone()]), &you);
        assert_eq!(map.reason(Direction::Left), Some(EliminationReason::CornerPocket));
        assert_eq!(map.reason(Direction::Down), Some(EliminationReason::CornerPocket));
        assert_eq!(map.reason(Direction::Right), Some(EliminationReason::Reverse));
        assert!(map.is_safe(Direction::Up));
    }

    #[test]
    fn test_corner_pocket_top_right() {
        let you = snake("you", &[(9, 9), (8, 9)]);
        let map = evaluate(&board(11, 11, vec![you.clone()]), &you);
        assert_eq!(map.reason(Direction::Up), Some(EliminationReason::CornerPocket));
        assert_eq!(map.reason(Direction::Right), Some(EliminationReason::CornerPocket));
        assert!(map.is_safe(Direction::Down));
    }

    #[test]
    fn test_corner_pocket_applies_on_small_boards_by_default() {
        // Centre of a 3x3 board is diagonal to every corner
        let you = snake("you", &[(1, 1)]);
        let map = evaluate(&board(3, 3, vec![you.clone()]), &you);
        assert!(!map.any_safe());
        for dir in Direction::all() {
            assert_eq!(map.reason(dir), Some(EliminationReason::CornerPocket));
        }
    }

    #[test]
    fn test_corner_pocket_minimum_board_size() {
        let you = snake("you", &[(1, 1)]);
        let b = board(3, 3, vec![you.clone()]);
        let mut config = Config::default_hardcoded();
        config.safety.corner_min_board_size = 4;
        let map = SafetyFilter::new(&config.safety).evaluate(&b, &you);
        assert_eq!(map.safe_count(), 4);

        // 4x4 meets the minimum
        let b = board(4, 4, vec![you.clone()]);
        let map = SafetyFilter::new(&config.safety).evaluate(&b, &you);
        assert_eq!(map.reason(Direction::Left), Some(EliminationReason::CornerPocket));
        assert_eq!(map.reason(Direction::Down), Some(EliminationReason::CornerPocket));
    }

    #[test]
    fn test_corner_pocket_can_be_disabled() {
        let you = snake("you", &[(1, 1), (2, 1)]);
        let b = board(11, 11, vec![you.clone()]);
        let mut config = Config::default_hardcoded();
        config.safety.corner_avoidance = false;
        let map = SafetyFilter::new(&config.safety).evaluate(&b, &you);
        assert!(map.is_safe(Direction::Left));
        assert!(map.is_safe(Direction::Down));
    }

    #[test]
    fn test_one_by_one_board() {
        let you = snake("you", &[(0, 0)]);
        let map = evaluate(&board(1, 1, vec![you.clone()]), &you);
        assert!(!map.any_safe());
        for dir in Direction::all() {
            assert_eq!(map.reason(dir), Some(EliminationReason::OutOfBounds));
        }
    }

    #[test]
    fn test_empty_body_eliminates_everything() {
        let you = snake("you", &[]);
        let map = evaluate(&board(11, 11, vec![]), &you);
        assert!(!map.any_safe());
    }
}
