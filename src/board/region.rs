//! Region classifier: which quarter of the board a point belongs to,
//! seen from one side.
//!
//! ```text
//!  White home  White outer  Black outer  Black home
//!    0..=5       6..=11      12..=17      18..=23
//! ```
//!
//! White bears off below point 0, Black above point 23.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::core::{Side, MAX_FACE, MIN_FACE};

/// Number of points on the board.
pub const POINT_COUNT: usize = 24;

/// Board quarter relative to a side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// The six points nearest the side's bearing-off edge.
    Home,
    /// The side's outer board.
    Outer,
    /// The opponent's outer board.
    OpponentOuter,
    /// The opponent's home board.
    OpponentHome,
}

/// Points of `side`'s home board.
#[must_use]
pub fn home_range(side: Side) -> RangeInclusive<u8> {
    match side {
        Side::White => 0..=5,
        Side::Black => 18..=23,
    }
}

/// True when `point` is in `side`'s home board.
#[must_use]
pub fn is_in_home_board(side: Side, point: u8) -> bool {
    home_range(side).contains(&point)
}

/// Classify `point` relative to `side`.
#[must_use]
pub fn region(side: Side, point: u8) -> Region {
    // Quarter index counted from the side's own bearing-off edge.
    let quarter = distance_to_edge(side, point).saturating_sub(1) / 6;
    match quarter {
        0 => Region::Home,
        1 => Region::Outer,
        2 => Region::OpponentOuter,
        _ => Region::OpponentHome,
    }
}

/// Pips from `point` to `side`'s bearing-off edge (1..=24 on the board).
///
/// Saturates for points off the board.
#[must_use]
pub fn distance_to_edge(side: Side, point: u8) -> u8 {
    match side {
        Side::White => point.saturating_add(1),
        Side::Black => (POINT_COUNT as u8).saturating_sub(point),
    }
}

/// Point where `side` re-enters from the bar with `die`, or `None` for a
/// face outside 1..=6.
#[must_use]
pub fn entry_point(side: Side, die: u8) -> Option<u8> {
    if !(MIN_FACE..=MAX_FACE).contains(&die) {
        return None;
    }
    Some(match side {
        Side::White => POINT_COUNT as u8 - die,
        Side::Black => die - 1,
    })
}

/// Point reached by moving `die` pips from `point`, or `None` when the
/// move runs past the bearing-off edge.
#[must_use]
pub fn advance(side: Side, point: u8, die: u8) -> Option<u8> {
    match side {
        Side::White => point.checked_sub(die),
        Side::Black => point
            .checked_add(die)
            .filter(|&to| usize::from(to) < POINT_COUNT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_ranges() {
        assert_eq!(home_range(Side::White), 0..=5);
        assert_eq!(home_range(Side::Black), 18..=23);
        assert!(is_in_home_board(Side::White, 5));
        assert!(!is_in_home_board(Side::White, 6));
        assert!(is_in_home_board(Side::Black, 18));
        assert!(!is_in_home_board(Side::Black, 17));
    }

    #[test]
    fn test_regions() {
        assert_eq!(region(Side::White, 0), Region::Home);
        assert_eq!(region(Side::White, 7), Region::Outer);
        assert_eq!(region(Side::White, 12), Region::OpponentOuter);
        assert_eq!(region(Side::White, 23), Region::OpponentHome);

        assert_eq!(region(Side::Black, 23), Region::Home);
        assert_eq!(region(Side::Black, 16), Region::Outer);
        assert_eq!(region(Side::Black, 11), Region::OpponentOuter);
        assert_eq!(region(Side::Black, 0), Region::OpponentHome);
    }

    #[test]
    fn test_region_agrees_with_home_range() {
        for side in Side::ALL {
            for point in 0..POINT_COUNT as u8 {
                assert_eq!(
                    region(side, point) == Region::Home,
                    is_in_home_board(side, point)
                );
            }
        }
    }

    #[test]
    fn test_distance_to_edge() {
        assert_eq!(distance_to_edge(Side::White, 0), 1);
        assert_eq!(distance_to_edge(Side::White, 23), 24);
        assert_eq!(distance_to_edge(Side::Black, 23), 1);
        assert_eq!(distance_to_edge(Side::Black, 0), 24);
    }

    #[test]
    fn test_entry_points() {
        assert_eq!(entry_point(Side::White, 1), Some(23));
        assert_eq!(entry_point(Side::White, 6), Some(18));
        assert_eq!(entry_point(Side::Black, 1), Some(0));
        assert_eq!(entry_point(Side::Black, 6), Some(5));
        for die in 1..=6 {
            assert!(entry_point(Side::White, die).is_some_and(|p| is_in_home_board(Side::Black, p)));
            assert!(entry_point(Side::Black, die).is_some_and(|p| is_in_home_board(Side::White, p)));
        }
        for side in Side::ALL {
            assert_eq!(entry_point(side, 0), None);
            assert_eq!(entry_point(side, 7), None);
        }
    }

    #[test]
    fn test_advance() {
        assert_eq!(advance(Side::White, 12, 5), Some(7));
        assert_eq!(advance(Side::White, 3, 4), None);
        assert_eq!(advance(Side::White, 3, 3), Some(0));
        assert_eq!(advance(Side::Black, 3, 2), Some(5));
        assert_eq!(advance(Side::Black, 20, 4), None);
    }

    #[test]
    fn test_off_board_points_do_not_overflow() {
        assert_eq!(advance(Side::Black, 250, 6), None);
        assert_eq!(advance(Side::Black, u8::MAX, 1), None);
        assert_eq!(distance_to_edge(Side::Black, 250), 0);
        assert_eq!(distance_to_edge(Side::White, u8::MAX), u8::MAX);
    }
}
