//! Point occupancy.
//!
//! A point is either empty or holds one or more pieces of exactly one side.
//! Two sides can never share a point: hitting a blot replaces the occupant.

use serde::Serialize;

use crate::core::{EngineError, Side};

/// Occupancy of one of the 24 points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Point {
    /// No pieces.
    #[default]
    Empty,
    /// `count >= 1` pieces of `side`.
    Occupied { side: Side, count: u8 },
}

impl Point {
    /// A point holding `count` pieces of `side` (empty when `count == 0`).
    #[must_use]
    pub const fn new(side: Side, count: u8) -> Self {
        if count == 0 {
            Point::Empty
        } else {
            Point::Occupied { side, count }
        }
    }

    /// Build from a (white, black) count pair.
    ///
    /// Both counts non-zero is not a board position and reports
    /// `CorruptState`.
    pub fn from_counts(white: u8, black: u8) -> Result<Self, EngineError> {
        match (white, black) {
            (0, 0) => Ok(Point::Empty),
            (w, 0) => Ok(Point::new(Side::White, w)),
            (0, b) => Ok(Point::new(Side::Black, b)),
            (w, b) => Err(EngineError::corrupt(format!(
                "point holds {w} white and {b} black pieces"
            ))),
        }
    }

    /// The (white, black) count pair.
    #[must_use]
    pub fn counts(self) -> (u8, u8) {
        (self.count(Side::White), self.count(Side::Black))
    }

    /// Number of `side`'s pieces here.
    #[must_use]
    pub fn count(self, side: Side) -> u8 {
        match self {
            Point::Occupied { side: s, count } if s == side => count,
            _ => 0,
        }
    }

    /// The side occupying this point, if any.
    #[must_use]
    pub fn owner(self) -> Option<Side> {
        match self {
            Point::Empty => None,
            Point::Occupied { side, .. } => Some(side),
        }
    }

    /// Exactly one piece of `side`.
    #[must_use]
    pub fn is_blot_for(self, side: Side) -> bool {
        self.count(side) == 1
    }

    /// Two or more opposing pieces: `side` cannot land here.
    #[must_use]
    pub fn is_blocked_for(self, side: Side) -> bool {
        self.count(side.opponent()) >= 2
    }

    /// One more piece of `side`. The point must not hold opposing pieces.
    pub(crate) fn with_added(self, side: Side) -> Self {
        Point::new(side, self.count(side) + 1)
    }

    /// One fewer piece of `side`.
    pub(crate) fn with_removed(self, side: Side) -> Self {
        Point::new(side, self.count(side).saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_zero_is_empty() {
        assert_eq!(Point::new(Side::White, 0), Point::Empty);
        assert_eq!(Point::new(Side::White, 0).owner(), None);
    }

    #[test]
    fn test_counts() {
        let p = Point::new(Side::Black, 3);
        assert_eq!(p.counts(), (0, 3));
        assert_eq!(p.count(Side::Black), 3);
        assert_eq!(p.count(Side::White), 0);
        assert_eq!(p.owner(), Some(Side::Black));
    }

    #[test]
    fn test_blot_and_block() {
        let blot = Point::new(Side::White, 1);
        assert!(blot.is_blot_for(Side::White));
        assert!(!blot.is_blot_for(Side::Black));
        assert!(!blot.is_blocked_for(Side::Black));

        let block = Point::new(Side::White, 2);
        assert!(!block.is_blot_for(Side::White));
        assert!(block.is_blocked_for(Side::Black));
        assert!(!block.is_blocked_for(Side::White));
    }

    #[test]
    fn test_from_counts_rejects_shared_point() {
        assert_eq!(Point::from_counts(0, 0), Ok(Point::Empty));
        assert_eq!(Point::from_counts(2, 0), Ok(Point::new(Side::White, 2)));
        assert!(matches!(
            Point::from_counts(1, 1),
            Err(EngineError::CorruptState(_))
        ));
    }

    #[test]
    fn test_add_remove() {
        let p = Point::Empty.with_added(Side::White).with_added(Side::White);
        assert_eq!(p, Point::new(Side::White, 2));
        assert_eq!(p.with_removed(Side::White).with_removed(Side::White), Point::Empty);
    }
}
