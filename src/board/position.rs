//! The board: 24 points plus a bar and an off-board tray per side.
//!
//! ## Invariant
//!
//! For each side, pieces on points + bar + off == 15. Every constructor
//! that accepts arbitrary counts (`BoardBuilder::build`, `Board::from_parts`)
//! checks it and reports `CorruptState` otherwise. Moves preserve it.

use serde::{Deserialize, Serialize};

use super::point::Point;
use super::region::{distance_to_edge, is_in_home_board, POINT_COUNT};
use crate::core::{EngineError, Side, SideMap};

/// Pieces each side owns.
pub const PIECES_PER_SIDE: u8 = 15;

/// Pip value of a piece on the bar.
const BAR_PIPS: u32 = 25;

/// A place a piece can be: the bar, a point, or borne off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    /// Captured, waiting to re-enter.
    Bar,
    /// One of the 24 points, 0-indexed.
    Point(u8),
    /// Borne off.
    Off,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Bar => write!(f, "bar"),
            Location::Point(p) => write!(f, "point {p}"),
            Location::Off => write!(f, "off"),
        }
    }
}

/// Immutable-by-convention board snapshot.
///
/// Moves produce a new `Board`; the old one is left untouched. Serialized
/// as raw counts, and deserialization goes through `Board::from_parts`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "BoardParts", into = "BoardParts")]
pub struct Board {
    points: [Point; POINT_COUNT],
    bar: SideMap<u8>,
    off: SideMap<u8>,
}

/// Wire form of a `Board`.
#[derive(Serialize, Deserialize)]
struct BoardParts {
    points: [(u8, u8); POINT_COUNT],
    bar: SideMap<u8>,
    off: SideMap<u8>,
}

impl From<Board> for BoardParts {
    fn from(board: Board) -> Self {
        Self {
            points: board.counts(),
            bar: board.bar,
            off: board.off,
        }
    }
}

impl TryFrom<BoardParts> for Board {
    type Error = EngineError;

    fn try_from(parts: BoardParts) -> Result<Self, Self::Error> {
        Board::from_parts(&parts.points, parts.bar, parts.off)
    }
}

impl Board {
    /// Standard opening layout.
    ///
    /// ```
    /// use rust_backgammon::board::Board;
    /// use rust_backgammon::core::Side;
    ///
    /// let board = Board::starting();
    /// assert_eq!(board.point_counts(23), (2, 0));
    /// assert_eq!(board.pip_count(Side::White), 167);
    /// assert_eq!(board.pip_count(Side::Black), 167);
    /// ```
    #[must_use]
    pub fn starting() -> Self {
        let mut points = [Point::Empty; POINT_COUNT];
        for (point, count) in [(23, 2), (12, 5), (7, 3), (5, 5)] {
            points[point] = Point::new(Side::White, count);
        }
        for (point, count) in [(0, 2), (11, 5), (16, 3), (18, 5)] {
            points[point] = Point::new(Side::Black, count);
        }

        Self {
            points,
            bar: SideMap::with_value(0),
            off: SideMap::with_value(0),
        }
    }

    /// Build a board from raw counts, checking every invariant.
    pub fn from_parts(
        counts: &[(u8, u8); POINT_COUNT],
        bar: SideMap<u8>,
        off: SideMap<u8>,
    ) -> Result<Self, EngineError> {
        let mut points = [Point::Empty; POINT_COUNT];
        for (i, &(white, black)) in counts.iter().enumerate() {
            points[i] = Point::from_counts(white, black)
                .map_err(|e| EngineError::corrupt(format!("point {i}: {e}")))?;
        }

        let board = Self { points, bar, off };
        board.check_conservation()?;
        Ok(board)
    }

    fn check_conservation(&self) -> Result<(), EngineError> {
        for side in Side::ALL {
            let total = self.total(side);
            if total != u32::from(PIECES_PER_SIDE) {
                return Err(EngineError::corrupt(format!(
                    "{side} has {total} pieces, expected {PIECES_PER_SIDE}"
                )));
            }
        }
        Ok(())
    }

    // === Queries ===

    /// Occupancy of `point` (empty when out of range).
    #[must_use]
    pub fn point(&self, point: u8) -> Point {
        self.points.get(usize::from(point)).copied().unwrap_or_default()
    }

    /// (white, black) counts on `point`.
    #[must_use]
    pub fn point_counts(&self, point: u8) -> (u8, u8) {
        self.point(point).counts()
    }

    /// (white, black) counts for every point, in index order.
    #[must_use]
    pub fn counts(&self) -> [(u8, u8); POINT_COUNT] {
        let mut out = [(0, 0); POINT_COUNT];
        for (slot, point) in out.iter_mut().zip(self.points.iter()) {
            *slot = point.counts();
        }
        out
    }

    /// Exactly one piece of `side` on `point`.
    #[must_use]
    pub fn is_blot(&self, point: u8, side: Side) -> bool {
        self.point(point).is_blot_for(side)
    }

    /// Two or more of `side`'s opponents on `point`.
    #[must_use]
    pub fn is_blocked(&self, point: u8, side: Side) -> bool {
        self.point(point).is_blocked_for(side)
    }

    /// Pieces of `side` on the bar.
    #[must_use]
    pub fn bar(&self, side: Side) -> u8 {
        self.bar[side]
    }

    /// Pieces of `side` borne off.
    #[must_use]
    pub fn off(&self, side: Side) -> u8 {
        self.off[side]
    }

    /// Pieces of `side` at `location`.
    #[must_use]
    pub fn count_at(&self, side: Side, location: Location) -> u8 {
        match location {
            Location::Bar => self.bar(side),
            Location::Off => self.off(side),
            Location::Point(p) => self.point(p).count(side),
        }
    }

    /// Points holding `side`'s pieces, as (point, count).
    pub fn occupied(&self, side: Side) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter_map(move |(i, p)| match p.count(side) {
                0 => None,
                n => Some((i as u8, n)),
            })
    }

    /// Pieces of `side` on the 24 points.
    #[must_use]
    pub fn on_board(&self, side: Side) -> u32 {
        self.occupied(side).map(|(_, n)| u32::from(n)).sum()
    }

    /// Points + bar + off for `side`; always 15 on a valid board.
    #[must_use]
    pub fn total(&self, side: Side) -> u32 {
        self.on_board(side) + u32::from(self.bar(side)) + u32::from(self.off(side))
    }

    /// No piece of `side` on the bar or outside its home board.
    #[must_use]
    pub fn is_all_in_home_board(&self, side: Side) -> bool {
        self.bar(side) == 0 && self.occupied(side).all(|(p, _)| is_in_home_board(side, p))
    }

    /// Largest bear-off distance among `side`'s pieces (25 for the bar).
    #[must_use]
    pub fn farthest_distance(&self, side: Side) -> Option<u8> {
        if self.bar(side) > 0 {
            return Some(BAR_PIPS as u8);
        }
        self.occupied(side)
            .map(|(p, _)| distance_to_edge(side, p))
            .max()
    }

    /// Pips `side` still needs to bear everything off.
    #[must_use]
    pub fn pip_count(&self, side: Side) -> u32 {
        let on_points: u32 = self
            .occupied(side)
            .map(|(p, n)| u32::from(distance_to_edge(side, p)) * u32::from(n))
            .sum();
        on_points + u32::from(self.bar(side)) * BAR_PIPS
    }

    // === Mutation ===

    /// Move one piece of `side` from `from` to `to`, returning the new board
    /// and whether an opposing blot was hit.
    ///
    /// Legality is the validator's job; this only keeps counts consistent.
    #[must_use]
    pub(crate) fn with_move(&self, side: Side, from: Location, to: Location) -> (Board, bool) {
        let mut next = self.clone();
        match from {
            Location::Bar => next.bar[side] = next.bar[side].saturating_sub(1),
            Location::Point(p) => {
                let slot = &mut next.points[usize::from(p)];
                *slot = slot.with_removed(side);
            }
            Location::Off => next.off[side] = next.off[side].saturating_sub(1),
        }

        let mut hit = false;
        match to {
            Location::Bar => next.bar[side] += 1,
            Location::Point(p) => {
                let slot = &mut next.points[usize::from(p)];
                let opponent = side.opponent();
                if slot.count(opponent) > 0 {
                    next.bar[opponent] += slot.count(opponent);
                    *slot = Point::Empty;
                    hit = true;
                }
                *slot = slot.with_added(side);
            }
            Location::Off => next.off[side] += 1,
        }

        (next, hit)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::starting()
    }
}

/// Builder for arbitrary positions.
///
/// ```
/// use rust_backgammon::board::BoardBuilder;
/// use rust_backgammon::core::Side;
///
/// let board = BoardBuilder::new()
///     .place(Side::White, 5, 1)
///     .place(Side::Black, 3, 1)
///     .rest_off()
///     .build()
///     .unwrap();
///
/// assert_eq!(board.off(Side::White), 14);
/// ```
#[derive(Clone, Debug, Default)]
pub struct BoardBuilder {
    counts: [(u8, u8); POINT_COUNT],
    bar: SideMap<u8>,
    off: SideMap<u8>,
    rest_off: bool,
}

impl BoardBuilder {
    /// Start from an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `count` pieces of `side` on `point` (replacing what was there for that side).
    #[must_use]
    pub fn place(mut self, side: Side, point: u8, count: u8) -> Self {
        if let Some(slot) = self.counts.get_mut(usize::from(point)) {
            match side {
                Side::White => slot.0 = count,
                Side::Black => slot.1 = count,
            }
        }
        self
    }

    /// Put `count` pieces of `side` on the bar.
    #[must_use]
    pub fn bar(mut self, side: Side, count: u8) -> Self {
        self.bar[side] = count;
        self
    }

    /// Put `count` pieces of `side` off the board.
    #[must_use]
    pub fn off(mut self, side: Side, count: u8) -> Self {
        self.off[side] = count;
        self
    }

    /// Bear off whatever is not placed elsewhere, so each side totals 15.
    #[must_use]
    pub fn rest_off(mut self) -> Self {
        self.rest_off = true;
        self
    }

    /// Build and validate the position.
    pub fn build(self) -> Result<Board, EngineError> {
        let mut off = self.off;
        if self.rest_off {
            for side in Side::ALL {
                let placed: u32 = self
                    .counts
                    .iter()
                    .map(|&(w, b)| u32::from(if side == Side::White { w } else { b }))
                    .sum::<u32>()
                    + u32::from(self.bar[side]);
                let rest = u32::from(PIECES_PER_SIDE).checked_sub(placed).ok_or_else(|| {
                    EngineError::corrupt(format!("{side} has {placed} pieces placed"))
                })?;
                off[side] = rest as u8;
            }
        }
        Board::from_parts(&self.counts, self.bar, off)
    }
}
