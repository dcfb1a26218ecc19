//! Per-piece tracking.
//!
//! The board only stores counts. `PieceSet` additionally gives each of the
//! 30 pieces an identity so callers can show move counts or highlight the
//! piece that moved last. Pieces are created when a game starts and live
//! until the next game; every update returns a new set and leaves the
//! other pieces untouched.
//!
//! ## Identity layout
//!
//! - `0..15`: White pieces
//! - `15..30`: Black pieces
//!
//! Within a side, ids are handed out bar first, then points in index
//! order, then borne-off pieces.

use im::Vector;
use serde::{Deserialize, Serialize};

use super::position::{Board, Location, PIECES_PER_SIDE};
use super::region::POINT_COUNT;
use crate::core::{EngineError, Side};

/// Total pieces in play.
pub const PIECE_COUNT: usize = 2 * PIECES_PER_SIDE as usize;

/// Stable identifier of one piece for the duration of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PieceId(pub u8);

impl PieceId {
    /// Get the raw index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Where a piece is in its life cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceState {
    /// On one of the 24 points.
    Active,
    /// Hit and waiting on the bar.
    OnBar,
    /// Removed from play.
    BorneOff,
}

impl PieceState {
    /// State implied by a location.
    #[must_use]
    pub fn at(location: Location) -> Self {
        match location {
            Location::Bar => PieceState::OnBar,
            Location::Point(_) => PieceState::Active,
            Location::Off => PieceState::BorneOff,
        }
    }
}

/// One tracked piece.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub player: Side,
    pub position: Location,
    pub state: PieceState,
    /// Moves this piece has made (being hit does not count).
    pub move_count: u32,
    /// Roll number of the piece's last move.
    pub last_move_turn: Option<u32>,
}

/// All 30 pieces of a game.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PieceSet {
    pieces: Vector<Piece>,
}

impl PieceSet {
    /// Create fresh pieces matching `board`.
    #[must_use]
    pub fn from_board(board: &Board) -> Self {
        let mut pieces = Vector::new();

        for side in Side::ALL {
            let mut locations: Vec<Location> = Vec::with_capacity(PIECES_PER_SIDE as usize);
            locations.extend(std::iter::repeat(Location::Bar).take(usize::from(board.bar(side))));
            for (point, count) in board.occupied(side) {
                locations.extend(std::iter::repeat(Location::Point(point)).take(usize::from(count)));
            }
            locations.extend(std::iter::repeat(Location::Off).take(usize::from(board.off(side))));

            for position in locations {
                pieces.push_back(Piece {
                    id: PieceId(pieces.len() as u8),
                    player: side,
                    position,
                    state: PieceState::at(position),
                    move_count: 0,
                    last_move_turn: None,
                });
            }
        }

        Self { pieces }
    }

    /// Rebuild from a persisted list, checking that it describes `board`.
    pub fn from_pieces(pieces: Vec<Piece>, board: &Board) -> Result<Self, EngineError> {
        for (i, piece) in pieces.iter().enumerate() {
            if piece.id.index() != i {
                return Err(EngineError::corrupt(format!(
                    "piece at index {i} has id {}",
                    piece.id.0
                )));
            }
            if piece.state != PieceState::at(piece.position) {
                return Err(EngineError::corrupt(format!(
                    "piece {i} is {:?} at {}",
                    piece.state, piece.position
                )));
            }
            if let Location::Point(p) = piece.position {
                if usize::from(p) >= POINT_COUNT {
                    return Err(EngineError::corrupt(format!("piece {i} on point {p}")));
                }
            }
        }

        let set = Self {
            pieces: pieces.into_iter().collect(),
        };
        if !set.agrees_with(board) {
            return Err(EngineError::corrupt("piece list does not match the board"));
        }
        Ok(set)
    }

    /// Number of pieces (30 for a valid set).
    #[must_use]
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// True for an empty set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Iterate in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.pieces.iter()
    }

    /// Look up a piece by id.
    #[must_use]
    pub fn get(&self, id: PieceId) -> Option<&Piece> {
        self.pieces.get(id.index())
    }

    /// Pieces of `side` at `location`, in id order.
    pub fn at(&self, side: Side, location: Location) -> impl Iterator<Item = &Piece> {
        self.pieces
            .iter()
            .filter(move |p| p.player == side && p.position == location)
    }

    /// True when `id` is the only piece of its side on its point.
    #[must_use]
    pub fn is_blot(&self, id: PieceId) -> bool {
        match self.get(id) {
            Some(piece) if matches!(piece.position, Location::Point(_)) => {
                self.at(piece.player, piece.position).count() == 1
            }
            _ => false,
        }
    }

    /// Move piece `id` to `to` as a move made on roll `turn`.
    pub fn move_piece(&self, id: PieceId, to: Location, turn: u32) -> Result<Self, EngineError> {
        let mut piece = self
            .get(id)
            .cloned()
            .ok_or_else(|| EngineError::corrupt(format!("no piece with id {}", id.0)))?;

        piece.position = to;
        piece.state = PieceState::at(to);
        piece.move_count += 1;
        piece.last_move_turn = Some(turn);

        Ok(Self {
            pieces: self.pieces.update(id.index(), piece),
        })
    }

    /// Move the lowest-id piece of `side` at `from` to `to`.
    pub fn relocate(
        &self,
        side: Side,
        from: Location,
        to: Location,
        turn: u32,
    ) -> Result<Self, EngineError> {
        let id = self.first_at(side, from)?;
        self.move_piece(id, to, turn)
    }

    /// Send the piece of `side` on `point` to the bar after a hit.
    pub fn send_to_bar(&self, side: Side, point: u8) -> Result<Self, EngineError> {
        let id = self.first_at(side, Location::Point(point))?;
        let mut piece = self.pieces[id.index()].clone();
        piece.position = Location::Bar;
        piece.state = PieceState::OnBar;

        Ok(Self {
            pieces: self.pieces.update(id.index(), piece),
        })
    }

    fn first_at(&self, side: Side, location: Location) -> Result<PieceId, EngineError> {
        self.at(side, location)
            .map(|p| p.id)
            .next()
            .ok_or_else(|| EngineError::corrupt(format!("no {side} piece at {location}")))
    }

    /// True when the pieces sit exactly where `board` says.
    #[must_use]
    pub fn agrees_with(&self, board: &Board) -> bool {
        if self.pieces.len() != PIECE_COUNT {
            return false;
        }

        let mut rebuilt = [(0u8, 0u8); POINT_COUNT];
        let mut bar = [0u8; 2];
        let mut off = [0u8; 2];
        for piece in &self.pieces {
            let side = piece.player.index();
            match piece.position {
                Location::Bar => bar[side] += 1,
                Location::Off => off[side] += 1,
                Location::Point(p) => {
                    let Some(slot) = rebuilt.get_mut(usize::from(p)) else {
                        return false;
                    };
                    if side == 0 {
                        slot.0 += 1;
                    } else {
                        slot.1 += 1;
                    }
                }
            }
        }

        rebuilt == board.counts()
            && Side::ALL
                .iter()
                .all(|&s| bar[s.index()] == board.bar(s) && off[s.index()] == board.off(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardBuilder;

    #[test]
    fn test_from_board_creates_thirty_pieces() {
        let board = Board::starting();
        let pieces = PieceSet::from_board(&board);

        assert_eq!(pieces.len(), PIECE_COUNT);
        assert_eq!(pieces.iter().filter(|p| p.player == Side::White).count(), 15);
        assert!(pieces.iter().take(15).all(|p| p.player == Side::White));
        assert!(pieces.agrees_with(&board));
    }

    #[test]
    fn test_move_piece_is_non_destructive() {
        let board = Board::starting();
        let pieces = PieceSet::from_board(&board);
        let moved = pieces
            .relocate(Side::White, Location::Point(23), Location::Point(20), 1)
            .unwrap();

        let original: Vec<_> = pieces.at(Side::White, Location::Point(23)).collect();
        assert_eq!(original.len(), 2);

        let landed: Vec<_> = moved.at(Side::White, Location::Point(20)).collect();
        assert_eq!(landed.len(), 1);
        assert_eq!(landed[0].move_count, 1);
        assert_eq!(landed[0].last_move_turn, Some(1));

        // Every other piece is unchanged.
        let changed = pieces
            .iter()
            .zip(moved.iter())
            .filter(|(a, b)| a != b)
            .count();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_is_blot_derived() {
        let board = BoardBuilder::new()
            .place(Side::White, 5, 1)
            .place(Side::White, 4, 2)
            .rest_off()
            .build()
            .unwrap();
        let pieces = PieceSet::from_board(&board);

        let lone = pieces.at(Side::White, Location::Point(5)).next().unwrap().id;
        let paired = pieces.at(Side::White, Location::Point(4)).next().unwrap().id;
        let off = pieces.at(Side::White, Location::Off).next().unwrap().id;

        assert!(pieces.is_blot(lone));
        assert!(!pieces.is_blot(paired));
        assert!(!pieces.is_blot(off));
    }

    #[test]
    fn test_send_to_bar_keeps_move_count() {
        let board = BoardBuilder::new()
            .place(Side::White, 5, 1)
            .rest_off()
            .build()
            .unwrap();
        let pieces = PieceSet::from_board(&board);
        let hit = pieces.send_to_bar(Side::White, 5).unwrap();

        let piece = hit.at(Side::White, Location::Bar).next().unwrap();
        assert_eq!(piece.state, PieceState::OnBar);
        assert_eq!(piece.move_count, 0);
    }

    #[test]
    fn test_from_pieces_detects_mismatch() {
        let board = Board::starting();
        let mut list: Vec<Piece> = PieceSet::from_board(&board).iter().cloned().collect();
        assert!(PieceSet::from_pieces(list.clone(), &board).is_ok());

        list[0].position = Location::Off;
        list[0].state = PieceState::BorneOff;
        assert!(matches!(
            PieceSet::from_pieces(list, &board),
            Err(EngineError::CorruptState(_))
        ));
    }

    #[test]
    fn test_relocate_missing_piece_errors() {
        let pieces = PieceSet::from_board(&Board::starting());
        let result = pieces.relocate(Side::White, Location::Point(0), Location::Off, 1);
        assert!(matches!(result, Err(EngineError::CorruptState(_))));
    }
}
