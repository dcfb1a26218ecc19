//! Replay history.
//!
//! Every board the game passes through is kept in order, starting with
//! the opening layout. A viewing index lets a UI step back and forth
//! without touching the live game. Boards are shared structurally via
//! `im::Vector`, so cloning the history is O(1).

use im::Vector;

use crate::board::Board;
use crate::core::EngineError;

/// Ordered board snapshots plus the index being viewed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    boards: Vector<Board>,
    index: usize,
}

impl History {
    /// History that starts at `initial`.
    #[must_use]
    pub fn new(initial: Board) -> Self {
        Self {
            boards: Vector::unit(initial),
            index: 0,
        }
    }

    /// Rebuild from persisted parts.
    pub fn from_parts(boards: Vec<Board>, index: usize) -> Result<Self, EngineError> {
        if boards.is_empty() {
            return Err(EngineError::corrupt("empty replay history"));
        }
        if index >= boards.len() {
            return Err(EngineError::corrupt(format!(
                "replay index {index} out of {} entries",
                boards.len()
            )));
        }
        Ok(Self {
            boards: boards.into_iter().collect(),
            index,
        })
    }

    /// Append `board` and view it.
    pub fn record(&mut self, board: Board) {
        self.boards.push_back(board);
        self.index = self.boards.len() - 1;
    }

    /// Step back one board. Returns false at the start.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Step forward one board. Returns false at the end.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.boards.len() {
            return false;
        }
        self.index += 1;
        true
    }

    /// Board at the viewing index.
    #[must_use]
    pub fn current(&self) -> &Board {
        &self.boards[self.index]
    }

    /// Most recently recorded board.
    #[must_use]
    pub fn latest(&self) -> &Board {
        &self.boards[self.boards.len() - 1]
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    /// True when the viewing index is on the newest board.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.index + 1 == self.boards.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Board> {
        self.boards.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Location;
    use crate::core::Side;

    fn moved() -> Board {
        Board::starting()
            .with_move(Side::White, Location::Point(12), Location::Point(7))
            .0
    }

    #[test]
    fn test_navigation() {
        let mut history = History::new(Board::starting());
        history.record(moved());
        assert_eq!(history.len(), 2);
        assert!(history.is_live());

        assert!(history.back());
        assert_eq!(history.current(), &Board::starting());
        assert!(!history.back());

        assert!(history.forward());
        assert_eq!(history.current(), &moved());
        assert!(!history.forward());
    }

    #[test]
    fn test_record_jumps_to_latest() {
        let mut history = History::new(Board::starting());
        history.record(moved());
        history.back();
        history.record(Board::starting());

        assert_eq!(history.len(), 3);
        assert_eq!(history.index(), 2);
        assert_eq!(history.latest(), &Board::starting());
    }

    #[test]
    fn test_from_parts_checks_index() {
        assert!(History::from_parts(vec![], 0).is_err());
        assert!(History::from_parts(vec![Board::starting()], 1).is_err());
        assert!(History::from_parts(vec![Board::starting()], 0).is_ok());
    }
}
