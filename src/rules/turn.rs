//! Turn resolver.
//!
//! A `Turn` is one side's roll in progress: the board, the dice with their
//! used flags, and the moves played so far. Playing a move returns a new
//! `Turn`; the previous one is untouched, so a rejected move never leaves
//! partial state behind.
//!
//! ## Phases
//!
//! ```text
//! Rolling --roll--> ForcedReentry --(bar empty)--> FreeMove --> TurnComplete
//!            \_____________________________________/
//! ```
//!
//! `TurnComplete` is reached when every die is used or none of the
//! remaining dice has a legal application. Those dice are forfeited.

use smallvec::SmallVec;

use super::movegen::{has_legal_move, legal_moves};
use super::validator::{validate, ValidatedMove};
use crate::board::{Board, Location};
use crate::core::{Dice, EngineError, Side, TurnPhase};

/// One side's turn in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    side: Side,
    board: Board,
    dice: Dice,
    played: SmallVec<[ValidatedMove; 4]>,
}

impl Turn {
    /// Start a turn for `side` with freshly rolled `dice`.
    #[must_use]
    pub fn begin(board: Board, side: Side, dice: Dice) -> Self {
        Self {
            side,
            board,
            dice,
            played: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    /// Moves played so far, in order.
    #[must_use]
    pub fn played(&self) -> &[ValidatedMove] {
        &self.played
    }

    /// Current phase of the turn.
    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        if self.dice.is_empty() {
            TurnPhase::Rolling
        } else if self.dice.all_used() || !has_legal_move(&self.board, self.side, &self.dice) {
            TurnPhase::TurnComplete
        } else if self.board.bar(self.side) > 0 {
            TurnPhase::ForcedReentry
        } else {
            TurnPhase::FreeMove
        }
    }

    /// True once nothing more can be played.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase() == TurnPhase::TurnComplete
    }

    /// Every move legal right now.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<ValidatedMove> {
        legal_moves(&self.board, self.side, &self.dice)
    }

    /// Play one move, consuming the die that validation selects.
    pub fn play(&self, from: Location, to: Location) -> Result<(Turn, ValidatedMove), EngineError> {
        if self.dice.is_empty() {
            return Err(EngineError::DiceNotRolled);
        }

        let mv = validate(&self.board, self.side, &self.dice, from, to)?;

        let mut next = self.clone();
        next.board = mv.apply(&self.board, self.side);
        if !next.dice.mark_used(mv.die) {
            return Err(EngineError::corrupt(format!("die {} was not available", mv.die)));
        }
        next.played.push(mv);

        Ok((next, mv))
    }

    /// Dice that will go unplayed. Empty until the turn is complete.
    #[must_use]
    pub fn forfeited(&self) -> SmallVec<[u8; 4]> {
        if self.is_complete() {
            self.dice.unused()
        } else {
            SmallVec::new()
        }
    }
}
