//! Rules engine trait and game results.
//!
//! `RulesEngine` is the seam between the backgammon rules and generic
//! drivers such as the random playout in `game::simulate`:
//! - What moves are legal
//! - How a move changes the state
//! - When the game is over, and with what result

use serde::{Deserialize, Serialize};

use super::game_end::{win_message, WinClass};
use crate::core::{EngineError, Side};

/// How a game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameEndReason {
    /// The winner bore off all 15 pieces.
    BoreOff,
    /// The loser declined a double.
    DoubleDeclined,
}

/// Result of a completed game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner: Side,
    pub class: WinClass,
    pub reason: GameEndReason,
    /// Cube value the game was played for.
    pub cube_value: u32,
    /// Points won, cube included.
    pub points: u32,
    /// Points credited to the match score after the match-length cap.
    pub awarded: u32,
}

impl GameResult {
    /// Check if a side won.
    #[must_use]
    pub fn is_winner(&self, side: Side) -> bool {
        self.winner == side
    }
}

impl std::fmt::Display for GameResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.reason {
            GameEndReason::BoreOff => {
                write!(f, "{}", win_message(self.winner, self.class, self.points))
            }
            GameEndReason::DoubleDeclined => write!(
                f,
                "{} wins {} on a declined double",
                self.winner, self.points
            ),
        }
    }
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `legal_moves`: Empty when the side on turn cannot act (no dice, game over)
/// - `apply_move`: Must be deterministic; dice come from the state
/// - `is_terminal`: Return None if the game continues
pub trait RulesEngine {
    /// Full game state the engine operates on.
    type State;
    /// A single move.
    type Move;

    /// Moves the side on turn may play now.
    fn legal_moves(&self, state: &Self::State) -> Vec<Self::Move>;

    /// Apply a move, returning the new state.
    fn apply_move(&self, state: &Self::State, mv: &Self::Move) -> Result<Self::State, EngineError>;

    /// Check if the game is over.
    fn is_terminal(&self, state: &Self::State) -> Option<GameResult>;

    // === Convenience Methods ===

    /// True when at least one move is available.
    fn has_legal_move(&self, state: &Self::State) -> bool {
        !self.legal_moves(state).is_empty()
    }
}
