//! Game and turn phases.

use serde::{Deserialize, Serialize};

/// Lifecycle of a single game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    /// Moves and cube actions are accepted.
    Playing,
    /// A winner has been decided; only a new game can follow.
    GameOver,
}

impl GamePhase {
    /// True while the game accepts moves.
    #[must_use]
    pub fn is_playing(self) -> bool {
        matches!(self, GamePhase::Playing)
    }
}

/// Where the side on turn stands within its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Waiting for dice.
    Rolling,
    /// Pieces on the bar must enter before anything else moves.
    ForcedReentry,
    /// Any legal move may be played.
    FreeMove,
    /// All dice are used or none can be played.
    TurnComplete,
}
