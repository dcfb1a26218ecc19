//! Game-end detection and win scoring.
//!
//! A game ends when one side has borne off all 15 pieces, or when a
//! double is declined. The margin of a bear-off win depends on how far
//! the loser got:
//!
//! | Class      | Loser's position                                   | Points |
//! |------------|----------------------------------------------------|--------|
//! | Normal     | borne off at least one piece                       | 1      |
//! | Gammon     | nothing borne off                                  | 2      |
//! | Backgammon | nothing borne off, and a piece on the bar or in   | 3      |
//! |            | the winner's home board                            |        |
//!
//! The doubling cube multiplies the result.

use serde::{Deserialize, Serialize};

use crate::board::{is_in_home_board, Board, PIECES_PER_SIDE};
use crate::core::Side;

/// Margin of a bear-off win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WinClass {
    Normal,
    Gammon,
    Backgammon,
}

impl WinClass {
    /// Points before the cube.
    #[must_use]
    pub const fn base_points(self) -> u32 {
        match self {
            WinClass::Normal => 1,
            WinClass::Gammon => 2,
            WinClass::Backgammon => 3,
        }
    }
}

impl std::fmt::Display for WinClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WinClass::Normal => write!(f, "single game"),
            WinClass::Gammon => write!(f, "gammon"),
            WinClass::Backgammon => write!(f, "backgammon"),
        }
    }
}

/// The side that has borne off every piece, if any.
#[must_use]
pub fn game_winner(board: &Board) -> Option<Side> {
    Side::ALL
        .into_iter()
        .find(|&side| board.off(side) == PIECES_PER_SIDE)
}

/// Classify a win by `winner` on `board`.
#[must_use]
pub fn win_class(board: &Board, winner: Side) -> WinClass {
    let loser = winner.opponent();
    if board.off(loser) > 0 {
        return WinClass::Normal;
    }

    let stranded = board.bar(loser) > 0
        || board
            .occupied(loser)
            .any(|(point, _)| is_in_home_board(winner, point));
    if stranded {
        WinClass::Backgammon
    } else {
        WinClass::Gammon
    }
}

/// Base points for `winner` (1, 2 or 3).
#[must_use]
pub fn calculate_win_points(board: &Board, winner: Side) -> u32 {
    win_class(board, winner).base_points()
}

/// Points after applying the cube.
#[must_use]
pub fn calculate_final_points(base: u32, cube_value: u32) -> u32 {
    base * cube_value
}

/// Human-readable result line.
#[must_use]
pub fn win_message(winner: Side, class: WinClass, points: u32) -> String {
    let unit = if points == 1 { "point" } else { "points" };
    format!("{winner} wins a {class} for {points} {unit}")
}
