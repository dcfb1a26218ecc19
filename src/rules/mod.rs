//! Backgammon rules.
//!
//! - `validator`: single-move legality, including the dice-usage rules
//! - `movegen`: legal move enumeration and the maximum-dice search
//! - `turn`: one side's roll in progress
//! - `game_end`: winner detection and gammon/backgammon scoring
//! - `engine`: the `RulesEngine` trait and `GameResult`
//!
//! Everything here is a pure function of a `Board` and `Dice`; match,
//! cube and history state live in `game`.

pub mod engine;
pub mod game_end;
pub mod movegen;
pub mod turn;
pub mod validator;

pub use engine::{GameEndReason, GameResult, RulesEngine};
pub use game_end::{
    calculate_final_points, calculate_win_points, game_winner, win_class, win_message, WinClass,
};
pub use movegen::{has_legal_move, legal_moves, max_dice_playable, raw_targets, single_moves, targets_from};
pub use turn::Turn;
pub use validator::{destination, validate, MoveKind, ValidatedMove};
