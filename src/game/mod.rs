//! Game flow on top of the rules.
//!
//! - `state`: the full per-game state value
//! - `history`: replay boards and viewing index
//! - `backgammon`: the engine a UI drives (sessions, dice, moves, cube)
//! - `snapshot`: JSON and binary persistence of a `GameState`
//! - `simulate`: random playouts of games and matches

pub mod state;
pub mod history;
pub mod backgammon;
pub mod snapshot;
pub mod simulate;

pub use state::GameState;
pub use history::History;
pub use backgammon::{Backgammon, MoveOutcome, RollOutcome};
pub use snapshot::{BoardSnapshot, HistorySnapshot, Snapshot};
pub use simulate::{MatchReport, MovePolicy, Playout, PlayoutConfig, RandomPolicy};
