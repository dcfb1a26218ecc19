//! Match scoring.

pub mod match_state;

pub use match_state::{MatchState, MatchUpdate};
