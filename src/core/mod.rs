//! Core engine types: sides, dice, RNG, phases, configuration, errors.
//!
//! These are the building blocks shared by the board, rules, cube, and
//! scoring modules.

pub mod side;
pub mod dice;
pub mod rng;
pub mod config;
pub mod phase;
pub mod error;

pub use side::{Side, SideMap};
pub use dice::{Dice, Die, MAX_FACE, MIN_FACE};
pub use rng::{GameRng, GameRngState};
pub use config::{is_valid_match_length, RulesConfig, MATCH_LENGTHS};
pub use phase::{GamePhase, TurnPhase};
pub use error::{CubeRejection, EngineError, InvalidMoveReason};
