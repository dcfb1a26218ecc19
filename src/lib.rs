//! # rust-backgammon
//!
//! A backgammon rules engine: move validation, the doubling cube, and
//! match scoring with the Crawford rule.
//!
//! ## Design Principles
//!
//! 1. **Values, Not Objects**: Every engine operation takes a `GameState`
//!    and returns a new one. A rejected operation leaves the caller's state
//!    as it was, so a UI can re-prompt without undo logic.
//!
//! 2. **One Direction Convention**: White moves from point 23 toward 0 and
//!    bears off below 0; Black moves from 0 toward 23 and bears off above 23.
//!    All geometry goes through `board::region`.
//!
//! 3. **Rules as Configuration**: Beavers, raccoons, the Jacoby rule and the
//!    cube ceiling live in `RulesConfig`, loadable from TOML.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: Replay history and piece tracking use
//!   `im-rs`, so cloning a state is cheap.
//!
//! - **Deterministic Dice**: `GameRng` is a seeded ChaCha8 stream. Dice can
//!   also be supplied from outside through `apply_roll`.
//!
//! ## Modules
//!
//! - `core`: sides, dice, RNG, phases, configuration, errors
//! - `board`: board model, regions, piece identity
//! - `rules`: move validation, move generation, turns, game end
//! - `cube`: doubling cube state machine
//! - `scoring`: match score and the Crawford rule
//! - `game`: the engine, game state, replay, persistence, playouts

pub mod core;
pub mod board;
pub mod rules;
pub mod cube;
pub mod scoring;
pub mod game;

// Re-export commonly used types
pub use crate::core::{
    CubeRejection, Dice, EngineError, GamePhase, GameRng, GameRngState, InvalidMoveReason,
    RulesConfig, Side, SideMap, TurnPhase,
};

pub use crate::board::{Board, BoardBuilder, Location, Piece, PieceId, PieceSet};

pub use crate::rules::{GameEndReason, GameResult, RulesEngine, ValidatedMove, WinClass};

pub use crate::cube::CubeState;

pub use crate::scoring::MatchState;

pub use crate::game::{
    Backgammon, GameState, History, MatchReport, MoveOutcome, Playout, PlayoutConfig,
    RollOutcome, Snapshot,
};
