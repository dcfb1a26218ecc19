//! Engine error taxonomy.
//!
//! Every rejection is local and non-fatal: the caller re-prompts the player
//! and keeps its previous state. `NoLegalMove` is the one variant that is
//! never shown to a player; it marks a die that is forfeited.

use crate::board::Location;

/// Why a move was rejected as `InvalidMove`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum InvalidMoveReason {
    /// The source holds none of the mover's pieces.
    #[display("no piece of the moving side at the source")]
    NoPieceAtSource,
    /// No unused die carries the piece to the destination.
    #[display("no available die reaches the destination")]
    Unreachable,
    /// The destination holds two or more opposing pieces.
    #[display("destination is blocked")]
    Blocked,
}

/// Why a doubling-cube action was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum CubeRejection {
    /// The game is not in the `Playing` phase.
    #[display("game is not in play")]
    NotInPlay,
    /// An offer is already waiting for an answer.
    #[display("an offer is already pending")]
    OfferPending,
    /// A centered cube cannot be turned before the opening roll.
    #[display("the cube cannot be turned before the opening roll")]
    OpeningRoll,
    /// The cube is owned by the opponent.
    #[display("the cube is owned by the opponent")]
    NotCubeOwner,
    /// Doubling is suspended for the Crawford game.
    #[display("doubling is not allowed in the Crawford game")]
    CrawfordGame,
    /// Doubling would exceed the configured maximum.
    #[display("the cube is already at its maximum value")]
    AtMaximum,
    /// Only the side on turn may double.
    #[display("only the side on turn may double")]
    NotYourTurn,
    /// Doubling must happen before rolling.
    #[display("the dice have already been rolled")]
    DiceRolled,
    /// A side cannot answer its own offer.
    #[display("a side cannot answer its own offer")]
    OwnOffer,
    /// Beaver or raccoon attempted at the wrong cube value.
    #[display("cube value must be {expected}, found {actual}")]
    WrongCubeValue { expected: u32, actual: u32 },
    /// Raccoon attempted without a preceding beaver by the opponent.
    #[display("no beaver to answer")]
    NoBeaver,
    /// Beavers or raccoons are disabled by configuration.
    #[display("disabled by the rules configuration")]
    Disabled,
}

/// Error that can occur when validating or applying an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum EngineError {
    /// Destination unreachable by any available die, or blocked.
    #[display("Invalid move from {from} to {to}: {reason}")]
    InvalidMove {
        from: Location,
        to: Location,
        reason: InvalidMoveReason,
    },

    /// A piece other than a bar piece was moved while pieces wait on the bar.
    #[display("Pieces on the bar must re-enter first")]
    MustReenterFromBar,

    /// The chosen die order strands a higher die that could be played.
    #[display("The higher die ({higher}) must be played")]
    MustUseHigherDieFirst { higher: u8 },

    /// The move leaves fewer dice playable than another sequence would.
    #[display("As many dice as possible must be played")]
    MustUseAllDice,

    /// Bearing off attempted outside the home board or with a mismatched die.
    #[display("Cannot bear off")]
    CannotBearOff,

    /// A doubling action is not allowed in the current state.
    #[display("Cannot double: {_0}")]
    CannotDouble(CubeRejection),

    /// Accept, reject, or beaver without a pending offer.
    #[display("No double has been offered")]
    NoPendingOffer,

    /// Rolling or moving while a double waits for an answer.
    #[display("A double offer must be answered first")]
    OfferPending,

    /// A rolled die has no legal application and is forfeited.
    #[display("No legal move")]
    NoLegalMove,

    /// The game is over.
    #[display("The game is not in play")]
    NotInPlay,

    /// A new game was requested while the current one is still running.
    #[display("The current game is still in progress")]
    GameInProgress,

    /// A move was attempted before rolling.
    #[display("The dice have not been rolled")]
    DiceNotRolled,

    /// A roll was attempted while dice are still in play.
    #[display("The dice have already been rolled")]
    DiceAlreadyRolled,

    /// A die face outside 1-6.
    #[display("Invalid die value {_0}")]
    InvalidDice(u8),

    /// Both opening dice showed the same face and must be re-rolled.
    #[display("Opening roll tied at {_0}")]
    OpeningTie(u8),

    /// Match length outside the supported menu.
    #[display("Unsupported match length {_0}")]
    InvalidMatchLength(u32),

    /// The match already has a winner.
    #[display("The match is over")]
    MatchOver,

    /// A persisted snapshot violates an engine invariant.
    #[display("Corrupt state: {_0}")]
    CorruptState(String),

    /// Rules configuration could not be parsed or is inconsistent.
    #[display("Invalid configuration: {_0}")]
    Config(String),

    /// Snapshot encoding failed.
    #[display("Encoding error: {_0}")]
    Codec(String),
}

impl std::error::Error for EngineError {}

impl EngineError {
    /// True for the internal forfeit signal rather than a player mistake.
    #[must_use]
    pub fn is_forfeit(&self) -> bool {
        matches!(self, EngineError::NoLegalMove)
    }

    /// Build a `CorruptState` error from any message.
    pub fn corrupt(message: impl Into<String>) -> Self {
        EngineError::CorruptState(message.into())
    }
}
