//! Full game state.
//!
//! `GameState` bundles every piece of state the engine needs between two
//! calls: board, dice, side on turn, phase, cube, match score, replay
//! history and piece tracking. It is a plain value; the engine never
//! mutates a state it was given and always returns a new one.

use crate::board::{Board, PieceSet};
use crate::core::{Dice, EngineError, GamePhase, Side, TurnPhase};
use crate::cube::CubeState;
use crate::rules::{game_winner, GameResult, Turn, ValidatedMove};
use crate::scoring::MatchState;

use super::history::History;

/// State of one game within a match or money session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    pub(crate) board: Board,
    pub(crate) dice: Dice,
    pub(crate) turn: Side,
    pub(crate) phase: GamePhase,
    pub(crate) cube: CubeState,
    pub(crate) match_state: MatchState,
    pub(crate) history: History,
    pub(crate) pieces: PieceSet,
    /// Rolls made this game, the opening roll included.
    pub(crate) roll_count: u32,
    pub(crate) result: Option<GameResult>,
}

impl GameState {
    /// Fresh game from the opening layout, waiting for the opening roll.
    #[must_use]
    pub fn new(match_state: MatchState) -> Self {
        let board = Board::starting();
        Self {
            dice: Dice::empty(),
            turn: Side::White,
            phase: GamePhase::Playing,
            cube: CubeState::new(),
            match_state,
            history: History::new(board.clone()),
            pieces: PieceSet::from_board(&board),
            roll_count: 0,
            result: None,
            board,
        }
    }

    /// Game set up from an arbitrary position with `turn` about to roll.
    ///
    /// The opening roll counts as made, so the cube may be turned at once.
    /// Fails on a board where a side has already borne everything off.
    pub fn from_position(
        board: Board,
        turn: Side,
        match_state: MatchState,
    ) -> Result<Self, EngineError> {
        if let Some(winner) = game_winner(&board) {
            return Err(EngineError::corrupt(format!(
                "{winner} has already borne off every piece"
            )));
        }
        match_state.validate()?;
        if match_state.is_over() {
            return Err(EngineError::MatchOver);
        }
        Ok(Self {
            turn,
            roll_count: 1,
            ..Self::new(match_state)
        }
        .with_board(board))
    }

    fn with_board(mut self, board: Board) -> Self {
        self.history = History::new(board.clone());
        self.pieces = PieceSet::from_board(&board);
        self.board = board;
        self
    }

    // === Accessors ===

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    /// Side on turn.
    #[must_use]
    pub fn turn(&self) -> Side {
        self.turn
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn cube(&self) -> &CubeState {
        &self.cube
    }

    #[must_use]
    pub fn match_state(&self) -> &MatchState {
        &self.match_state
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn pieces(&self) -> &PieceSet {
        &self.pieces
    }

    #[must_use]
    pub fn roll_count(&self) -> u32 {
        self.roll_count
    }

    /// Result once the game is over.
    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    // === Derived ===

    /// True once the opening roll has decided who starts.
    #[must_use]
    pub fn opening_roll_made(&self) -> bool {
        self.roll_count > 0
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// The side on turn's roll in progress.
    #[must_use]
    pub fn current_turn(&self) -> Turn {
        Turn::begin(self.board.clone(), self.turn, self.dice.clone())
    }

    #[must_use]
    pub fn turn_phase(&self) -> TurnPhase {
        if self.is_over() {
            return TurnPhase::TurnComplete;
        }
        self.current_turn().phase()
    }

    /// Moves legal for the side on turn.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<ValidatedMove> {
        if !self.phase.is_playing() || self.cube.pending_offer() {
            return Vec::new();
        }
        self.current_turn().legal_moves()
    }

    /// Board at the replay viewing index.
    #[must_use]
    pub fn replay_board(&self) -> &Board {
        self.history.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game() {
        let state = GameState::new(MatchState::unlimited());
        assert_eq!(state.board(), &Board::starting());
        assert!(state.dice().is_empty());
        assert_eq!(state.phase(), GamePhase::Playing);
        assert!(!state.opening_roll_made());
        assert_eq!(state.turn_phase(), TurnPhase::Rolling);
        assert!(state.legal_moves().is_empty());
        assert_eq!(state.history().len(), 1);
        assert!(state.pieces().agrees_with(state.board()));
    }

    #[test]
    fn test_from_position() {
        use crate::board::BoardBuilder;

        let board = BoardBuilder::new()
            .place(Side::White, 3, 2)
            .place(Side::Black, 20, 1)
            .rest_off()
            .build()
            .unwrap();
        let state = GameState::from_position(board.clone(), Side::Black, MatchState::unlimited())
            .unwrap();

        assert_eq!(state.turn(), Side::Black);
        assert!(state.opening_roll_made());
        assert_eq!(state.history().len(), 1);
        assert_eq!(state.replay_board(), &board);
        assert!(state.pieces().agrees_with(&board));
    }

    #[test]
    fn test_from_position_rejects_finished_board() {
        use crate::board::BoardBuilder;

        let board = BoardBuilder::new()
            .place(Side::Black, 20, 1)
            .rest_off()
            .build()
            .unwrap();
        assert!(GameState::from_position(board, Side::Black, MatchState::unlimited()).is_err());
    }
}
