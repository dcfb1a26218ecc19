//! The backgammon engine.
//!
//! `Backgammon` is the entry point a UI talks to. It owns only the rules
//! configuration; every operation takes a `GameState` and returns a new
//! one, so a rejected operation leaves the caller's state untouched.
//!
//! ## Example
//!
//! ```
//! use rust_backgammon::board::Location;
//! use rust_backgammon::core::{RulesConfig, Side};
//! use rust_backgammon::game::Backgammon;
//!
//! let engine = Backgammon::new(RulesConfig::default()).unwrap();
//! let state = engine.start_new_match(5).unwrap();
//!
//! // White rolls 3, Black rolls 1: White starts and plays 3-1.
//! let (state, roll) = engine.apply_opening_roll(&state, 3, 1).unwrap();
//! assert_eq!(roll.side, Side::White);
//!
//! let (state, _) = engine
//!     .validate_and_apply_move(&state, Location::Point(7), Location::Point(4))
//!     .unwrap();
//! let (state, outcome) = engine
//!     .validate_and_apply_move(&state, Location::Point(5), Location::Point(4))
//!     .unwrap();
//!
//! assert!(outcome.turn_complete);
//! assert_eq!(state.turn(), Side::Black);
//! ```

use smallvec::SmallVec;
use tracing::{debug, info, instrument, warn};

use super::state::GameState;
use crate::board::{Location, PieceSet};
use crate::core::{
    CubeRejection, Dice, EngineError, GamePhase, GameRng, RulesConfig, Side, TurnPhase,
};
use crate::cube::CubeContext;
use crate::rules::{
    calculate_final_points, game_winner, has_legal_move, validate, win_class, GameEndReason,
    GameResult, RulesEngine, ValidatedMove, WinClass,
};
use crate::scoring::MatchState;

/// What a roll did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RollOutcome {
    /// Faces rolled. For the opening roll, the winning die comes first.
    pub faces: (u8, u8),
    /// Side that plays the roll.
    pub side: Side,
    /// True when no die could be played and the turn passed at once.
    pub forfeited: bool,
}

/// What a move did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    pub mv: ValidatedMove,
    /// True when the move ended the turn (or the game).
    pub turn_complete: bool,
    /// Dice that could not be played after this move.
    pub forfeited: SmallVec<[u8; 4]>,
    /// Set when the move bore off the last piece.
    pub result: Option<GameResult>,
}

/// Backgammon rules engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Backgammon {
    config: RulesConfig,
}

impl Backgammon {
    /// Create an engine with validated rules.
    pub fn new(config: RulesConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    // === Sessions ===

    /// Start a match to `length` points (odd, 1 to 25).
    #[instrument(skip(self))]
    pub fn start_new_match(&self, length: u32) -> Result<GameState, EngineError> {
        let match_state = MatchState::new(length)?;
        info!(length, "match started");
        Ok(GameState::new(match_state))
    }

    /// Start unlimited money play.
    #[must_use]
    pub fn start_money_session(&self) -> GameState {
        info!("money session started");
        GameState::new(MatchState::unlimited())
    }

    /// Next game of the same match or session, keeping the score.
    #[instrument(skip(self, state), fields(game = state.match_state.game_number()))]
    pub fn start_new_game(&self, state: &GameState) -> Result<GameState, EngineError> {
        if state.phase.is_playing() {
            return Err(EngineError::GameInProgress);
        }
        if state.match_state.is_over() {
            return Err(EngineError::MatchOver);
        }
        debug!("new game");
        Ok(GameState::new(state.match_state.clone()))
    }

    /// Abandon the match and fall back to a fresh money session.
    #[instrument(skip(self, state))]
    pub fn end_match(&self, state: &GameState) -> GameState {
        info!(
            white = state.match_state.score(Side::White),
            black = state.match_state.score(Side::Black),
            "match ended"
        );
        self.start_money_session()
    }

    // === Dice ===

    /// Roll for the opening, re-rolling ties, and start the first turn.
    pub fn roll_opening(
        &self,
        state: &GameState,
        rng: &mut GameRng,
    ) -> Result<(GameState, RollOutcome), EngineError> {
        loop {
            let (white, black) = rng.roll_pair();
            match self.apply_opening_roll(state, white, black) {
                Err(EngineError::OpeningTie(face)) => debug!(face, "opening roll tied"),
                other => return other,
            }
        }
    }

    /// Apply an opening roll: one die per side, higher die starts and plays
    /// both. Ties fail with `OpeningTie` and must be re-rolled.
    #[instrument(skip(self, state))]
    pub fn apply_opening_roll(
        &self,
        state: &GameState,
        white_die: u8,
        black_die: u8,
    ) -> Result<(GameState, RollOutcome), EngineError> {
        Self::ensure_can_roll(state)?;
        if state.opening_roll_made() {
            return Err(EngineError::DiceAlreadyRolled);
        }
        Dice::roll(white_die, black_die)?;
        if white_die == black_die {
            return Err(EngineError::OpeningTie(white_die));
        }

        let starter = if white_die > black_die {
            Side::White
        } else {
            Side::Black
        };
        info!(%starter, "opening roll");

        let mut next = state.clone();
        next.turn = starter;
        Self::begin_turn(next, white_die.max(black_die), white_die.min(black_die))
    }

    /// Roll for the side on turn. Before the opening roll this rolls the
    /// opening instead.
    pub fn roll_dice(
        &self,
        state: &GameState,
        rng: &mut GameRng,
    ) -> Result<(GameState, RollOutcome), EngineError> {
        if !state.opening_roll_made() {
            return self.roll_opening(state, rng);
        }
        let (first, second) = rng.roll_pair();
        self.apply_roll(state, first, second)
    }

    /// Apply externally rolled dice for the side on turn.
    ///
    /// Before the opening roll, `first` is White's die and `second` Black's.
    #[instrument(skip(self, state), fields(side = %state.turn))]
    pub fn apply_roll(
        &self,
        state: &GameState,
        first: u8,
        second: u8,
    ) -> Result<(GameState, RollOutcome), EngineError> {
        if !state.opening_roll_made() {
            return self.apply_opening_roll(state, first, second);
        }
        Self::ensure_can_roll(state)?;
        Self::begin_turn(state.clone(), first, second)
    }

    fn ensure_can_roll(state: &GameState) -> Result<(), EngineError> {
        if !state.phase.is_playing() {
            return Err(EngineError::NotInPlay);
        }
        if state.cube.pending_offer() {
            return Err(EngineError::OfferPending);
        }
        if !state.dice.is_empty() {
            return Err(EngineError::DiceAlreadyRolled);
        }
        Ok(())
    }

    fn begin_turn(
        mut next: GameState,
        first: u8,
        second: u8,
    ) -> Result<(GameState, RollOutcome), EngineError> {
        next.dice = Dice::roll(first, second)?;
        next.roll_count += 1;
        next.cube = next.cube.settled();

        let side = next.turn;
        let forfeited = !has_legal_move(&next.board, side, &next.dice);
        if forfeited {
            debug!(%side, first, second, "no legal move, turn passes");
            Self::pass_turn(&mut next);
        }

        Ok((
            next,
            RollOutcome {
                faces: (first, second),
                side,
                forfeited,
            },
        ))
    }

    fn pass_turn(state: &mut GameState) {
        state.turn = state.turn.opponent();
        state.dice = Dice::empty();
    }

    // === Moves ===

    /// Phase of the side on turn.
    #[must_use]
    pub fn turn_phase(&self, state: &GameState) -> TurnPhase {
        state.turn_phase()
    }

    /// Check a move without applying it.
    pub fn validate_move(
        &self,
        state: &GameState,
        from: Location,
        to: Location,
    ) -> Result<ValidatedMove, EngineError> {
        Self::ensure_can_move(state)?;
        validate(&state.board, state.turn, &state.dice, from, to)
    }

    fn ensure_can_move(state: &GameState) -> Result<(), EngineError> {
        if !state.phase.is_playing() {
            return Err(EngineError::NotInPlay);
        }
        if state.cube.pending_offer() {
            return Err(EngineError::OfferPending);
        }
        if state.dice.is_empty() {
            return Err(EngineError::DiceNotRolled);
        }
        Ok(())
    }

    /// Validate and play a move for the side on turn.
    ///
    /// Passes the turn when the dice are used up or the rest cannot be
    /// played, and ends the game when the last piece is borne off.
    #[instrument(skip(self, state), fields(side = %state.turn))]
    pub fn validate_and_apply_move(
        &self,
        state: &GameState,
        from: Location,
        to: Location,
    ) -> Result<(GameState, MoveOutcome), EngineError> {
        Self::ensure_can_move(state)?;

        let side = state.turn;
        let (turn, mv) = state.current_turn().play(from, to).map_err(|err| {
            warn!(%from, %to, %err, "move rejected");
            err
        })?;

        let mut next = state.clone();
        next.pieces = Self::track_pieces(&state.pieces, side, &mv, state.roll_count)?;
        next.board = turn.board().clone();
        next.dice = turn.dice().clone();
        next.history.record(next.board.clone());
        debug!(%mv, kind = ?mv.kind, "move applied");

        let mut outcome = MoveOutcome {
            mv,
            turn_complete: false,
            forfeited: SmallVec::new(),
            result: None,
        };

        if let Some(winner) = game_winner(&next.board) {
            let result = self.bear_off_result(&next, winner);
            outcome.result = Some(self.finish_game(&mut next, result)?);
            outcome.turn_complete = true;
        } else if turn.is_complete() {
            outcome.forfeited = turn.forfeited();
            if !outcome.forfeited.is_empty() {
                debug!(dice = ?outcome.forfeited, "remaining dice forfeited");
            }
            outcome.turn_complete = true;
            Self::pass_turn(&mut next);
        }

        Ok((next, outcome))
    }

    fn track_pieces(
        pieces: &PieceSet,
        side: Side,
        mv: &ValidatedMove,
        roll: u32,
    ) -> Result<PieceSet, EngineError> {
        let pieces = match (mv.kind.is_hit(), mv.to) {
            (true, Location::Point(point)) => pieces.send_to_bar(side.opponent(), point)?,
            _ => pieces.clone(),
        };
        pieces.relocate(side, mv.from, mv.to, roll)
    }

    fn bear_off_result(&self, state: &GameState, winner: Side) -> GameResult {
        let class = win_class(&state.board, winner);
        let jacoby = self.config.jacoby
            && !state.match_state.is_match_play()
            && !state.cube.was_turned();
        let base = if jacoby {
            WinClass::Normal.base_points()
        } else {
            class.base_points()
        };
        let points = calculate_final_points(base, state.cube.value());

        GameResult {
            winner,
            class,
            reason: GameEndReason::BoreOff,
            cube_value: state.cube.value(),
            points,
            awarded: points,
        }
    }

    fn finish_game(
        &self,
        next: &mut GameState,
        mut result: GameResult,
    ) -> Result<GameResult, EngineError> {
        let update = next.match_state.update(result.winner, result.points)?;
        result.awarded = update.awarded;

        next.match_state = update.state;
        next.phase = GamePhase::GameOver;
        next.dice = Dice::empty();
        next.result = Some(result);
        info!(%result, "game over");

        Ok(result)
    }

    // === Doubling cube ===

    fn cube_context(&self, state: &GameState) -> CubeContext<'_> {
        CubeContext::new(state.phase, &self.config)
            .with_opening_roll_made(state.opening_roll_made())
            .with_crawford_game(!state.match_state.can_double_in_match())
    }

    fn ensure_cube_in_play(state: &GameState) -> Result<(), EngineError> {
        if state.phase.is_playing() {
            Ok(())
        } else {
            Err(EngineError::CannotDouble(CubeRejection::NotInPlay))
        }
    }

    /// `side` offers a double before rolling.
    #[instrument(skip(self, state))]
    pub fn offer_double(&self, state: &GameState, side: Side) -> Result<GameState, EngineError> {
        Self::ensure_cube_in_play(state)?;
        if state.cube.pending_offer() {
            return Err(EngineError::CannotDouble(CubeRejection::OfferPending));
        }
        if side != state.turn {
            return Err(EngineError::CannotDouble(CubeRejection::NotYourTurn));
        }
        if !state.dice.is_empty() {
            return Err(EngineError::CannotDouble(CubeRejection::DiceRolled));
        }

        let cube = state.cube.offer(side, &self.cube_context(state)).map_err(|err| {
            warn!(%err, "double refused");
            err
        })?;
        Ok(GameState {
            cube,
            ..state.clone()
        })
    }

    /// `side` takes the pending double.
    #[instrument(skip(self, state))]
    pub fn accept_double(&self, state: &GameState, side: Side) -> Result<GameState, EngineError> {
        Self::ensure_cube_in_play(state)?;
        let cube = state.cube.accept(side)?;
        Ok(GameState {
            cube,
            ..state.clone()
        })
    }

    /// `side` declines the pending double and concedes the game at the
    /// pre-double value.
    #[instrument(skip(self, state))]
    pub fn reject_double(
        &self,
        state: &GameState,
        side: Side,
    ) -> Result<(GameState, GameResult), EngineError> {
        Self::ensure_cube_in_play(state)?;
        if state.cube.offering_player() == Some(side) {
            return Err(EngineError::CannotDouble(CubeRejection::OwnOffer));
        }
        let declined = state.cube.reject()?;

        let mut next = state.clone();
        next.cube = declined.cube;
        let result = GameResult {
            winner: declined.winner,
            class: WinClass::Normal,
            reason: GameEndReason::DoubleDeclined,
            cube_value: declined.points,
            points: declined.points,
            awarded: declined.points,
        };
        let result = self.finish_game(&mut next, result)?;
        Ok((next, result))
    }

    /// `side` takes the pending double at 2 and immediately redoubles to 4.
    #[instrument(skip(self, state))]
    pub fn beaver_double(&self, state: &GameState, side: Side) -> Result<GameState, EngineError> {
        Self::ensure_cube_in_play(state)?;
        let cube = state.cube.beaver(side, &self.config)?;
        Ok(GameState {
            cube,
            ..state.clone()
        })
    }

    /// The original doubler answers a beaver by redoubling to 8.
    #[instrument(skip(self, state))]
    pub fn raccoon_double(&self, state: &GameState, side: Side) -> Result<GameState, EngineError> {
        Self::ensure_cube_in_play(state)?;
        let cube = state.cube.raccoon(side, &self.config)?;
        Ok(GameState {
            cube,
            ..state.clone()
        })
    }

    // === Replay ===

    /// View the previous board in the replay history.
    #[must_use]
    pub fn replay_back(&self, state: &GameState) -> GameState {
        let mut next = state.clone();
        next.history.back();
        next
    }

    /// View the next board in the replay history.
    #[must_use]
    pub fn replay_forward(&self, state: &GameState) -> GameState {
        let mut next = state.clone();
        next.history.forward();
        next
    }
}

impl RulesEngine for Backgammon {
    type State = GameState;
    type Move = ValidatedMove;

    fn legal_moves(&self, state: &GameState) -> Vec<ValidatedMove> {
        state.legal_moves()
    }

    fn apply_move(&self, state: &GameState, mv: &ValidatedMove) -> Result<GameState, EngineError> {
        self.validate_and_apply_move(state, mv.from, mv.to)
            .map(|(next, _)| next)
    }

    fn is_terminal(&self, state: &GameState) -> Option<GameResult> {
        state.result
    }
}
