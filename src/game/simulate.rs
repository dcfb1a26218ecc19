//! Random playouts.
//!
//! Drives whole games and matches through the public engine API with a
//! pluggable move policy. Used by the integration tests, the benchmark
//! and the `bg-selfplay` binary.
//!
//! ```
//! use rust_backgammon::core::GameRng;
//! use rust_backgammon::game::{Backgammon, Playout};
//!
//! let engine = Backgammon::default();
//! let mut rng = GameRng::new(42);
//!
//! let state = engine.start_new_match(3).unwrap();
//! let report = Playout::new(&engine).play_match(&state, &mut rng).unwrap();
//! assert!(report.final_state.match_state().is_over());
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backgammon::Backgammon;
use super::state::GameState;
use crate::core::{EngineError, GameRng};
use crate::rules::{GameResult, RulesEngine, ValidatedMove};

/// Playout parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayoutConfig {
    /// Chance the side on turn offers a double when allowed.
    pub double_probability: f64,

    /// Chance an offered double is taken rather than declined.
    pub take_probability: f64,

    /// Chance a take is made as a beaver, when beavers are allowed.
    pub beaver_probability: f64,

    /// Rolls after which a game is abandoned (0 = unlimited).
    pub max_rolls: u32,

    /// Games after which a session stops (0 = until the match is won).
    /// Money sessions need a limit to terminate.
    pub max_games: u32,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        Self {
            double_probability: 0.0,
            take_probability: 1.0,
            beaver_probability: 0.0,
            max_rolls: 10_000,
            max_games: 0,
        }
    }
}

impl PlayoutConfig {
    pub fn with_double_probability(mut self, p: f64) -> Self {
        self.double_probability = p;
        self
    }

    pub fn with_take_probability(mut self, p: f64) -> Self {
        self.take_probability = p;
        self
    }

    pub fn with_beaver_probability(mut self, p: f64) -> Self {
        self.beaver_probability = p;
        self
    }

    pub fn with_max_rolls(mut self, rolls: u32) -> Self {
        self.max_rolls = rolls;
        self
    }

    pub fn with_max_games(mut self, games: u32) -> Self {
        self.max_games = games;
        self
    }
}

/// Picks one of the legal moves.
pub trait MovePolicy {
    /// Index into `moves`, which is never empty.
    fn choose_move(&self, state: &GameState, moves: &[ValidatedMove], rng: &mut GameRng) -> usize;
}

/// Uniform random move selection.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPolicy;

impl MovePolicy for RandomPolicy {
    fn choose_move(&self, _state: &GameState, moves: &[ValidatedMove], rng: &mut GameRng) -> usize {
        rng.gen_range_usize(0..moves.len())
    }
}

/// Outcome of a played-out session.
#[derive(Clone, Debug)]
pub struct MatchReport {
    pub final_state: GameState,
    /// One entry per finished game, in order.
    pub results: Vec<GameResult>,
    /// Games that were played as the Crawford game.
    pub crawford_games: u32,
    /// Highest cube value reached in any game.
    pub max_cube: u32,
}

/// Plays games through a `Backgammon` engine.
pub struct Playout<'a, P = RandomPolicy> {
    engine: &'a Backgammon,
    policy: P,
    config: PlayoutConfig,
}

impl<'a> Playout<'a, RandomPolicy> {
    /// Random playouts with default parameters.
    #[must_use]
    pub fn new(engine: &'a Backgammon) -> Self {
        Self {
            engine,
            policy: RandomPolicy,
            config: PlayoutConfig::default(),
        }
    }
}

impl<'a, P: MovePolicy> Playout<'a, P> {
    #[must_use]
    pub fn with_policy<Q: MovePolicy>(self, policy: Q) -> Playout<'a, Q> {
        Playout {
            engine: self.engine,
            policy,
            config: self.config,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: PlayoutConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn config(&self) -> &PlayoutConfig {
        &self.config
    }

    /// Play one turn: an optional cube action, the roll, then moves until
    /// the turn passes or the game ends.
    pub fn play_turn(&self, state: &GameState, rng: &mut GameRng) -> Result<GameState, EngineError> {
        let state = self.cube_action(state, rng)?;
        if state.is_over() {
            return Ok(state);
        }

        let (mut state, roll) = self.engine.roll_dice(&state, rng)?;
        if roll.forfeited {
            return Ok(state);
        }

        while !state.is_over() && state.turn() == roll.side && !state.dice().is_empty() {
            let moves = self.engine.legal_moves(&state);
            if moves.is_empty() {
                return Err(EngineError::corrupt("dice left in play without a legal move"));
            }
            let choice = self.policy.choose_move(&state, &moves, rng).min(moves.len() - 1);
            state = self.engine.apply_move(&state, &moves[choice])?;
        }

        Ok(state)
    }

    fn cube_action(&self, state: &GameState, rng: &mut GameRng) -> Result<GameState, EngineError> {
        if !chance(rng, self.config.double_probability) {
            return Ok(state.clone());
        }

        let side = state.turn();
        let offered = match self.engine.offer_double(state, side) {
            Ok(offered) => offered,
            Err(EngineError::CannotDouble(_)) => return Ok(state.clone()),
            Err(err) => return Err(err),
        };

        let taker = side.opponent();
        if !chance(rng, self.config.take_probability) {
            return self.engine.reject_double(&offered, taker).map(|(next, _)| next);
        }

        if chance(rng, self.config.beaver_probability) {
            if let Ok(beavered) = self.engine.beaver_double(&offered, taker) {
                return Ok(beavered);
            }
        }
        self.engine.accept_double(&offered, taker)
    }

    /// Play until the game ends or the roll limit is hit.
    ///
    /// An abandoned game is returned still in play.
    pub fn play_game(&self, state: &GameState, rng: &mut GameRng) -> Result<GameState, EngineError> {
        let mut state = state.clone();
        while !state.is_over() {
            if self.config.max_rolls > 0 && state.roll_count() >= self.config.max_rolls {
                debug!(rolls = state.roll_count(), "playout abandoned");
                break;
            }
            state = self.play_turn(&state, rng)?;
        }
        Ok(state)
    }

    /// Play games until the match is won or `max_games` is reached.
    pub fn play_match(&self, state: &GameState, rng: &mut GameRng) -> Result<MatchReport, EngineError> {
        let mut state = state.clone();
        let mut results = Vec::new();
        let mut crawford_games = 0;
        let mut max_cube = state.cube().value();

        loop {
            if state.match_state().crawford_game() {
                crawford_games += 1;
            }

            state = self.play_game(&state, rng)?;
            max_cube = max_cube.max(state.cube().value());

            let Some(result) = self.engine.is_terminal(&state) else {
                break;
            };
            results.push(result);

            let limit_reached =
                self.config.max_games > 0 && results.len() >= self.config.max_games as usize;
            if state.match_state().is_over() || limit_reached {
                break;
            }
            state = self.engine.start_new_game(&state)?;
        }

        Ok(MatchReport {
            final_state: state,
            results,
            crawford_games,
            max_cube,
        })
    }
}

/// True with probability `p`; out-of-range or NaN values saturate.
fn chance(rng: &mut GameRng, p: f64) -> bool {
    if p >= 1.0 {
        true
    } else if p > 0.0 {
        rng.gen_bool(p)
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Side;

    #[test]
    fn test_game_runs_to_completion() {
        let engine = Backgammon::default();
        let mut rng = GameRng::new(1);
        let state = engine.start_money_session();

        let finished = Playout::new(&engine).play_game(&state, &mut rng).unwrap();
        assert!(finished.is_over());
        let result = engine.is_terminal(&finished).unwrap();
        assert_eq!(finished.board().off(result.winner), 15);
    }

    #[test]
    fn test_same_seed_same_game() {
        let engine = Backgammon::default();
        let state = engine.start_new_match(3).unwrap();

        let a = Playout::new(&engine)
            .play_game(&state, &mut GameRng::new(9))
            .unwrap();
        let b = Playout::new(&engine)
            .play_game(&state, &mut GameRng::new(9))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_match_with_cube() {
        let engine = Backgammon::default();
        let mut rng = GameRng::new(3);
        let state = engine.start_new_match(5).unwrap();
        let config = PlayoutConfig::default()
            .with_double_probability(0.3)
            .with_take_probability(0.7);

        let report = Playout::new(&engine)
            .with_config(config)
            .play_match(&state, &mut rng)
            .unwrap();

        let final_match = report.final_state.match_state();
        assert!(final_match.is_over());
        let winner = final_match.match_winner().unwrap();
        assert_eq!(final_match.score(winner), 5);
        assert!(final_match.score(winner.opponent()) < 5);
        assert!(report.crawford_games <= 1);
        assert!(report.max_cube.is_power_of_two());
    }

    #[test]
    fn test_money_session_stops_at_game_limit() {
        let engine = Backgammon::default();
        let mut rng = GameRng::new(5);
        let state = engine.start_money_session();

        let report = Playout::new(&engine)
            .with_config(PlayoutConfig::default().with_max_games(2))
            .play_match(&state, &mut rng)
            .unwrap();
        assert_eq!(report.results.len(), 2);
        let total: u32 = Side::ALL
            .iter()
            .map(|&s| report.final_state.match_state().score(s))
            .sum();
        assert_eq!(total, report.results.iter().map(|r| r.awarded).sum::<u32>());
    }

    #[test]
    fn test_chance_saturates() {
        let mut rng = GameRng::new(0);
        assert!(chance(&mut rng, 1.5));
        assert!(!chance(&mut rng, -0.1));
        assert!(!chance(&mut rng, f64::NAN));
    }
}
