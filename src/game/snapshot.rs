//! Persisted game snapshots.
//!
//! A `Snapshot` is the wire form of a `GameState`: plain vectors and
//! camelCase field names, encoded as JSON (`serde_json`) or compact binary
//! (`bincode`). Loading re-checks every invariant the engine relies on
//! and reports anything a running game could not have produced as
//! `CorruptState`. Encoding failures are reported as `Codec`.
//!
//! ```
//! use rust_backgammon::core::RulesConfig;
//! use rust_backgammon::game::{Backgammon, Snapshot};
//!
//! let engine = Backgammon::default();
//! let state = engine.start_new_match(7).unwrap();
//!
//! let json = Snapshot::capture(&state).to_json().unwrap();
//! let restored = Snapshot::from_json(&json)
//!     .and_then(|s| s.restore(&RulesConfig::default()))
//!     .unwrap();
//! assert_eq!(restored, state);
//! ```

use serde::{Deserialize, Serialize};

use super::history::History;
use super::state::GameState;
use crate::board::{Board, Piece, PieceSet, POINT_COUNT};
use crate::core::{Dice, EngineError, GamePhase, RulesConfig, Side, SideMap};
use crate::cube::CubeState;
use crate::rules::{game_winner, GameEndReason, GameResult};
use crate::scoring::MatchState;

/// Board as (white, black) pairs per point plus bar and off per side.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
    pub points: Vec<[u8; 2]>,
    pub bar: Vec<u8>,
    pub off: Vec<u8>,
}

impl BoardSnapshot {
    #[must_use]
    pub fn capture(board: &Board) -> Self {
        Self {
            points: board.counts().iter().map(|&(w, b)| [w, b]).collect(),
            bar: Side::ALL.iter().map(|&s| board.bar(s)).collect(),
            off: Side::ALL.iter().map(|&s| board.off(s)).collect(),
        }
    }

    /// Rebuild and validate the board.
    pub fn restore(&self) -> Result<Board, EngineError> {
        if self.points.len() != POINT_COUNT {
            return Err(EngineError::corrupt(format!(
                "board has {} points",
                self.points.len()
            )));
        }
        let pair = |values: &[u8], name: &str| match values {
            [white, black] => Ok(SideMap::from_pair(*white, *black)),
            _ => Err(EngineError::corrupt(format!(
                "{name} has {} entries",
                values.len()
            ))),
        };
        let bar = pair(&self.bar, "bar")?;
        let off = pair(&self.off, "off")?;

        let mut counts = [(0, 0); POINT_COUNT];
        for (slot, &[white, black]) in counts.iter_mut().zip(self.points.iter()) {
            *slot = (white, black);
        }
        Board::from_parts(&counts, bar, off)
    }
}

/// Replay history: boards in order plus the viewing index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySnapshot {
    pub boards: Vec<BoardSnapshot>,
    pub index: usize,
}

/// Wire form of a `GameState`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub board: Vec<[u8; 2]>,
    pub bar: Vec<u8>,
    pub off: Vec<u8>,
    /// Rolled values: empty, two, or four for a double.
    pub dice: Vec<u8>,
    /// Multiset of values already played.
    pub used_dice: Vec<u8>,
    pub turn: Side,
    pub game_phase: GamePhase,
    pub cube: CubeState,
    #[serde(rename = "match")]
    pub match_state: MatchState,
    pub history: HistorySnapshot,
    pub roll_count: u32,
    pub result: Option<GameResult>,
    pub pieces: Option<Vec<Piece>>,
}

impl Snapshot {
    /// Capture `state` exactly.
    #[must_use]
    pub fn capture(state: &GameState) -> Self {
        let board = BoardSnapshot::capture(&state.board);
        Self {
            board: board.points,
            bar: board.bar,
            off: board.off,
            dice: state.dice.values().collect(),
            used_dice: state.dice.used_values().collect(),
            turn: state.turn,
            game_phase: state.phase,
            cube: state.cube,
            match_state: state.match_state.clone(),
            history: HistorySnapshot {
                boards: state.history.iter().map(BoardSnapshot::capture).collect(),
                index: state.history.index(),
            },
            roll_count: state.roll_count,
            result: state.result,
            pieces: Some(state.pieces.iter().cloned().collect()),
        }
    }

    /// Rebuild the game state, checking every invariant.
    pub fn restore(self, rules: &RulesConfig) -> Result<GameState, EngineError> {
        let board = BoardSnapshot {
            points: self.board,
            bar: self.bar,
            off: self.off,
        }
        .restore()?;
        let dice = Dice::from_parts(&self.dice, &self.used_dice)?;

        self.cube.validate(rules)?;
        self.match_state.validate()?;

        let boards = self
            .history
            .boards
            .iter()
            .map(BoardSnapshot::restore)
            .collect::<Result<Vec<_>, _>>()?;
        let history = History::from_parts(boards, self.history.index)?;
        if history.latest() != &board {
            return Err(EngineError::corrupt("history does not end at the live board"));
        }

        check_progress(
            &board,
            &dice,
            &self.cube,
            &self.match_state,
            self.game_phase,
            self.roll_count,
            self.result.as_ref(),
        )?;

        let pieces = match self.pieces {
            Some(list) => PieceSet::from_pieces(list, &board)?,
            None => PieceSet::from_board(&board),
        };

        Ok(GameState {
            board,
            dice,
            turn: self.turn,
            phase: self.game_phase,
            cube: self.cube,
            match_state: self.match_state,
            history,
            pieces,
            roll_count: self.roll_count,
            result: self.result,
        })
    }

    // === Encoding ===

    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(|e| EngineError::Codec(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, EngineError> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Codec(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::corrupt(e.to_string()))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        bincode::serialize(self).map_err(|e| EngineError::Codec(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        bincode::deserialize(bytes).map_err(|e| EngineError::corrupt(e.to_string()))
    }
}

/// Phase, dice, cube and result must describe a reachable point of a game.
fn check_progress(
    board: &Board,
    dice: &Dice,
    cube: &CubeState,
    match_state: &MatchState,
    phase: GamePhase,
    roll_count: u32,
    result: Option<&GameResult>,
) -> Result<(), EngineError> {
    match (phase, result) {
        (GamePhase::Playing, Some(_)) => {
            return Err(EngineError::corrupt("game in play already has a result"));
        }
        (GamePhase::GameOver, None) => {
            return Err(EngineError::corrupt("finished game without a result"));
        }
        (GamePhase::Playing, None) => {
            if let Some(winner) = game_winner(board) {
                return Err(EngineError::corrupt(format!(
                    "{winner} has borne off every piece but the game is in play"
                )));
            }
        }
        (GamePhase::GameOver, Some(result)) => {
            if result.reason == GameEndReason::BoreOff
                && game_winner(board) != Some(result.winner)
            {
                return Err(EngineError::corrupt("bear-off result without a finished board"));
            }
            if !dice.is_empty() || cube.pending_offer() {
                return Err(EngineError::corrupt("finished game with dice or offer pending"));
            }
        }
    }

    if match_state.crawford_game() && (cube.was_turned() || cube.pending_offer()) {
        return Err(EngineError::corrupt("cube turned during the crawford game"));
    }

    if !dice.is_empty() {
        if roll_count == 0 {
            return Err(EngineError::corrupt("dice in play before the opening roll"));
        }
        if dice.all_used() {
            return Err(EngineError::corrupt("spent dice were not cleared"));
        }
        if cube.pending_offer() {
            return Err(EngineError::corrupt("double offered after rolling"));
        }
    }
    Ok(())
}

impl GameState {
    /// Shorthand for `Snapshot::capture(self).to_json()`.
    pub fn to_json(&self) -> Result<String, EngineError> {
        Snapshot::capture(self).to_json()
    }

    /// Decode and validate a JSON snapshot.
    pub fn from_json(json: &str, rules: &RulesConfig) -> Result<Self, EngineError> {
        Snapshot::from_json(json)?.restore(rules)
    }

    /// Shorthand for `Snapshot::capture(self).to_bytes()`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        Snapshot::capture(self).to_bytes()
    }

    /// Decode and validate a binary snapshot.
    pub fn from_bytes(bytes: &[u8], rules: &RulesConfig) -> Result<Self, EngineError> {
        Snapshot::from_bytes(bytes)?.restore(rules)
    }
}
