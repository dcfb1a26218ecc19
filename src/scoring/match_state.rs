//! Match scoring and the Crawford rule.
//!
//! ## Match play
//!
//! A match is played to an odd number of points. Points from a game are
//! capped at what the winner still needs, so a gammon cannot overshoot.
//!
//! The first game after either side reaches `length - 1` is the Crawford
//! game: nobody may double. Every later game is post-Crawford and the
//! cube is live again. There is at most one Crawford game per match.
//!
//! ## Money play
//!
//! A money session has no length: points accumulate without cap, there is
//! no Crawford game and no match winner.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::{is_valid_match_length, EngineError, Side, SideMap};

/// Score and Crawford status of a match or money session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchState {
    match_length: u32,
    scores: SideMap<u32>,
    game_number: u32,
    match_winner: Option<Side>,
    is_match_play: bool,
    crawford_game: bool,
    post_crawford: bool,
}

/// Result of crediting a game to the match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchUpdate {
    pub state: MatchState,
    /// Points actually added to the winner's score.
    pub awarded: u32,
}

impl MatchState {
    /// Start a match to `length` points.
    ///
    /// ```
    /// use rust_backgammon::scoring::MatchState;
    /// use rust_backgammon::core::{EngineError, Side};
    ///
    /// let state = MatchState::new(5).unwrap();
    /// assert_eq!(state.score(Side::White), 0);
    /// assert_eq!(state.game_number(), 1);
    ///
    /// assert_eq!(MatchState::new(4), Err(EngineError::InvalidMatchLength(4)));
    /// ```
    pub fn new(length: u32) -> Result<Self, EngineError> {
        if !is_valid_match_length(length) {
            return Err(EngineError::InvalidMatchLength(length));
        }
        Ok(Self {
            match_length: length,
            is_match_play: true,
            ..Self::unlimited()
        })
    }

    /// Money play: no length, no Crawford game.
    #[must_use]
    pub fn unlimited() -> Self {
        Self {
            match_length: 0,
            scores: SideMap::with_value(0),
            game_number: 1,
            match_winner: None,
            is_match_play: false,
            crawford_game: false,
            post_crawford: false,
        }
    }

    // === Queries ===

    /// Points needed to win; 0 for money play.
    #[must_use]
    pub fn match_length(&self) -> u32 {
        self.match_length
    }

    #[must_use]
    pub fn score(&self, side: Side) -> u32 {
        self.scores[side]
    }

    #[must_use]
    pub fn scores(&self) -> &SideMap<u32> {
        &self.scores
    }

    /// Number of the game in progress, starting at 1.
    #[must_use]
    pub fn game_number(&self) -> u32 {
        self.game_number
    }

    #[must_use]
    pub fn match_winner(&self) -> Option<Side> {
        self.match_winner
    }

    #[must_use]
    pub fn is_match_play(&self) -> bool {
        self.is_match_play
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.match_winner.is_some()
    }

    /// True while the current game is the Crawford game.
    #[must_use]
    pub fn crawford_game(&self) -> bool {
        self.crawford_game
    }

    #[must_use]
    pub fn post_crawford(&self) -> bool {
        self.post_crawford
    }

    /// Doubling is suspended for the Crawford game only.
    #[must_use]
    pub fn can_double_in_match(&self) -> bool {
        !self.crawford_game
    }

    /// Points `side` still needs; `None` in money play.
    #[must_use]
    pub fn points_needed(&self, side: Side) -> Option<u32> {
        self.is_match_play
            .then(|| self.match_length.saturating_sub(self.scores[side]))
    }

    // === Transitions ===

    /// Credit `points` to `winner` and advance to the next game.
    pub fn update(&self, winner: Side, points: u32) -> Result<MatchUpdate, EngineError> {
        if self.is_over() {
            return Err(EngineError::MatchOver);
        }

        let mut next = self.clone();
        let awarded = match self.points_needed(winner) {
            Some(needed) => points.min(needed),
            None => points,
        };
        next.scores[winner] += awarded;
        next.game_number += 1;

        if next.is_match_play && next.scores[winner] >= next.match_length {
            next.match_winner = Some(winner);
            info!(%winner, white = next.scores[Side::White], black = next.scores[Side::Black], "match won");
        }

        if self.crawford_game {
            next.crawford_game = false;
            next.post_crawford = true;
        } else if next.is_match_play
            && next.match_length > 1
            && !next.post_crawford
            && next.match_winner.is_none()
            && Side::ALL
                .iter()
                .any(|&s| next.scores[s] == next.match_length - 1)
        {
            next.crawford_game = true;
            debug!(game = next.game_number, "crawford game");
        }

        Ok(MatchUpdate {
            state: next,
            awarded,
        })
    }

    /// Check a persisted match state for impossible combinations.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.game_number == 0 {
            return Err(EngineError::corrupt("game number 0"));
        }
        if self.crawford_game && self.post_crawford {
            return Err(EngineError::corrupt("both crawford and post-crawford"));
        }

        if !self.is_match_play {
            if self.match_length != 0
                || self.match_winner.is_some()
                || self.crawford_game
                || self.post_crawford
            {
                return Err(EngineError::corrupt("money play with match-only fields set"));
            }
            return Ok(());
        }

        if !is_valid_match_length(self.match_length) {
            return Err(EngineError::corrupt(format!(
                "match length {}",
                self.match_length
            )));
        }
        for side in Side::ALL {
            let score = self.scores[side];
            if score > self.match_length {
                return Err(EngineError::corrupt(format!("{side} score {score}")));
            }
            let reached = score == self.match_length;
            if reached != (self.match_winner == Some(side)) {
                return Err(EngineError::corrupt("match winner disagrees with scores"));
            }
        }
        if self.crawford_game
            && !Side::ALL
                .iter()
                .any(|&s| self.scores[s] == self.match_length - 1)
        {
            return Err(EngineError::corrupt("crawford game without a side at match point"));
        }
        Ok(())
    }
}
