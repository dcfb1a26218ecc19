//! Doubling cube state machine.
//!
//! ```text
//!            offer                accept
//! Centered ---------> Pending ----------> Owned(taker)
//!   / Owned(offerer)    |  \
//!                       |   \ beaver           raccoon
//!                       |    `--------> Owned(taker) ---------> Owned(offerer)
//!                       | reject
//!                       v
//!                  game over, offerer wins value / 2
//! ```
//!
//! Every transition returns a new `CubeState`. The value only ever doubles
//! within a game; a fresh cube is created for each new game.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{CubeRejection, EngineError, GamePhase, RulesConfig, Side};

/// Starting cube value.
pub const INITIAL_CUBE_VALUE: u32 = 1;

/// Facts about the surrounding game that gate an offer.
#[derive(Clone, Copy, Debug)]
pub struct CubeContext<'a> {
    pub phase: GamePhase,
    /// False until the opening roll has been made.
    pub opening_roll_made: bool,
    /// True during the Crawford game of a match.
    pub crawford_game: bool,
    pub rules: &'a RulesConfig,
}

impl<'a> CubeContext<'a> {
    /// Context for a game in `phase`.
    #[must_use]
    pub fn new(phase: GamePhase, rules: &'a RulesConfig) -> Self {
        Self {
            phase,
            opening_roll_made: true,
            crawford_game: false,
            rules,
        }
    }

    #[must_use]
    pub fn with_opening_roll_made(mut self, made: bool) -> Self {
        self.opening_roll_made = made;
        self
    }

    #[must_use]
    pub fn with_crawford_game(mut self, crawford: bool) -> Self {
        self.crawford_game = crawford;
        self
    }
}

/// Outcome of declining a double.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoubleDeclined {
    /// Cube with the offer cleared.
    pub cube: CubeState,
    /// The side that offered and wins the game.
    pub winner: Side,
    /// Value before the offer.
    pub points: u32,
    /// Always true: a declined double ends the game.
    pub game_ended: bool,
}

/// Value, ownership and offer status of the doubling cube.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CubeState {
    value: u32,
    owner: Option<Side>,
    pending_offer: bool,
    offering_player: Option<Side>,
    /// Side that beavered this turn; only its opponent may raccoon.
    #[serde(default)]
    beavered_by: Option<Side>,
}

impl Default for CubeState {
    fn default() -> Self {
        Self::new()
    }
}

impl CubeState {
    /// Centered cube at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: INITIAL_CUBE_VALUE,
            owner: None,
            pending_offer: false,
            offering_player: None,
            beavered_by: None,
        }
    }

    // === Queries ===

    #[must_use]
    pub fn value(&self) -> u32 {
        self.value
    }

    /// Side that holds the cube, `None` when centered.
    #[must_use]
    pub fn owner(&self) -> Option<Side> {
        self.owner
    }

    #[must_use]
    pub fn is_centered(&self) -> bool {
        self.owner.is_none()
    }

    #[must_use]
    pub fn pending_offer(&self) -> bool {
        self.pending_offer
    }

    #[must_use]
    pub fn offering_player(&self) -> Option<Side> {
        self.offering_player
    }

    #[must_use]
    pub fn beavered_by(&self) -> Option<Side> {
        self.beavered_by
    }

    /// Value after the next double.
    #[must_use]
    pub fn next_value(&self) -> u32 {
        self.value * 2
    }

    /// True once the cube has left 1.
    #[must_use]
    pub fn was_turned(&self) -> bool {
        self.value > INITIAL_CUBE_VALUE
    }

    /// Whether `side` may offer a double in `ctx`.
    #[must_use]
    pub fn can_double(&self, side: Side, ctx: &CubeContext<'_>) -> bool {
        self.check_offer(side, ctx).is_ok()
    }

    fn check_offer(&self, side: Side, ctx: &CubeContext<'_>) -> Result<(), CubeRejection> {
        if !ctx.phase.is_playing() {
            return Err(CubeRejection::NotInPlay);
        }
        if self.pending_offer {
            return Err(CubeRejection::OfferPending);
        }
        if ctx.crawford_game {
            return Err(CubeRejection::CrawfordGame);
        }
        match self.owner {
            None if !ctx.opening_roll_made => return Err(CubeRejection::OpeningRoll),
            Some(owner) if owner != side => return Err(CubeRejection::NotCubeOwner),
            _ => {}
        }
        if self.next_value() > ctx.rules.max_cube_value {
            return Err(CubeRejection::AtMaximum);
        }
        Ok(())
    }

    // === Transitions ===

    /// `side` offers a double. The value doubles immediately and waits for
    /// an answer.
    pub fn offer(&self, side: Side, ctx: &CubeContext<'_>) -> Result<Self, EngineError> {
        self.check_offer(side, ctx).map_err(EngineError::CannotDouble)?;

        let next = Self {
            value: self.next_value(),
            pending_offer: true,
            offering_player: Some(side),
            beavered_by: None,
            ..*self
        };
        debug!(%side, value = next.value, "double offered");
        Ok(next)
    }

    /// The side answering the pending offer, checked against `side`.
    fn check_answer(&self, side: Side) -> Result<Side, EngineError> {
        let offerer = self.pending_offerer()?;
        if offerer == side {
            return Err(EngineError::CannotDouble(CubeRejection::OwnOffer));
        }
        Ok(offerer)
    }

    fn pending_offerer(&self) -> Result<Side, EngineError> {
        match (self.pending_offer, self.offering_player) {
            (true, Some(offerer)) => Ok(offerer),
            _ => Err(EngineError::NoPendingOffer),
        }
    }

    /// `side` takes the double and now owns the cube.
    pub fn accept(&self, side: Side) -> Result<Self, EngineError> {
        self.check_answer(side)?;

        let next = Self {
            owner: Some(side),
            pending_offer: false,
            offering_player: None,
            ..*self
        };
        debug!(%side, value = next.value, "double accepted");
        Ok(next)
    }

    /// The pending offer is declined; the game ends in the offerer's favor
    /// at the pre-double value.
    pub fn reject(&self) -> Result<DoubleDeclined, EngineError> {
        let winner = self.pending_offerer()?;

        let cube = Self {
            pending_offer: false,
            offering_player: None,
            ..*self
        };
        debug!(%winner, points = self.value / 2, "double declined");
        Ok(DoubleDeclined {
            cube,
            winner,
            points: self.value / 2,
            game_ended: true,
        })
    }

    /// `side` takes the pending double and immediately redoubles, keeping
    /// the cube.
    pub fn beaver(&self, side: Side, rules: &RulesConfig) -> Result<Self, EngineError> {
        if !rules.beavers {
            return Err(EngineError::CannotDouble(CubeRejection::Disabled));
        }
        self.check_answer(side)?;
        self.check_redouble(side, 2, rules)?;

        let next = Self {
            value: self.next_value(),
            owner: Some(side),
            pending_offer: false,
            offering_player: None,
            beavered_by: Some(side),
        };
        debug!(%side, value = next.value, "beaver");
        Ok(next)
    }

    /// The original doubler answers a beaver by redoubling again.
    pub fn raccoon(&self, side: Side, rules: &RulesConfig) -> Result<Self, EngineError> {
        if !rules.raccoons {
            return Err(EngineError::CannotDouble(CubeRejection::Disabled));
        }
        if self.beavered_by != Some(side.opponent()) {
            return Err(EngineError::CannotDouble(CubeRejection::NoBeaver));
        }
        self.check_redouble(side, 4, rules)?;

        let next = Self {
            value: self.next_value(),
            owner: Some(side),
            beavered_by: None,
            ..*self
        };
        debug!(%side, value = next.value, "raccoon");
        Ok(next)
    }

    fn check_redouble(
        &self,
        side: Side,
        expected: u32,
        rules: &RulesConfig,
    ) -> Result<(), EngineError> {
        if self.value != expected {
            return Err(EngineError::CannotDouble(CubeRejection::WrongCubeValue {
                expected,
                actual: self.value,
            }));
        }
        if self.owner == Some(side) {
            return Err(EngineError::CannotDouble(CubeRejection::NotCubeOwner));
        }
        if self.next_value() > rules.max_cube_value {
            return Err(EngineError::CannotDouble(CubeRejection::AtMaximum));
        }
        Ok(())
    }

    /// Close the beaver window once play continues.
    #[must_use]
    pub fn settled(&self) -> Self {
        Self {
            beavered_by: None,
            ..*self
        }
    }

    /// Check a persisted cube for impossible combinations.
    pub fn validate(&self, rules: &RulesConfig) -> Result<(), EngineError> {
        if !self.value.is_power_of_two() || self.value > rules.max_cube_value {
            return Err(EngineError::corrupt(format!("cube value {}", self.value)));
        }
        if self.pending_offer != self.offering_player.is_some() {
            return Err(EngineError::corrupt("cube offer flag and offering side disagree"));
        }
        if self.pending_offer && self.value < 2 {
            return Err(EngineError::corrupt("pending offer on an unturned cube"));
        }
        if self.owner.is_some() && !self.was_turned() {
            return Err(EngineError::corrupt("owned cube at value 1"));
        }
        if let Some(beaver) = self.beavered_by {
            if self.pending_offer || self.owner != Some(beaver) || self.value < 4 {
                return Err(EngineError::corrupt("inconsistent beaver state"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RulesConfig {
        RulesConfig::default()
    }

    fn ctx(rules: &RulesConfig) -> CubeContext<'_> {
        CubeContext::new(GamePhase::Playing, rules)
    }

    #[test]
    fn test_new_cube_is_centered() {
        let cube = CubeState::new();
        assert_eq!(cube.value(), 1);
        assert!(cube.is_centered());
        assert!(!cube.pending_offer());
        assert_eq!(cube.next_value(), 2);
    }

    #[test]
    fn test_offer_accept() {
        let rules = rules();
        let cube = CubeState::new().offer(Side::White, &ctx(&rules)).unwrap();
        assert_eq!(cube.value(), 2);
        assert!(cube.pending_offer());
        assert_eq!(cube.offering_player(), Some(Side::White));

        let cube = cube.accept(Side::Black).unwrap();
        assert_eq!(cube.owner(), Some(Side::Black));
        assert!(!cube.pending_offer());
        assert_eq!(cube.value(), 2);
    }

    #[test]
    fn test_offer_requires_ownership() {
        let rules = rules();
        let cube = CubeState::new()
            .offer(Side::White, &ctx(&rules))
            .unwrap()
            .accept(Side::Black)
            .unwrap();

        assert_eq!(
            cube.offer(Side::White, &ctx(&rules)),
            Err(EngineError::CannotDouble(CubeRejection::NotCubeOwner))
        );
        assert!(cube.can_double(Side::Black, &ctx(&rules)));
    }

    #[test]
    fn test_offer_blocked_before_opening_roll() {
        let rules = rules();
        let context = ctx(&rules).with_opening_roll_made(false);
        assert_eq!(
            CubeState::new().offer(Side::White, &context),
            Err(EngineError::CannotDouble(CubeRejection::OpeningRoll))
        );
    }

    #[test]
    fn test_offer_blocked_in_crawford_game() {
        let rules = rules();
        let context = ctx(&rules).with_crawford_game(true);
        assert!(!CubeState::new().can_double(Side::Black, &context));
    }

    #[test]
    fn test_offer_blocked_when_game_over() {
        let rules = rules();
        let context = CubeContext::new(GamePhase::GameOver, &rules);
        assert_eq!(
            CubeState::new().offer(Side::White, &context),
            Err(EngineError::CannotDouble(CubeRejection::NotInPlay))
        );
    }

    #[test]
    fn test_offer_respects_maximum() {
        let rules = RulesConfig::default().with_max_cube_value(2);
        let cube = CubeState::new()
            .offer(Side::White, &ctx(&rules))
            .unwrap()
            .accept(Side::Black)
            .unwrap();
        assert_eq!(
            cube.offer(Side::Black, &ctx(&rules)),
            Err(EngineError::CannotDouble(CubeRejection::AtMaximum))
        );
    }

    #[test]
    fn test_double_offer_while_pending() {
        let rules = rules();
        let cube = CubeState::new().offer(Side::White, &ctx(&rules)).unwrap();
        assert_eq!(
            cube.offer(Side::White, &ctx(&rules)),
            Err(EngineError::CannotDouble(CubeRejection::OfferPending))
        );
    }

    #[test]
    fn test_answers_require_pending_offer() {
        let cube = CubeState::new();
        assert_eq!(cube.accept(Side::Black), Err(EngineError::NoPendingOffer));
        assert_eq!(cube.reject(), Err(EngineError::NoPendingOffer));
        assert_eq!(
            cube.beaver(Side::Black, &rules()),
            Err(EngineError::NoPendingOffer)
        );
    }

    #[test]
    fn test_cannot_accept_own_offer() {
        let rules = rules();
        let cube = CubeState::new().offer(Side::White, &ctx(&rules)).unwrap();
        assert_eq!(
            cube.accept(Side::White),
            Err(EngineError::CannotDouble(CubeRejection::OwnOffer))
        );
    }

    #[test]
    fn test_reject_awards_pre_double_value() {
        let rules = rules();
        let cube = CubeState::new()
            .offer(Side::White, &ctx(&rules))
            .unwrap()
            .accept(Side::Black)
            .unwrap()
            .offer(Side::Black, &ctx(&rules))
            .unwrap();
        assert_eq!(cube.value(), 4);

        let declined = cube.reject().unwrap();
        assert_eq!(declined.winner, Side::Black);
        assert_eq!(declined.points, 2);
        assert!(declined.game_ended);
        assert!(!declined.cube.pending_offer());
        assert_eq!(declined.cube.value(), 4);
    }

    #[test]
    fn test_beaver_and_raccoon() {
        let rules = rules();
        let offered = CubeState::new().offer(Side::White, &ctx(&rules)).unwrap();

        let beavered = offered.beaver(Side::Black, &rules).unwrap();
        assert_eq!(beavered.value(), 4);
        assert_eq!(beavered.owner(), Some(Side::Black));
        assert!(!beavered.pending_offer());
        assert_eq!(beavered.beavered_by(), Some(Side::Black));

        // Only the original doubler may raccoon.
        assert_eq!(
            beavered.raccoon(Side::Black, &rules),
            Err(EngineError::CannotDouble(CubeRejection::NoBeaver))
        );

        let raccooned = beavered.raccoon(Side::White, &rules).unwrap();
        assert_eq!(raccooned.value(), 8);
        assert_eq!(raccooned.owner(), Some(Side::White));
        assert_eq!(raccooned.beavered_by(), None);
    }

    #[test]
    fn test_beaver_at_wrong_value() {
        let rules = rules();
        let cube = CubeState::new()
            .offer(Side::White, &ctx(&rules))
            .unwrap()
            .accept(Side::Black)
            .unwrap()
            .offer(Side::Black, &ctx(&rules))
            .unwrap();

        assert_eq!(
            cube.beaver(Side::White, &rules),
            Err(EngineError::CannotDouble(CubeRejection::WrongCubeValue {
                expected: 2,
                actual: 4
            }))
        );
    }

    #[test]
    fn test_raccoon_window_closes() {
        let rules = rules();
        let beavered = CubeState::new()
            .offer(Side::White, &ctx(&rules))
            .unwrap()
            .beaver(Side::Black, &rules)
            .unwrap()
            .settled();
        assert_eq!(
            beavered.raccoon(Side::White, &rules),
            Err(EngineError::CannotDouble(CubeRejection::NoBeaver))
        );
    }

    #[test]
    fn test_disabled_beavers() {
        let rules = RulesConfig::default().with_beavers(false);
        let offered = CubeState::new().offer(Side::White, &ctx(&rules)).unwrap();
        assert_eq!(
            offered.beaver(Side::Black, &rules),
            Err(EngineError::CannotDouble(CubeRejection::Disabled))
        );
    }

    #[test]
    fn test_validate_catches_inconsistency() {
        let rules = rules();
        assert!(CubeState::new().validate(&rules).is_ok());

        let bad = CubeState {
            value: 3,
            ..CubeState::new()
        };
        assert!(matches!(bad.validate(&rules), Err(EngineError::CorruptState(_))));

        let bad = CubeState {
            pending_offer: true,
            ..CubeState::new()
        };
        assert!(bad.validate(&rules).is_err());
    }
}
