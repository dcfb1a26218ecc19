//! Move validation.
//!
//! A move is a single piece travelling the distance of one die. Checks run
//! in this order:
//!
//! 1. Pieces on the bar must re-enter before anything else moves.
//! 2. The destination must be reachable with an unused die and not blocked
//!    by two or more opposing pieces. Landing on an opposing blot is a hit.
//! 3. Bearing off requires every piece in the home board, and a die that
//!    matches the point exactly or exceeds the farthest piece's distance.
//! 4. The move must begin a sequence that plays as many dice as the roll
//!    allows, and the higher die when only one of two can be played.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::movegen::{max_dice_playable, single_moves};
use crate::board::{advance, distance_to_edge, entry_point, Board, Location, POINT_COUNT};
use crate::core::dice::{distinct_desc, without_one};
use crate::core::{Dice, EngineError, InvalidMoveReason, Side};

/// What a legal move does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// Point to point.
    Ordinary,
    /// Point to point, landing on an opposing blot.
    Hit,
    /// Bar to point.
    Reentry,
    /// Bar to point, landing on an opposing blot.
    ReentryHit,
    /// Point to off.
    BearOff,
}

impl MoveKind {
    /// True when the move sends an opposing piece to the bar.
    #[must_use]
    pub fn is_hit(self) -> bool {
        matches!(self, MoveKind::Hit | MoveKind::ReentryHit)
    }
}

/// A move that passed validation, with the die it consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedMove {
    pub from: Location,
    pub to: Location,
    pub die: u8,
    pub kind: MoveKind,
}

impl ValidatedMove {
    /// Board after the move, with any hit piece on the opponent's bar.
    #[must_use]
    pub fn apply(&self, board: &Board, side: Side) -> Board {
        board.with_move(side, self.from, self.to).0
    }

    /// True for bear-offs that use the exact distance.
    #[must_use]
    pub fn is_exact_bear_off(&self, side: Side) -> bool {
        match (self.kind, self.from) {
            (MoveKind::BearOff, Location::Point(p)) => distance_to_edge(side, p) == self.die,
            _ => false,
        }
    }
}

impl std::fmt::Display for ValidatedMove {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.die)
    }
}

/// Where `die` would carry a piece of `side` from `from`, ignoring legality.
#[must_use]
pub fn destination(side: Side, from: Location, die: u8) -> Option<Location> {
    match from {
        Location::Bar => entry_point(side, die).map(Location::Point),
        Location::Point(p) => Some(advance(side, p, die).map_or(Location::Off, Location::Point)),
        Location::Off => None,
    }
}

/// Reject points past the edge of the board before any arithmetic on them.
fn check_on_board(from: Location, to: Location) -> Result<(), EngineError> {
    let off_board = |loc| matches!(loc, Location::Point(p) if usize::from(p) >= POINT_COUNT);
    if off_board(from) || off_board(to) {
        return Err(EngineError::InvalidMove {
            from,
            to,
            reason: InvalidMoveReason::NoPieceAtSource,
        });
    }
    Ok(())
}

/// Check a single-die move from `from`: source, blocking and bear-off.
/// Bar priority is the caller's job: `validate_inner` checks it, and move generation only
/// offers bar moves while pieces wait there.
pub(crate) fn check_single(
    board: &Board,
    side: Side,
    from: Location,
    die: u8,
) -> Result<ValidatedMove, EngineError> {
    check_on_board(from, from)?;

    let invalid = |to, reason| EngineError::InvalidMove { from, to, reason };

    if board.count_at(side, from) == 0 || from == Location::Off {
        return Err(invalid(from, InvalidMoveReason::NoPieceAtSource));
    }
    let to = destination(side, from, die)
        .ok_or_else(|| invalid(from, InvalidMoveReason::NoPieceAtSource))?;

    let kind = match to {
        Location::Point(q) => {
            if board.is_blocked(q, side) {
                return Err(invalid(to, InvalidMoveReason::Blocked));
            }
            let hit = board.is_blot(q, side.opponent());
            match (from, hit) {
                (Location::Bar, true) => MoveKind::ReentryHit,
                (Location::Bar, false) => MoveKind::Reentry,
                (_, true) => MoveKind::Hit,
                (_, false) => MoveKind::Ordinary,
            }
        }
        Location::Off => {
            let Location::Point(p) = from else {
                return Err(invalid(to, InvalidMoveReason::Unreachable));
            };
            check_bear_off(board, side, p, die)?;
            MoveKind::BearOff
        }
        Location::Bar => return Err(invalid(to, InvalidMoveReason::Unreachable)),
    };

    Ok(ValidatedMove { from, to, die, kind })
}

fn check_bear_off(board: &Board, side: Side, point: u8, die: u8) -> Result<(), EngineError> {
    if !board.is_all_in_home_board(side) {
        return Err(EngineError::CannotBearOff);
    }

    let distance = distance_to_edge(side, point);
    let exact = die == distance;
    // Overage: only the farthest piece may use a larger die.
    let overage = die > distance && board.farthest_distance(side) == Some(distance);

    if exact || overage {
        Ok(())
    } else {
        Err(EngineError::CannotBearOff)
    }
}

/// Validate a move of `side` from `from` to `to` against the unused dice.
///
/// ```
/// use rust_backgammon::board::{Board, Location};
/// use rust_backgammon::core::{Dice, Side};
/// use rust_backgammon::rules::{validate, MoveKind};
///
/// let board = Board::starting();
/// let dice = Dice::roll(6, 1).unwrap();
/// let mv = validate(&board, Side::White, &dice, Location::Point(12), Location::Point(6)).unwrap();
///
/// assert_eq!(mv.die, 6);
/// assert_eq!(mv.kind, MoveKind::Ordinary);
/// ```
pub fn validate(
    board: &Board,
    side: Side,
    dice: &Dice,
    from: Location,
    to: Location,
) -> Result<ValidatedMove, EngineError> {
    validate_inner(board, side, dice, from, to, None)
}

/// Validation with the turn's maximum dice usage precomputed.
pub(crate) fn validate_inner(
    board: &Board,
    side: Side,
    dice: &Dice,
    from: Location,
    to: Location,
    best: Option<usize>,
) -> Result<ValidatedMove, EngineError> {
    check_on_board(from, to)?;

    let remaining = dice.unused();
    if remaining.is_empty() {
        return Err(if dice.is_empty() {
            EngineError::DiceNotRolled
        } else {
            EngineError::NoLegalMove
        });
    }

    if board.bar(side) > 0 && from != Location::Bar {
        return Err(EngineError::MustReenterFromBar);
    }
    if to == Location::Off && !board.is_all_in_home_board(side) {
        return Err(EngineError::CannotBearOff);
    }

    let mut candidates: SmallVec<[ValidatedMove; 2]> = SmallVec::new();
    let mut first_error: Option<EngineError> = None;

    // Ascending, so overage bear-offs prefer the smallest sufficient die.
    let mut faces = distinct_desc(&remaining);
    faces.reverse();
    for die in faces {
        if destination(side, from, die) != Some(to) {
            continue;
        }
        match check_single(board, side, from, die) {
            Ok(mv) => candidates.push(mv),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    // Exact bear-off before overage; stable, so ascending order is kept otherwise.
    candidates.sort_by_key(|mv| !mv.is_exact_bear_off(side));

    if candidates.is_empty() {
        return Err(first_error.unwrap_or_else(|| unreachable_error(board, side, from, to)));
    }

    let best = best.unwrap_or_else(|| max_dice_playable(board, side, &remaining));
    let mut rejection: Option<EngineError> = None;
    for mv in candidates {
        match check_dice_usage(board, side, &remaining, best, &mv) {
            Ok(()) => return Ok(mv),
            Err(e) => {
                rejection.get_or_insert(e);
            }
        }
    }

    Err(rejection.unwrap_or(EngineError::NoLegalMove))
}

fn unreachable_error(board: &Board, side: Side, from: Location, to: Location) -> EngineError {
    if from == Location::Off || board.count_at(side, from) == 0 {
        EngineError::InvalidMove {
            from,
            to,
            reason: InvalidMoveReason::NoPieceAtSource,
        }
    } else if to == Location::Off {
        EngineError::CannotBearOff
    } else {
        EngineError::InvalidMove {
            from,
            to,
            reason: InvalidMoveReason::Unreachable,
        }
    }
}

/// Rule 4: the move must keep the maximum dice usage reachable, and
/// respect the higher die when only one of two distinct dice can be played.
pub(crate) fn check_dice_usage(
    board: &Board,
    side: Side,
    remaining: &[u8],
    best: usize,
    mv: &ValidatedMove,
) -> Result<(), EngineError> {
    let faces = distinct_desc(remaining);
    let higher = faces.first().copied().filter(|&h| h > mv.die);

    let after = mv.apply(board, side);
    let used = 1 + max_dice_playable(&after, side, &without_one(remaining, mv.die));
    if used < best {
        return Err(match higher {
            Some(higher) => EngineError::MustUseHigherDieFirst { higher },
            None => EngineError::MustUseAllDice,
        });
    }

    if best == 1 && faces.len() == 2 {
        if let Some(higher) = higher {
            if !single_moves(board, side, higher).is_empty() {
                return Err(EngineError::MustUseHigherDieFirst { higher });
            }
        }
    }

    Ok(())
}
