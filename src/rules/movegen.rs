//! Move generation.
//!
//! `max_dice_playable` is the search behind the "use as many dice as
//! possible" rule: a depth-first walk over every ordering of the remaining
//! dice, memoized on (board, dice) since different orders often reach the
//! same position. The walk stops as soon as some line uses every die.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::validator::{check_single, destination, validate_inner, ValidatedMove};
use crate::board::{Board, Location};
use crate::core::dice::{distinct_desc, without_one};
use crate::core::{Dice, Side};

type DiceKey = SmallVec<[u8; 4]>;

/// Every move of `side` that one `die` allows, ignoring the other dice.
#[must_use]
pub fn single_moves(board: &Board, side: Side, die: u8) -> SmallVec<[ValidatedMove; 8]> {
    if board.bar(side) > 0 {
        return check_single(board, side, Location::Bar, die).into_iter().collect();
    }

    board
        .occupied(side)
        .filter_map(|(point, _)| check_single(board, side, Location::Point(point), die).ok())
        .collect()
}

/// Most dice `side` can play from `board` with `dice` in some order.
///
/// ```
/// use rust_backgammon::board::Board;
/// use rust_backgammon::core::Side;
/// use rust_backgammon::rules::max_dice_playable;
///
/// assert_eq!(max_dice_playable(&Board::starting(), Side::White, &[6, 5]), 2);
/// assert_eq!(max_dice_playable(&Board::starting(), Side::White, &[]), 0);
/// ```
#[must_use]
pub fn max_dice_playable(board: &Board, side: Side, dice: &[u8]) -> usize {
    let mut sorted: DiceKey = SmallVec::from_slice(dice);
    sorted.sort_unstable();

    let mut memo = FxHashMap::default();
    search(board, side, &sorted, &mut memo)
}

fn search(
    board: &Board,
    side: Side,
    dice: &[u8],
    memo: &mut FxHashMap<(Board, DiceKey), usize>,
) -> usize {
    if dice.is_empty() {
        return 0;
    }

    let key = (board.clone(), SmallVec::from_slice(dice));
    if let Some(&known) = memo.get(&key) {
        return known;
    }

    let mut best = 0;
    'faces: for die in distinct_desc(dice) {
        let rest = without_one(dice, die);
        for mv in single_moves(board, side, die) {
            let next = mv.apply(board, side);
            let used = 1 + search(&next, side, &rest, memo);
            if used > best {
                best = used;
                if best == dice.len() {
                    break 'faces;
                }
            }
        }
    }

    memo.insert(key, best);
    best
}

/// True when `side` can play at least one of the unused dice.
#[must_use]
pub fn has_legal_move(board: &Board, side: Side, dice: &Dice) -> bool {
    let remaining = dice.unused();
    !remaining.is_empty() && max_dice_playable(board, side, &remaining) > 0
}

/// Every move `validate` would accept right now, one per (from, to) pair.
///
/// When several dice reach the same destination, the entry carries the
/// die `validate` would pick.
#[must_use]
pub fn legal_moves(board: &Board, side: Side, dice: &Dice) -> Vec<ValidatedMove> {
    let remaining = dice.unused();
    if remaining.is_empty() {
        return Vec::new();
    }
    let best = max_dice_playable(board, side, &remaining);
    if best == 0 {
        return Vec::new();
    }

    let mut seen: FxHashSet<(Location, Location)> = FxHashSet::default();
    let mut moves = Vec::new();
    for die in distinct_desc(&remaining) {
        for candidate in single_moves(board, side, die) {
            if !seen.insert((candidate.from, candidate.to)) {
                continue;
            }
            if let Ok(mv) = validate_inner(board, side, dice, candidate.from, candidate.to, Some(best))
            {
                moves.push(mv);
            }
        }
    }

    moves
}

/// Distinct destinations reachable from `from` this turn.
#[must_use]
pub fn targets_from(board: &Board, side: Side, dice: &Dice, from: Location) -> Vec<Location> {
    legal_moves(board, side, dice)
        .into_iter()
        .filter(|mv| mv.from == from)
        .map(|mv| mv.to)
        .collect()
}

/// Raw destinations of each unused die from `from`, before legality checks.
#[must_use]
pub fn raw_targets(side: Side, dice: &Dice, from: Location) -> SmallVec<[Location; 2]> {
    distinct_desc(&dice.unused())
        .into_iter()
        .filter_map(|die| destination(side, from, die))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardBuilder;
    use crate::rules::validate;

    #[test]
    fn test_opening_moves_exist() {
        let board = Board::starting();
        let dice = Dice::roll(3, 1).unwrap();
        let moves = legal_moves(&board, Side::White, &dice);

        assert!(!moves.is_empty());
        assert!(moves
            .iter()
            .any(|m| m.from == Location::Point(7) && m.to == Location::Point(4)));
        assert!(moves
            .iter()
            .any(|m| m.from == Location::Point(5) && m.to == Location::Point(4)));
    }

    #[test]
    fn test_legal_moves_agree_with_validate() {
        let board = Board::starting();
        for (a, b) in [(6, 5), (4, 4), (2, 1), (6, 6)] {
            let dice = Dice::roll(a, b).unwrap();
            for side in Side::ALL {
                for mv in legal_moves(&board, side, &dice) {
                    assert_eq!(validate(&board, side, &dice, mv.from, mv.to), Ok(mv));
                }
            }
        }
    }

    #[test]
    fn test_closed_board_blocks_reentry() {
        let mut builder = BoardBuilder::new().bar(Side::White, 1);
        for point in 18..=23 {
            builder = builder.place(Side::Black, point, 2);
        }
        let board = builder
            .place(Side::White, 10, 2)
            .rest_off()
            .build()
            .unwrap();

        for a in 1..=6 {
            for b in 1..=6 {
                let dice = Dice::roll(a, b).unwrap();
                assert!(!has_legal_move(&board, Side::White, &dice));
                assert!(legal_moves(&board, Side::White, &dice).is_empty());
            }
        }
    }

    #[test]
    fn test_max_dice_doubles() {
        let board = Board::starting();
        assert_eq!(max_dice_playable(&board, Side::Black, &[4, 4, 4, 4]), 4);
    }

    #[test]
    fn test_max_dice_partial_doubles() {
        // A single piece that can only take two steps of 5 before hitting a wall.
        let board = BoardBuilder::new()
            .place(Side::White, 20, 1)
            .place(Side::Black, 5, 2)
            .rest_off()
            .build()
            .unwrap();
        assert_eq!(max_dice_playable(&board, Side::White, &[5, 5, 5, 5]), 2);
    }

    #[test]
    fn test_targets_from() {
        let board = Board::starting();
        let dice = Dice::roll(6, 5).unwrap();
        let targets = targets_from(&board, Side::White, &dice, Location::Point(23));
        assert!(targets.contains(&Location::Point(17)));
        // Black holds point 18.
        assert!(!targets.contains(&Location::Point(18)));
    }

    #[test]
    fn test_raw_targets_ignore_blocks() {
        let dice = Dice::roll(1, 2).unwrap();
        let raw = raw_targets(Side::White, &dice, Location::Point(12));
        assert_eq!(raw.as_slice(), &[Location::Point(10), Location::Point(11)]);
    }
}
