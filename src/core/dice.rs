//! Dice for a single turn.
//!
//! A roll of two different faces yields two dice; a double yields four
//! copies of the face. Each die carries a `used` flag. Using a value always
//! marks the first unused die showing it, so the flag layout is a pure
//! function of the rolled values and the multiset of used values.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::error::EngineError;

/// Lowest die face.
pub const MIN_FACE: u8 = 1;
/// Highest die face.
pub const MAX_FACE: u8 = 6;

/// A single die and whether it has been played this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Die {
    pub value: u8,
    pub used: bool,
}

/// The dice of the current turn (empty before rolling).
///
/// Serialized as the rolled and used values; deserialization goes through
/// `Dice::from_parts`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "DiceParts", into = "DiceParts")]
pub struct Dice {
    dice: SmallVec<[Die; 4]>,
}

#[derive(Serialize, Deserialize)]
struct DiceParts {
    rolled: SmallVec<[u8; 4]>,
    used: SmallVec<[u8; 4]>,
}

impl From<Dice> for DiceParts {
    fn from(dice: Dice) -> Self {
        Self {
            rolled: dice.values().collect(),
            used: dice.used_values().collect(),
        }
    }
}

impl TryFrom<DiceParts> for Dice {
    type Error = EngineError;

    fn try_from(parts: DiceParts) -> Result<Self, Self::Error> {
        Dice::from_parts(&parts.rolled, &parts.used)
    }
}

fn check_face(value: u8) -> Result<u8, EngineError> {
    if (MIN_FACE..=MAX_FACE).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::InvalidDice(value))
    }
}

impl Dice {
    /// No dice rolled.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the dice for a roll of two faces.
    ///
    /// ```
    /// use rust_backgammon::core::Dice;
    ///
    /// let dice = Dice::roll(3, 3).unwrap();
    /// assert_eq!(dice.remaining(), 4);
    /// ```
    pub fn roll(first: u8, second: u8) -> Result<Self, EngineError> {
        let first = check_face(first)?;
        let second = check_face(second)?;

        let fresh = |value| Die { value, used: false };
        let dice = if first == second {
            SmallVec::from_elem(fresh(first), 4)
        } else {
            SmallVec::from_slice(&[fresh(first), fresh(second)])
        };

        Ok(Self { dice })
    }

    /// Rebuild dice from rolled values and the multiset of used values.
    ///
    /// Used for snapshot loading; any shape a roll cannot produce is
    /// reported as `CorruptState`.
    pub fn from_parts(rolled: &[u8], used: &[u8]) -> Result<Self, EngineError> {
        let impossible = || EngineError::corrupt(format!("dice {rolled:?} are not a possible roll"));
        let mut dice = match rolled {
            [] => Self::empty(),
            [a, b] if a != b => Self::roll(*a, *b).map_err(|_| impossible())?,
            [a, b, c, d] if a == b && b == c && c == d => {
                Self::roll(*a, *a).map_err(|_| impossible())?
            }
            _ => return Err(impossible()),
        };

        for &value in used {
            if !dice.mark_used(value) {
                return Err(EngineError::corrupt(format!(
                    "used die {value} is not among the unused dice {rolled:?}"
                )));
            }
        }

        Ok(dice)
    }

    /// True before the roll.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dice.is_empty()
    }

    /// True when the roll was a double.
    #[must_use]
    pub fn is_double(&self) -> bool {
        self.dice.len() == 4
    }

    /// Every rolled value, in roll order.
    pub fn values(&self) -> impl Iterator<Item = u8> + '_ {
        self.dice.iter().map(|d| d.value)
    }

    /// Values already played this turn.
    pub fn used_values(&self) -> impl Iterator<Item = u8> + '_ {
        self.dice.iter().filter(|d| d.used).map(|d| d.value)
    }

    /// Values still available this turn.
    #[must_use]
    pub fn unused(&self) -> SmallVec<[u8; 4]> {
        self.dice.iter().filter(|d| !d.used).map(|d| d.value).collect()
    }

    /// Distinct unused values, highest first.
    #[must_use]
    pub fn distinct_unused(&self) -> SmallVec<[u8; 2]> {
        distinct_desc(&self.unused())
    }

    /// Number of unused dice.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.dice.iter().filter(|d| !d.used).count()
    }

    /// True once every rolled die has been played.
    #[must_use]
    pub fn all_used(&self) -> bool {
        !self.dice.is_empty() && self.dice.iter().all(|d| d.used)
    }

    /// Mark the first unused die showing `value` as used.
    ///
    /// Returns false when no such die exists.
    pub fn mark_used(&mut self, value: u8) -> bool {
        match self.dice.iter_mut().find(|d| !d.used && d.value == value) {
            Some(die) => {
                die.used = true;
                true
            }
            None => false,
        }
    }

    /// Read-only view of the dice.
    #[must_use]
    pub fn as_slice(&self) -> &[Die] {
        &self.dice
    }
}

/// Distinct values of `values`, highest first.
pub(crate) fn distinct_desc(values: &[u8]) -> SmallVec<[u8; 2]> {
    let mut out: SmallVec<[u8; 2]> = SmallVec::new();
    for &v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out.sort_unstable_by(|a, b| b.cmp(a));
    out
}

/// Remove one occurrence of `value` from `values`.
pub(crate) fn without_one(values: &[u8], value: u8) -> SmallVec<[u8; 4]> {
    let mut out: SmallVec<[u8; 4]> = SmallVec::from_slice(values);
    if let Some(pos) = out.iter().position(|&v| v == value) {
        out.remove(pos);
    }
    out
}
