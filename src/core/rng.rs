//! Deterministic dice source.
//!
//! Every engine operation that rolls takes a `GameRng` explicitly, so a
//! test or a replay can fix the seed and get the same dice back. The
//! stream position can be checkpointed and resumed without replaying the
//! rolls made so far.
//!
//! ```
//! use rust_backgammon::core::GameRng;
//!
//! let mut a = GameRng::new(42);
//! let mut b = GameRng::new(42);
//! assert_eq!(a.roll_pair(), b.roll_pair());
//! ```

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::dice::{MAX_FACE, MIN_FACE};

/// Seeded ChaCha8 stream used for dice and random playouts.
#[derive(Clone, Debug)]
pub struct GameRng {
    stream: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            stream: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed drawn from the thread RNG. The seed is kept, so the session
    /// can still be replayed.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().next_u64())
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn roll_die(&mut self) -> u8 {
        self.stream.gen_range(MIN_FACE..=MAX_FACE)
    }

    pub fn roll_pair(&mut self) -> (u8, u8) {
        let first = self.roll_die();
        (first, self.roll_die())
    }

    /// Uniform index in `range`; panics on an empty range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.stream.gen_range(range)
    }

    /// True with probability `p`, which must lie in `[0, 1]`.
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.stream.gen_bool(p)
    }

    /// Position in the stream, for resuming later.
    #[must_use]
    pub fn checkpoint(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            position: self.stream.get_word_pos(),
        }
    }

    /// Continue from a checkpoint.
    #[must_use]
    pub fn resume(state: &GameRngState) -> Self {
        let mut rng = Self::new(state.seed);
        rng.stream.set_word_pos(state.position);
        rng
    }
}

/// Serializable stream position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    pub seed: u64,
    /// ChaCha8 word counter.
    pub position: u128,
}
