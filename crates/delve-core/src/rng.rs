//! Random number generation for dungeon layout.
//!
//! Uses a seeded ChaCha RNG so a whole generation pass is reproducible from
//! a single seed. The stream position can be snapshotted per room and
//! restored later, letting a loader re-derive room content deterministically
//! without replaying the rest of the pass.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Snapshot of the RNG stream at a point in time.
///
/// The ChaCha stream is fully described by its seed and word position, so a
/// snapshot is two integers rather than an opaque state blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub word_pos: u128,
}

/// Dungeon random number generator
///
/// Wraps ChaCha8Rng. All draws during a generation pass come from one
/// instance in a strictly linear order; reordering draws breaks seed
/// reproducibility.
#[derive(Debug, Clone)]
pub struct DungeonRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl DungeonRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Restore an RNG from a snapshot, resuming at the captured position
    pub fn restore(state: RngState) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(state.seed);
        rng.set_word_pos(state.word_pos);
        Self {
            rng,
            seed: state.seed,
        }
    }

    /// Capture the current stream position
    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            word_pos: self.rng.get_word_pos(),
        }
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform index in `0..n`. Returns 0 if n is 0.
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Uniform integer in `lo..=hi`
    pub fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform f32 in `[0, 1)`
    pub fn value(&mut self) -> f32 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Triangular draw in `lo..=hi`, skewed toward `lo`.
    ///
    /// `|u1 - u2|` of two uniform draws; small rooms are common, large ones
    /// rare. Always consumes exactly two draws.
    pub fn skewed_range(&mut self, lo: i32, hi: i32) -> i32 {
        let spread = (self.value() - self.value()).abs();
        (spread * (1 + hi - lo) as f32) as i32 + lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stream() {
        let mut a = DungeonRng::new(42);
        let mut b = DungeonRng::new(42);
        for _ in 0..100 {
            assert_eq!(a.range_inclusive(0, 1000), b.range_inclusive(0, 1000));
        }
    }

    #[test]
    fn snapshot_restores_mid_stream() {
        let mut rng = DungeonRng::new(7);
        for _ in 0..13 {
            rng.value();
        }
        let state = rng.state();
        let expected: Vec<i32> = (0..10).map(|_| rng.range_inclusive(0, 99)).collect();

        let mut forked = DungeonRng::restore(state);
        let actual: Vec<i32> = (0..10).map(|_| forked.range_inclusive(0, 99)).collect();
        assert_eq!(expected, actual);
    }

    #[test]
    fn skewed_range_stays_in_bounds() {
        let mut rng = DungeonRng::new(1);
        for _ in 0..1000 {
            let v = rng.skewed_range(5, 9);
            assert!((5..=9).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn state_roundtrips_through_serde() {
        let mut rng = DungeonRng::new(99);
        rng.value();
        let state = rng.state();
        let json = serde_json::to_string(&state).unwrap();
        let back: RngState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
