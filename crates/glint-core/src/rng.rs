#![forbid(unsafe_code)]

//! Deterministic randomness for effect playback.
//!
//! A small xorshift64 generator. The same seed always reproduces the same
//! sequence of string picks, placements, font sizes, and pause delays, so
//! effect runs are replayable in tests and demos. Not cryptographic.
//!
//! # Invariants
//!
//! 1. The internal state is never zero (xorshift64 has a fixed point at 0).
//! 2. [`Rng::next_f32`] is in `[0.0, 1.0)`.
//! 3. [`Rng::below`] is in `[0, n)` for `n > 0`, and 0 for `n == 0`.
//! 4. Streams derived via [`Rng::split`] advance independently of the
//!    parent afterwards.

// ---------------------------------------------------------------------------
// Rng
// ---------------------------------------------------------------------------

/// Deterministic xorshift64 PRNG.
///
/// Unrelated consumers should each hold their own stream (see [`Rng::split`])
/// rather than sharing one generator, so per-stage playback does not depend
/// on iteration order.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Create a generator from a seed.
    ///
    /// The seed is scrambled with a splitmix64 step so that nearby seeds
    /// (0, 1, 2, ...) produce unrelated streams.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self {
            state: if z == 0 { 1 } else { z }, // Avoid 0 state.
        }
    }

    /// Derive an independent stream, e.g. one per stage.
    ///
    /// Advances `self` by one step; the returned stream is decorrelated from
    /// both the parent and streams split with other salts.
    #[must_use]
    pub fn split(&mut self, salt: u64) -> Self {
        Self::new(self.next_u64() ^ salt)
    }

    /// Next raw 64-bit value.
    pub fn next_u64(&mut self) -> u64 {
        // xorshift64
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        self.state
    }

    /// Uniform `f32` in `[0.0, 1.0)`.
    pub fn next_f32(&mut self) -> f32 {
        // Top 24 bits cover the full f32 mantissa without rounding to 1.0.
        let bits = (self.next_u64() >> 40) as f32;
        bits / (1u64 << 24) as f32
    }

    /// Uniform `usize` in `[0, n)`. Returns 0 when `n == 0`.
    pub fn below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        (self.next_u64() % n as u64) as usize
    }

    /// Uniform `f32` in `[lo, hi)`. A degenerate range collapses to `lo`.
    pub fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + self.next_f32() * (hi - lo)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_sequence() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..100 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(43);
        let same = (0..16).filter(|_| a.next_u64() == b.next_u64()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn zero_seed_is_usable() {
        let mut rng = Rng::new(0);
        assert_ne!(rng.next_u64(), 0);
        assert_ne!(rng.next_u64(), rng.next_u64());
    }

    #[test]
    fn next_f32_in_unit_range() {
        let mut rng = Rng::new(7);
        for _ in 0..10_000 {
            let v = rng.next_f32();
            assert!((0.0..1.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn below_bounds() {
        let mut rng = Rng::new(7);
        for _ in 0..10_000 {
            assert!(rng.below(5) < 5);
        }
    }

    #[test]
    fn below_zero_is_zero() {
        let mut rng = Rng::new(7);
        assert_eq!(rng.below(0), 0);
    }

    #[test]
    fn below_covers_all_values() {
        let mut rng = Rng::new(1);
        let mut seen = [false; 5];
        for _ in 0..1000 {
            seen[rng.below(5)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn range_f32_bounds() {
        let mut rng = Rng::new(9);
        for _ in 0..10_000 {
            let v = rng.range_f32(7.0, 28.0);
            assert!((7.0..28.0).contains(&v), "out of range: {v}");
        }
    }

    #[test]
    fn range_f32_degenerate_collapses_to_lo() {
        let mut rng = Rng::new(9);
        assert_eq!(rng.range_f32(4.0, 4.0), 4.0);
        assert_eq!(rng.range_f32(4.0, 2.0), 4.0);
    }

    #[test]
    fn split_streams_are_independent() {
        let mut parent = Rng::new(5);
        let mut a = parent.split(1);
        let mut b = parent.split(2);
        let same = (0..16).filter(|_| a.next_u64() == b.next_u64()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn split_is_deterministic() {
        let mut p1 = Rng::new(5);
        let mut p2 = Rng::new(5);
        let mut a = p1.split(3);
        let mut b = p2.split(3);
        assert_eq!(a.next_u64(), b.next_u64());
    }
}
