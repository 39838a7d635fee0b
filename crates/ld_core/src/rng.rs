// crates/ld_core/src/rng.rs
//
// Integer-only RNG utilities for the draw engine.
// Focus: unbiased range generation, stable seeding, Fisher–Yates shuffle.
//
// • A fixed `u64` seed replays a whole session (tests, rehearsals).
// • Without a seed the stream is keyed from OS entropy.
// • Unbiased ranges via rejection sampling; no floating point.

use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// Seedable RNG used for cosmetic resampling, region schedules, and winners.
///
/// Internally ChaCha20 with an explicit 32-byte seed derived from the
/// 64-bit seed (little-endian bytes in the first 8 positions; the rest 0).
#[derive(Debug, Clone)]
pub struct DrawRng {
    rng: ChaCha20Rng,
    words_consumed: u128,
}

impl DrawRng {
    /// Construct from a 64-bit seed: `seed.to_le_bytes()` into the first
    /// 8 bytes of the ChaCha20 seed; the remaining 24 bytes are zero.
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self {
            rng: ChaCha20Rng::from_seed(seed32),
            words_consumed: 0,
        }
    }

    /// Construct from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_entropy(),
            words_consumed: 0,
        }
    }

    /// `Some(seed)` → replayable stream, `None` → OS entropy.
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(s) => Self::from_seed_u64(s),
            None => Self::from_entropy(),
        }
    }

    /// Total number of 64-bit words consumed so far (saturating).
    #[inline]
    pub fn words_consumed(&self) -> u128 {
        self.words_consumed
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.words_consumed = self.words_consumed.saturating_add(1);
        self.rng.next_u64()
    }

    /// Unbiased integer in [0, n) using rejection sampling. Returns `None` if `n == 0`.
    ///
    /// Let `threshold = 2^64 mod n` (computed via `wrapping_neg() % n`).
    /// Accept `x` if `x >= threshold`; then `x % n` is uniformly distributed.
    #[inline]
    pub fn gen_range(&mut self, n: u64) -> Option<u64> {
        if n == 0 {
            return None;
        }
        let threshold = n.wrapping_neg() % n;
        loop {
            let x = self.next_u64();
            if x >= threshold {
                return Some(x % n);
            }
        }
    }

    /// Uniform index in `[0, n)`; `None` if `n == 0`.
    #[inline]
    pub fn choose_index(&mut self, n: usize) -> Option<usize> {
        self.gen_range(n as u64).map(|v| v as usize)
    }

    /// Uniform element of a slice; `None` if empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        let ix = self.choose_index(slice.len())?;
        slice.get(ix)
    }

    /// In-place Fisher–Yates shuffle:
    /// for i in (1..len).rev() { j ~ U{0..=i}; swap(i, j) }
    pub fn shuffle_in_place<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            if let Some(j) = self.choose_index(i + 1) {
                slice.swap(i, j);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gen_range_zero_none() {
        let mut rng = DrawRng::from_seed_u64(0xDEADBEEFCAFEBABE);
        assert_eq!(rng.gen_range(0), None);
        assert_eq!(rng.words_consumed(), 0);
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = DrawRng::from_seed_u64(123456789);
        let mut b = DrawRng::from_seed_u64(123456789);
        let seq_a: Vec<u64> = (0..16).map(|_| a.gen_range(10).unwrap()).collect();
        let seq_b: Vec<u64> = (0..16).map(|_| b.gen_range(10).unwrap()).collect();
        assert_eq!(seq_a, seq_b);
        assert!(seq_a.iter().all(|v| *v < 10));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut rng = DrawRng::from_seed_u64(42);
        let mut xs: Vec<u32> = (0..32).collect();
        rng.shuffle_in_place(&mut xs);
        let mut sorted = xs.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..32).collect::<Vec<_>>());
    }

    #[test]
    fn shuffle_short_slices_consume_nothing() {
        let mut rng = DrawRng::from_seed_u64(1);
        let mut one = [7u8];
        rng.shuffle_in_place(&mut one);
        let mut none: [u8; 0] = [];
        rng.shuffle_in_place(&mut none);
        assert_eq!(rng.words_consumed(), 0);
    }

    #[test]
    fn choose_respects_bounds() {
        let mut rng = DrawRng::from_seed_u64(7);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
        let data = [10, 20, 30];
        for _ in 0..20 {
            assert!(data.contains(rng.choose(&data).unwrap()));
        }
    }
}
