//! Session Random Number Generator
//!
//! Uses Xorshift128+ for fast, high-quality randomness.
//! Given the same seed, produces an identical sequence, which keeps
//! target re-rolls reproducible in tests.

use serde::{Serialize, Deserialize};

/// PRNG using the Xorshift128+ algorithm.
///
/// # Example
///
/// ```
/// use colorfall::core::rng::SessionRng;
///
/// let mut rng = SessionRng::new(12345);
/// let a = rng.next_index(4);
/// assert!(a < 4);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRng {
    state: [u64; 2],
}

impl Default for SessionRng {
    fn default() -> Self {
        Self::new(0)
    }
}

impl SessionRng {
    /// Create a new RNG from a 64-bit seed.
    ///
    /// Uses SplitMix64 to initialize the internal state, ensuring
    /// good distribution even from weak seeds.
    pub fn new(seed: u64) -> Self {
        let mut s = seed;
        let state0 = splitmix64(&mut s);
        let state1 = splitmix64(&mut s);

        // Ensure state is never all zeros
        let state = if state0 == 0 && state1 == 0 {
            [1, 1]
        } else {
            [state0, state1]
        };

        Self { state }
    }

    /// Create an RNG seeded from the system clock.
    ///
    /// Good enough entropy for picking game targets; tests use
    /// [`SessionRng::new`] with a fixed seed instead.
    pub fn from_entropy() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x5EED);
        Self::new(nanos)
    }

    /// Generate the next 64-bit random value.
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        let s0 = self.state[0];
        let mut s1 = self.state[1];
        let result = s0.wrapping_add(s1);

        s1 ^= s0;
        self.state[0] = s0.rotate_left(24) ^ s1 ^ (s1 << 16);
        self.state[1] = s1.rotate_left(37);

        result
    }

    /// Generate a uniform index in range [0, len).
    ///
    /// Returns 0 when `len` is 0.
    #[inline]
    pub fn next_index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        // Simple modulo - slight bias for very large len, but acceptable
        (self.next_u64() % len as u64) as usize
    }

    /// Select a random element from a slice.
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            None
        } else {
            let idx = self.next_index(slice.len());
            Some(&slice[idx])
        }
    }
}

/// SplitMix64 for seed initialization.
/// Produces well-distributed values from sequential seeds.
#[inline]
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut rng1 = SessionRng::new(42);
        let mut rng2 = SessionRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u64(), rng2.next_u64());
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let mut rng1 = SessionRng::new(1);
        let mut rng2 = SessionRng::new(2);

        let seq1: Vec<u64> = (0..10).map(|_| rng1.next_u64()).collect();
        let seq2: Vec<u64> = (0..10).map(|_| rng2.next_u64()).collect();

        assert_ne!(seq1, seq2);
    }

    #[test]
    fn test_next_index_bounds() {
        let mut rng = SessionRng::new(777);
        for _ in 0..1000 {
            assert!(rng.next_index(4) < 4);
            assert!(rng.next_index(6) < 6);
        }
        assert_eq!(rng.next_index(0), 0);
        assert_eq!(rng.next_index(1), 0);
    }

    #[test]
    fn test_index_covers_range() {
        let mut rng = SessionRng::new(9);
        let mut seen = [false; 4];
        for _ in 0..200 {
            seen[rng.next_index(4)] = true;
        }
        assert!(seen.iter().all(|&s| s), "all indices should appear");
    }

    #[test]
    fn test_choose() {
        let mut rng = SessionRng::new(5);
        let empty: [u32; 0] = [];
        assert!(rng.choose(&empty).is_none());

        let items = [10, 20, 30];
        let picked = rng.choose(&items).unwrap();
        assert!(items.contains(picked));
    }

    #[test]
    fn test_zero_seed_not_stuck() {
        let mut rng = SessionRng::new(0);
        let a = rng.next_u64();
        let b = rng.next_u64();
        assert_ne!(a, b);
    }
}
