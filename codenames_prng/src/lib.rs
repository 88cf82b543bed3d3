// Seedable random source for board dealing and room codes.
//
// xoshiro256++ (Blackman & Vigna, 2019), seeded through SplitMix64.
// Hand-rolled with no RNG crate dependency so that a seed produces the same
// board on every platform and compiler version.
//
// Consumers:
// - `codenames_game::board` draws word selection, the starting-team coin flip
//   and the card-kind shuffle from a `GameRng`.
// - `codenames_host::session` owns the session's `GameRng`, seeded either from
//   `--seed` (reproducible games, tests) or from `GameRng::from_entropy()`
//   (production), and also uses it to mint room codes.
//
// **Critical constraint: determinism.** Given the same seed and the same call
// sequence, every method must return identical values everywhere. Do not use
// floating-point arithmetic or platform-dependent sources in the core
// generator. `from_entropy` is the single, explicitly non-deterministic entry
// point and only picks the seed.

use std::collections::hash_map::RandomState;
use std::hash::{BuildHasher, Hasher};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Xoshiro256++ PRNG, the session's sole source of randomness.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameRng {
    s: [u64; 4],
}

impl GameRng {
    /// A generator whose whole output is fixed by `seed`.
    ///
    /// SplitMix64 stretches the 64-bit seed into the four state words.
    /// Two `GameRng` instances created with the same seed produce identical
    /// output sequences.
    pub fn new(seed: u64) -> Self {
        let mut sm = seed;
        Self {
            s: [
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
                splitmix64(&mut sm),
            ],
        }
    }

    /// Create a PRNG with a seed nobody can predict.
    ///
    /// Mixes the std hasher's per-process random keys with the wall clock and
    /// the process id. Returns the seed alongside the generator so callers can
    /// log it and replay a game.
    pub fn from_entropy() -> (Self, u64) {
        let mut hasher = RandomState::new().build_hasher();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        hasher.write_u128(nanos);
        hasher.write_u32(std::process::id());
        let seed = hasher.finish();
        (Self::new(seed), seed)
    }

    /// Advance the state and return 64 fresh bits.
    pub fn next_u64(&mut self) -> u64 {
        let result = (self.s[0].wrapping_add(self.s[3]))
            .rotate_left(23)
            .wrapping_add(self.s[0]);

        let t = self.s[1] << 17;

        self.s[2] ^= self.s[0];
        self.s[3] ^= self.s[1];
        self.s[1] ^= self.s[2];
        self.s[0] ^= self.s[3];

        self.s[2] ^= t;
        self.s[3] = self.s[3].rotate_left(45);

        result
    }

    /// Uniform draw from the half-open range `low..high`, without modulo
    /// bias. Panics on an empty range.
    pub fn range_u64(&mut self, low: u64, high: u64) -> u64 {
        assert!(low < high, "empty range {low}..{high}");
        let range = high - low;
        if range.is_power_of_two() {
            return low + (self.next_u64() & (range - 1));
        }
        let threshold = range.wrapping_neg() % range; // = (2^64 - range) % range
        loop {
            let r = self.next_u64();
            if r >= threshold {
                return low + (r % range);
            }
        }
    }

    /// `range_u64` for indices.
    pub fn range_usize(&mut self, low: usize, high: usize) -> usize {
        self.range_u64(low as u64, high as u64) as usize
    }

    /// Fair coin: `true` and `false` with equal probability.
    pub fn coin_flip(&mut self) -> bool {
        self.next_u64() >> 63 == 1
    }

    /// In-place Fisher–Yates shuffle. Every permutation is equally likely.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.range_usize(0, i + 1);
            items.swap(i, j);
        }
    }

    /// Pick one element uniformly, or `None` for an empty slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let i = self.range_usize(0, items.len());
        items.get(i)
    }
}

/// SplitMix64, used only for seeding xoshiro256++ from a single `u64`.
fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}
