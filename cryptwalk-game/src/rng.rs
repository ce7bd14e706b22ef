//! Random source policy shared by every resolver.
//!
//! All probabilistic branches (enemy selection, crit and whiff chances,
//! threshold rolls, event picks) draw unit rolls through [`RandomSource`],
//! so tests can swap in [`ScriptedRolls`] and replay exact sequences.

use hmac::{Hmac, Mac};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use sha2::Sha256;

use crate::numbers::{floor_f64_to_i32, index_from_roll};

/// Uniform source of rolls in `[0, 1)`.
pub trait RandomSource {
    /// Draw the next unit roll.
    fn next_f64(&mut self) -> f64;

    /// Draw one roll and report whether it landed below `probability`.
    fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    /// `base + floor(roll * width)`, i.e. an integer in `[base, base + width)`.
    fn spread(&mut self, base: i32, width: i32) -> i32 {
        base + floor_f64_to_i32(self.next_f64() * f64::from(width))
    }

    /// Uniform index into a collection of `len` elements.
    fn pick_index(&mut self, len: usize) -> usize {
        index_from_roll(self.next_f64(), len)
    }
}

/// Seeded production RNG that counts its draws.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: SmallRng,
    draws: u64,
}

impl GameRng {
    /// Construct the stream from a user-visible seed.
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(derive_stream_seed(seed, b"cryptwalk")),
            draws: 0,
        }
    }

    /// Number of rolls drawn so far.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for GameRng {
    fn next_f64(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        self.rng.r#gen::<f64>()
    }
}

/// Replays a fixed list of rolls.
///
/// Once the script runs out the final roll repeats; an empty script
/// yields `0.0`. Rolls are clamped into `[0, 1)`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedRolls {
    #[must_use]
    pub fn new(rolls: impl Into<Vec<f64>>) -> Self {
        Self {
            rolls: rolls.into(),
            cursor: 0,
        }
    }

    /// Append more rolls to the end of the script.
    pub fn push(&mut self, roll: f64) {
        self.rolls.push(roll);
    }

    /// Number of rolls handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRolls {
    fn next_f64(&mut self) -> f64 {
        let roll = self
            .rolls
            .get(self.cursor)
            .or_else(|| self.rolls.last())
            .copied()
            .unwrap_or(0.0);
        self.cursor = self.cursor.saturating_add(1);
        roll.clamp(0.0, 1.0 - f64::EPSILON)
    }
}

fn derive_stream_seed(user_seed: u64, domain_tag: &[u8]) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(&user_seed.to_le_bytes()) else {
        return user_seed;
    };
    mac.update(domain_tag);
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0_u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(seed_bytes)
}
