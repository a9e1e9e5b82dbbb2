//! Seeded pseudorandom stream for deterministic identifiers and timestamps.
//!
//! Every proposal id and every synthetic timestamp produced by a step is drawn
//! from a [`StepRng`] constructed from the caller-supplied [`Seed`]. The
//! generator is an explicit value: two generators built from the same seed and
//! queried in the same order yield identical sequences, and nothing is shared
//! between steps or between games.
//!
//! # Determinism
//!
//! The generator is Mulberry32 over a `u32` state. All arithmetic is wrapping
//! 32-bit arithmetic, so the stream is bit-exact across platforms and matches
//! the reference stream recorded in existing game histories.

use core::convert::Infallible;
use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::state::Timestamp;

/// Initial state of a [`StepRng`].
///
/// Seeds are coerced leniently: zero, missing, and non-numeric inputs all fall
/// back to [`Seed::DEFAULT`]. Coercion never fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(u32);

impl Seed {
    /// Seed used when the caller supplies nothing usable.
    pub const DEFAULT: Seed = Seed(1);

    /// Uses `state` verbatim as the generator state, mapping `0` to the default.
    ///
    /// The zero check applies to the value as given. Coercion from a wider
    /// integer ([`Seed::from_i64`]) only falls back for a literal zero, so an
    /// input such as `2^32` reduces to state `0` and keeps it, matching the
    /// `Number(seed) || 1` then `seed | 0` reading of recorded histories.
    pub const fn new(state: u32) -> Self {
        if state == 0 { Self::DEFAULT } else { Self(state) }
    }

    /// Raw generator state.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Coerces an integer seed: zero becomes the default, everything else is
    /// reduced to its low 32 bits.
    pub const fn from_i64(value: i64) -> Self {
        if value == 0 {
            Self::DEFAULT
        } else {
            Self(value as u32)
        }
    }

    /// Coerces a floating-point seed: zero and non-finite values become the
    /// default, fractional values are floored before reduction to 32 bits.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() || value == 0.0 {
            return Self::DEFAULT;
        }
        Self(value.floor().rem_euclid(4_294_967_296.0) as u32)
    }

    /// Coerces a textual seed. Blank or non-numeric text yields the default.
    pub fn parse_lenient(text: &str) -> Self {
        let trimmed = text.trim();
        if let Ok(value) = trimmed.parse::<i64>() {
            return Self::from_i64(value);
        }
        trimmed
            .parse::<f64>()
            .map(Self::from_f64)
            .unwrap_or(Self::DEFAULT)
    }

    /// Coerces a loosely-typed seed as it arrives from JSON callers.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Number(number)) => {
                if let Some(int) = number.as_i64() {
                    Self::from_i64(int)
                } else if let Some(uint) = number.as_u64() {
                    Self(uint as u32)
                } else {
                    number.as_f64().map(Self::from_f64).unwrap_or(Self::DEFAULT)
                }
            }
            Some(Value::String(text)) => Self::parse_lenient(text),
            _ => Self::DEFAULT,
        }
    }
}

impl Default for Seed {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl From<i64> for Seed {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl FromStr for Seed {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse_lenient(s))
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mulberry32 generator carrying its own state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepRng {
    state: u32,
    draws: u64,
}

impl StepRng {
    /// Mulberry32 increment (Weyl sequence step).
    const INCREMENT: u32 = 0x6d2b_79f5;

    const TWO_POW_32: f64 = 4_294_967_296.0;

    pub fn new(seed: Seed) -> Self {
        Self {
            state: seed.value(),
            draws: 0,
        }
    }

    /// Advances the stream and returns the next value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / Self::TWO_POW_32
    }

    /// Advances the stream and returns the raw 32-bit output.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        self.draws += 1;

        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// `floor(next_f64() * scale)`.
    pub fn next_scaled(&mut self, scale: u64) -> u64 {
        (self.next_f64() * scale as f64).floor() as u64
    }

    /// Number of values drawn so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

/// Generates `"<prefix>-<base36>"` from one draw of the stream.
pub fn deterministic_id(prefix: &str, rng: &mut StepRng) -> String {
    let n = rng.next_scaled(1_000_000_000);
    format!("{prefix}-{}", to_base36(n))
}

/// Synthetic instant for the action at `ordinal`:
/// `base + 1000 * ordinal + floor(next * 1000)` milliseconds.
pub fn synthetic_timestamp(base_epoch_ms: i64, ordinal: u64, rng: &mut StepRng) -> Timestamp {
    let jitter = rng.next_scaled(1_000) as i64;
    let millis = base_epoch_ms
        .saturating_add((ordinal as i64).saturating_mul(1_000))
        .saturating_add(jitter);
    Timestamp::from_millis(millis)
}

/// Derives the seed for `step` of `game_id`.
///
/// Callers that persist an audit log feed these seeds to the engine so that a
/// replay of the log regenerates the same identifiers and timestamps.
pub fn compute_seed(game_id: &str, step: u64) -> Seed {
    let mut hasher = Sha256::new();
    hasher.update(game_id.as_bytes());
    hasher.update(step.to_be_bytes());
    let digest = hasher.finalize();

    let word = u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]);
    Seed::new(word)
}

/// Lowercase base-36 rendering of `n`.
pub fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if n == 0 {
        return "0".to_string();
    }

    let mut buf = Vec::with_capacity(13);
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8(buf).unwrap_or_default()
}
