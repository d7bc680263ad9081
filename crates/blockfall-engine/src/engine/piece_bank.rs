use std::{collections::VecDeque, fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::PieceKind;

/// Queue of upcoming piece kinds, refilled one shuffled bag at a time.
///
/// A bag holds exactly one piece of each of the seven kinds in random order.
/// A new bag is appended as soon as the queue runs out, so the queue is never
/// empty and [`PieceBank::peek`] can always answer.
///
/// # Example
///
/// ```
/// use blockfall_engine::{PieceBank, PieceKind, PieceSeed};
///
/// let mut bank = PieceBank::with_seed(PieceSeed::default());
///
/// // The first seven draws are a permutation of all kinds
/// let mut drawn: Vec<_> = (0..PieceKind::LEN).map(|_| bank.pop()).collect();
/// drawn.sort_by_key(|kind| kind.code());
/// assert_eq!(drawn, PieceKind::ALL);
/// ```
#[derive(Debug, Clone)]
pub struct PieceBank {
    rng: Pcg32,
    bag: VecDeque<PieceKind>,
}

impl Default for PieceBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Seed for deterministic piece generation.
///
/// 128 bits, serialized as a 32-character hex string. The same seed always
/// yields the same piece sequence, which makes games and planner runs
/// reproducible.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PieceSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex: {reason}")]
pub struct ParsePieceSeedError {
    #[error(not(source))]
    reason: String,
}

impl PieceSeed {
    /// Wraps raw seed bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl FromStr for PieceSeed {
    type Err = ParsePieceSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParsePieceSeedError {
                reason: format!("expected 32 characters, got {}", s.len()),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|e| ParsePieceSeedError {
            reason: format!("{s} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl fmt::Display for PieceSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let num = u128::from_be_bytes(self.0);
        write!(f, "{num:032x}")
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

impl PieceBank {
    /// Creates a bank seeded from the thread-local RNG.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        let mut this = Self {
            rng: Pcg32::from_seed(seed.0),
            bag: VecDeque::with_capacity(PieceKind::LEN + 1),
        };
        this.refill();
        this
    }

    fn refill(&mut self) {
        if self.bag.is_empty() {
            let mut new_bag = PieceKind::ALL;
            new_bag.shuffle(&mut self.rng);
            self.bag.extend(new_bag);
        }
    }

    /// Returns the next kind without consuming it.
    #[must_use]
    pub fn peek(&self) -> PieceKind {
        *self
            .bag
            .front()
            .expect("piece bag is refilled as soon as it runs out")
    }

    /// Consumes and returns the next kind.
    pub fn pop(&mut self) -> PieceKind {
        let kind = self.peek();
        self.bag.pop_front();
        self.refill();
        kind
    }

    /// Puts `kind` back at the front of the queue; the next [`Self::pop`]
    /// returns it.
    pub fn push_front(&mut self, kind: PieceKind) {
        self.bag.push_front(kind);
    }

    /// Iterates over the queued kinds in draw order.
    pub fn upcoming(&self) -> impl Iterator<Item = PieceKind> + '_ {
        self.bag.iter().copied()
    }

    /// Discards the queue and starts a fresh bag.
    ///
    /// The random generator keeps its state, so a reset game does not replay
    /// the previous sequence.
    pub fn reset(&mut self) {
        self.bag.clear();
        self.refill();
    }
}
