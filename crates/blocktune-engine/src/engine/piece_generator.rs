use std::fmt::Write as _;

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{EmptyPieceDistributionError, PieceKind};

/// Seed for deterministic piece generation.
///
/// A 128-bit seed for the piece generator's RNG. Two generators built from the same seed deal
/// the same piece sequence, which keeps training runs and benchmark games reproducible.
///
/// Serialized as a 32-character lowercase hex string.
///
/// # Example
///
/// ```
/// use blocktune_engine::{PieceGenerator, PieceSeed};
/// use rand::Rng as _;
///
/// let seed: PieceSeed = rand::rng().random();
///
/// let mut a = PieceGenerator::with_seed(seed);
/// let mut b = PieceGenerator::with_seed(seed);
/// for _ in 0..16 {
///     assert_eq!(a.next_piece(), b.next_piece());
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceSeed([u8; 16]);

impl From<u64> for PieceSeed {
    fn from(value: u64) -> Self {
        Self(u128::from(value).to_be_bytes())
    }
}

impl Serialize for PieceSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex_str = String::with_capacity(2 * self.0.len());
        write!(&mut hex_str, "{num:032x}").map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&hex_str)
    }
}

impl<'de> Deserialize<'de> for PieceSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        if hex_str.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid hex: expected 32 characters, got {}",
                hex_str.len()
            )));
        }
        let num = u128::from_str_radix(&hex_str, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid hex: {hex_str} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<PieceSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        PieceSeed(seed)
    }
}

/// Count-weighted distribution over the seven piece kinds.
///
/// Each kind is drawn with probability `count(kind) / total()`. The default starts every kind at
/// 10, which is uniform.
///
/// Serialized as the array of counts in piece id order. Deserializing an all-zero array fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PieceCounts", into = "PieceCounts")]
pub struct PieceDistribution {
    counts: PieceCounts,
}

type PieceCounts = [u32; PieceKind::LEN];

impl TryFrom<PieceCounts> for PieceDistribution {
    type Error = EmptyPieceDistributionError;

    fn try_from(counts: PieceCounts) -> Result<Self, Self::Error> {
        if counts.iter().all(|&c| c == 0) {
            return Err(EmptyPieceDistributionError);
        }
        Ok(Self { counts })
    }
}

impl From<PieceDistribution> for PieceCounts {
    fn from(distribution: PieceDistribution) -> Self {
        distribution.counts
    }
}

impl Default for PieceDistribution {
    fn default() -> Self {
        Self::from_counts([Self::DEFAULT_COUNT; PieceKind::LEN])
    }
}

impl PieceDistribution {
    pub const DEFAULT_COUNT: u32 = 10;

    /// Creates a distribution from per-kind counts in piece id order.
    ///
    /// # Panics
    ///
    /// Panics if every count is zero.
    #[must_use]
    pub fn from_counts(counts: PieceCounts) -> Self {
        match Self::try_from(counts) {
            Ok(distribution) => distribution,
            Err(e) => panic!("{e}"),
        }
    }

    /// Records one more observation of `kind`.
    pub fn increment(&mut self, kind: PieceKind) {
        self.counts[kind.id()] += 1;
    }

    #[must_use]
    pub fn count(&self, kind: PieceKind) -> u32 {
        self.counts[kind.id()]
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    #[must_use]
    pub fn frequency(&self, kind: PieceKind) -> f64 {
        f64::from(self.count(kind)) / f64::from(self.total())
    }
}

impl Distribution<PieceKind> for PieceDistribution {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PieceKind {
        let mut target = rng.random_range(0..self.total());
        for kind in PieceKind::ALL {
            let count = self.count(kind);
            if target < count {
                return kind;
            }
            target -= count;
        }
        unreachable!("sample target exceeds the total count")
    }
}

/// Deterministic source of the next piece.
#[derive(Debug, Clone)]
pub struct PieceGenerator {
    rng: Pcg32,
    distribution: PieceDistribution,
}

impl Default for PieceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceGenerator {
    /// Creates a uniform generator with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    #[must_use]
    pub fn with_seed(seed: PieceSeed) -> Self {
        Self::with_distribution(seed, PieceDistribution::default())
    }

    #[must_use]
    pub fn with_distribution(seed: PieceSeed, distribution: PieceDistribution) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
            distribution,
        }
    }

    #[must_use]
    pub fn distribution(&self) -> &PieceDistribution {
        &self.distribution
    }

    pub fn next_piece(&mut self) -> PieceKind {
        self.distribution.sample(&mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod piece_seed_serialization {
        use super::*;

        #[test]
        fn test_format_is_32_char_hex_string() {
            let seed: PieceSeed = rand::rng().random();
            let serialized = serde_json::to_string(&seed).unwrap();
            let hex_str = serialized.trim_matches('"');
            assert_eq!(hex_str.len(), 32);
            assert!(hex_str.chars().all(|c| c.is_ascii_hexdigit()));

            let deserialized: PieceSeed = serde_json::from_str(&serialized).unwrap();
            assert_eq!(seed, deserialized);
        }

        #[test]
        fn test_from_u64_is_big_endian() {
            let seed = PieceSeed::from(0x1234);
            let serialized = serde_json::to_string(&seed).unwrap();
            assert_eq!(serialized, "\"00000000000000000000000000001234\"");
        }

        #[test]
        fn test_rejects_wrong_length() {
            assert!(serde_json::from_str::<PieceSeed>("\"1234\"").is_err());
            assert!(serde_json::from_str::<PieceSeed>("\"zz000000000000000000000000000000\"").is_err());
        }
    }

    #[test]
    fn test_default_distribution_is_uniform() {
        let dist = PieceDistribution::default();
        assert_eq!(dist.total(), 70);
        for kind in PieceKind::ALL {
            assert_eq!(dist.count(kind), 10);
            assert!((dist.frequency(kind) - 1.0 / 7.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_increment_shifts_frequency() {
        let mut dist = PieceDistribution::default();
        dist.increment(PieceKind::T);
        assert_eq!(dist.count(PieceKind::T), 11);
        assert_eq!(dist.total(), 71);
        assert!(dist.frequency(PieceKind::T) > dist.frequency(PieceKind::O));
    }

    #[test]
    fn test_sample_skips_zero_counts() {
        let dist = PieceDistribution::from_counts([0, 0, 0, 0, 5, 0, 0]);
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..100 {
            assert_eq!(dist.sample(&mut rng), PieceKind::T);
        }
    }

    #[test]
    #[should_panic(expected = "at least one piece kind needs a non-zero count")]
    fn test_from_counts_rejects_all_zero() {
        let _ = PieceDistribution::from_counts([0; PieceKind::LEN]);
    }

    #[test]
    fn test_distribution_json_is_counts_array() {
        let dist = PieceDistribution::from_counts([1, 2, 3, 4, 5, 6, 7]);
        let json = serde_json::to_string(&dist).unwrap();
        assert_eq!(json, "[1,2,3,4,5,6,7]");
        let parsed: PieceDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dist);
    }

    #[test]
    fn test_all_zero_distribution_does_not_deserialize() {
        let err = serde_json::from_str::<PieceDistribution>("[0,0,0,0,0,0,0]").unwrap_err();
        assert!(err.to_string().contains("non-zero count"));
        assert!(serde_json::from_str::<PieceDistribution>("[0,0,0,0,0,0,1]").is_ok());
    }

    #[test]
    fn test_uniform_generator_deals_every_kind() {
        let mut generator = PieceGenerator::with_seed(PieceSeed::from(7));
        let mut seen = [false; PieceKind::LEN];
        for _ in 0..500 {
            seen[generator.next_piece().id()] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = PieceGenerator::with_seed(PieceSeed::from(99));
        let mut b = PieceGenerator::with_seed(PieceSeed::from(99));
        let xs: Vec<_> = (0..64).map(|_| a.next_piece()).collect();
        let ys: Vec<_> = (0..64).map(|_| b.next_piece()).collect();
        assert_eq!(xs, ys);
    }
}
