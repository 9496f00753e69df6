use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Threshold parameters for one run: `n` participants, any `m` of which can sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThresholdParams {
    n: u32,
    m: u32,
}

impl ThresholdParams {
    /// Validates `(n, m)`.
    ///
    /// Besides `0 < m <= n`, the bound `m * n^m` must fit in a `u64`: it caps
    /// the weight matrix entries, each quorum's id products and the key
    /// headroom. It does not bound the overall LCM of the reconstruction
    /// weights; [`QuorumPlan::new`](crate::verify::QuorumPlan::new) rejects
    /// parameters whose weights do not fit an `i64`.
    pub fn new(n: u32, m: u32) -> Result<Self> {
        if n == 0 || m == 0 {
            return Err(Error::InvalidParameters(format!(
                "n and m must be positive (n={}, m={})",
                n, m
            )));
        }
        if m > n {
            return Err(Error::InvalidParameters(format!(
                "threshold m={} exceeds participant count n={}",
                m, n
            )));
        }
        if growth_bound(n, m).is_none() {
            return Err(Error::InvalidParameters(format!(
                "m * n^m overflows 64 bits for n={}, m={}",
                n, m
            )));
        }
        Ok(Self { n, m })
    }

    pub fn n(&self) -> u32 {
        self.n
    }

    pub fn m(&self) -> u32 {
        self.m
    }

    /// Number of high-order bits each raw key share keeps at zero so that a
    /// participant's aggregate private key cannot carry out of the buffer.
    pub fn headroom_bits(&self) -> u32 {
        // Validated in `new`.
        let bound = growth_bound(self.n, self.m).unwrap_or(u64::MAX);
        u64::BITS - bound.leading_zeros()
    }

    /// C(n, m), the number of distinct quorums.
    pub fn combination_count(&self) -> u64 {
        binomial(self.n as u64, self.m as u64)
    }
}

fn growth_bound(n: u32, m: u32) -> Option<u64> {
    (n as u64).checked_pow(m)?.checked_mul(m as u64)
}

/// Binomial coefficient computed with exact intermediate division.
pub fn binomial(n: u64, k: u64) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
    }
    result as u64
}

/// A raw or derived private key share: a fixed-width big-endian unsigned integer.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyShare(Vec<u8>);

impl KeyShare {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// An all-zero share of `len` bytes, the accumulator's starting value.
    pub fn zeroed(len: usize) -> Self {
        Self(vec![0u8; len])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for KeyShare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyShare")
            .field("length", &self.0.len())
            .field("value", &"***SENSITIVE***")
            .finish()
    }
}

/// 8-byte context string mixed into signing and verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomainTag(pub [u8; 8]);

impl DomainTag {
    pub const ZERO: DomainTag = DomainTag([0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    pub const ONE: DomainTag = DomainTag([0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01]);
    pub const LOW_BIT_HIGH_BYTE: DomainTag =
        DomainTag([0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    pub const HIGH_BIT: DomainTag = DomainTag([0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    pub const COUNTING: DomainTag = DomainTag([0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef]);
    pub const ALL_ONES: DomainTag = DomainTag([0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl Default for DomainTag {
    fn default() -> Self {
        DomainTag::ONE
    }
}

impl fmt::Display for DomainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl FromStr for DomainTag {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.trim_start_matches("0x"))
            .map_err(|_| Error::InvalidEncoding("domain tag is not valid hex"))?;
        let tag: [u8; 8] = bytes
            .try_into()
            .map_err(|_| Error::InvalidEncoding("domain tag must be exactly 8 bytes"))?;
        Ok(DomainTag(tag))
    }
}

impl Serialize for DomainTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for DomainTag {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A quorum: ascending, distinct, 1-based participant ids.
pub type Combination = Vec<u32>;

/// One member's Lagrange-at-zero coefficient for its combination, in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: u64,
    pub denominator: u64,
    /// `true` for a positive coefficient.
    pub sign: bool,
    /// 0-based participant index.
    pub id: u32,
}

impl Fraction {
    /// Exact signed integer weight `numerator * (scale / denominator)`.
    ///
    /// `scale` must be a multiple of the denominator.
    pub fn weight(&self, scale: u64) -> Result<i64> {
        if self.denominator == 0 || scale % self.denominator != 0 {
            return Err(Error::WeightOverflow);
        }
        let magnitude = self
            .numerator
            .checked_mul(scale / self.denominator)
            .ok_or(Error::WeightOverflow)?;
        let magnitude = i64::try_from(magnitude).map_err(|_| Error::WeightOverflow)?;
        Ok(if self.sign { magnitude } else { -magnitude })
    }
}

/// Shared key pair produced by one participant for one consumer.
#[derive(Debug, Clone)]
pub struct SharedKeyPair<P> {
    pub private_key: KeyShare,
    pub public_key: P,
}

/// A participant's own key pair: the unit-weight fold of every shared key pair it collected.
#[derive(Debug, Clone)]
pub struct AggregateKeyPair<P> {
    pub private_key: KeyShare,
    pub public_key: P,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validation() {
        assert!(ThresholdParams::new(0, 0).is_err());
        assert!(ThresholdParams::new(3, 0).is_err());
        assert!(ThresholdParams::new(3, 4).is_err());
        assert!(ThresholdParams::new(1, 1).is_ok());
        assert!(ThresholdParams::new(7, 3).is_ok());
        // 100^20 does not fit in 64 bits.
        assert!(ThresholdParams::new(100, 20).is_err());
    }

    #[test]
    fn test_headroom_bits() {
        // m * n^m = 3 * 343 = 1029 -> 11 bits
        let params = ThresholdParams::new(7, 3).unwrap();
        assert_eq!(params.headroom_bits(), 11);
        // 1 * 1 = 1 -> 1 bit
        let params = ThresholdParams::new(1, 1).unwrap();
        assert_eq!(params.headroom_bits(), 1);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(4, 2), 6);
        assert_eq!(binomial(7, 3), 35);
        assert_eq!(binomial(1, 1), 1);
        assert_eq!(binomial(10, 0), 1);
        assert_eq!(binomial(3, 4), 0);
        assert_eq!(ThresholdParams::new(7, 5).unwrap().combination_count(), 21);
    }

    #[test]
    fn test_domain_tag_parse() {
        let tag: DomainTag = "0123456789abcdef".parse().unwrap();
        assert_eq!(tag, DomainTag::COUNTING);
        let tag: DomainTag = "0x8000000000000000".parse().unwrap();
        assert_eq!(tag, DomainTag::HIGH_BIT);
        assert!("0102".parse::<DomainTag>().is_err());
        assert!("zz".parse::<DomainTag>().is_err());
        assert_eq!(DomainTag::ALL_ONES.to_string(), "ffffffffffffffff");
    }

    #[test]
    fn test_fraction_weight() {
        let f = Fraction { numerator: 3, denominator: 2, sign: false, id: 0 };
        assert_eq!(f.weight(6).unwrap(), -9);
        let f = Fraction { numerator: 1, denominator: 1, sign: true, id: 0 };
        assert_eq!(f.weight(4).unwrap(), 4);
        let f = Fraction { numerator: 1, denominator: 4, sign: true, id: 0 };
        assert!(f.weight(6).is_err());
    }

    #[test]
    fn test_key_share_debug_redaction() {
        let share = KeyShare::from_bytes(vec![0xAB; 32]);
        let debug_str = format!("{:?}", share);
        assert!(debug_str.contains("length: 32"));
        assert!(debug_str.contains("***SENSITIVE***"));
        assert!(!debug_str.contains("171"));
    }
}
