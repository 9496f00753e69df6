//! Boundary to the pairing-based signature primitive.
//!
//! The threshold core only folds key-share bytes and computes integer weights;
//! curve arithmetic, pairings and hash-to-curve live behind this trait.

use crate::error::{Error, Result};
use crate::types::{DomainTag, KeyShare};
use rand::{CryptoRng, RngCore};
use std::fmt::Debug;

/// Primitive operations of a linearly aggregatable signature scheme.
pub trait SignatureScheme {
    type PublicKey: Clone + Debug + PartialEq + Send + Sync;
    type Signature: Clone + Debug + PartialEq + Send + Sync;

    const PRIVATE_KEY_LENGTH: usize;
    const PUBLIC_KEY_LENGTH: usize;
    const SIGNATURE_LENGTH: usize;
    const HASH_LENGTH: usize;

    /// Generates a random key share whose top `headroom_bits` bits are zero.
    fn generate_key<R: RngCore + CryptoRng>(rng: &mut R, headroom_bits: u32) -> Result<KeyShare> {
        let len = Self::PRIVATE_KEY_LENGTH;
        let zero_bytes = (headroom_bits / 8) as usize;
        let remainder = headroom_bits % 8;
        if zero_bytes >= len.saturating_sub(1) {
            return Err(Error::InvalidParameters(format!(
                "cannot generate private key: {} headroom bits leave no room in a {}-byte key",
                headroom_bits, len
            )));
        }

        let mut key = KeyShare::zeroed(len);
        let bytes = key.as_bytes_mut();
        rng.fill_bytes(&mut bytes[zero_bytes..]);
        bytes[zero_bytes] >>= remainder;
        Ok(key)
    }

    fn derive_public_key(key: &KeyShare) -> Result<Self::PublicKey>;

    fn sign(key: &KeyShare, message_hash: &[u8], domain: &DomainTag) -> Result<Self::Signature>;

    fn verify(
        public_key: &Self::PublicKey,
        message_hash: &[u8],
        signature: &Self::Signature,
        domain: &DomainTag,
    ) -> bool;

    /// Computes `sum(weights[i] * keys[i])` in the public-key group.
    fn aggregate_public_keys(keys: &[Self::PublicKey], weights: &[i64]) -> Result<Self::PublicKey>;

    /// Computes `sum(weights[i] * signatures[i])` in the signature group.
    fn aggregate_signatures(
        signatures: &[Self::Signature],
        weights: &[i64],
    ) -> Result<Self::Signature>;

    fn public_key_bytes(public_key: &Self::PublicKey) -> Vec<u8>;

    fn signature_bytes(signature: &Self::Signature) -> Vec<u8>;
}
