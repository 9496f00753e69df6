//! BLS signatures over BLS12-381 with public keys in G1 and signatures in G2.
//!
//! Private keys are big-endian byte strings reduced modulo the group order,
//! so integer sums of key shares map to the same sums of scalars.

use crate::error::{Error, Result};
use crate::scheme::SignatureScheme;
use crate::types::{DomainTag, KeyShare};
use bls12_381::hash_to_curve::{ExpandMsgXmd, HashToCurve};
use bls12_381::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};

const DST_PREFIX: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_";

/// The BLS12-381 instantiation of [`SignatureScheme`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Bls12381;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(pub G1Affine);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature(pub G2Affine);

impl PublicKey {
    pub fn to_bytes(&self) -> [u8; 48] {
        self.0.to_compressed()
    }

    pub fn from_bytes(bytes: &[u8; 48]) -> Result<Self> {
        Option::from(G1Affine::from_compressed(bytes))
            .map(PublicKey)
            .ok_or(Error::InvalidEncoding("invalid G1 public key"))
    }
}

impl Signature {
    pub fn to_bytes(&self) -> [u8; 96] {
        self.0.to_compressed()
    }

    pub fn from_bytes(bytes: &[u8; 96]) -> Result<Self> {
        Option::from(G2Affine::from_compressed(bytes))
            .map(Signature)
            .ok_or(Error::InvalidEncoding("invalid G2 signature"))
    }
}

fn scalar_from_key(key: &KeyShare) -> Result<Scalar> {
    let bytes = key.as_bytes();
    if bytes.len() != Bls12381::PRIVATE_KEY_LENGTH {
        return Err(Error::KeyLengthMismatch {
            expected: Bls12381::PRIVATE_KEY_LENGTH,
            actual: bytes.len(),
        });
    }
    let mut wide = [0u8; 64];
    for (dst, src) in wide.iter_mut().zip(bytes.iter().rev()) {
        *dst = *src;
    }
    Ok(Scalar::from_bytes_wide(&wide))
}

fn scalar_from_weight(weight: i64) -> Scalar {
    let magnitude = Scalar::from(weight.unsigned_abs());
    if weight < 0 {
        -magnitude
    } else {
        magnitude
    }
}

fn hash_to_g2(message_hash: &[u8], domain: &DomainTag) -> G2Projective {
    let mut dst = Vec::with_capacity(DST_PREFIX.len() + 8);
    dst.extend_from_slice(DST_PREFIX);
    dst.extend_from_slice(domain.as_bytes());
    <G2Projective as HashToCurve<ExpandMsgXmd<sha2::Sha256>>>::hash_to_curve(message_hash, &dst)
}

fn check_weights(items: usize, weights: usize) -> Result<()> {
    if items == 0 {
        return Err(Error::Aggregation("nothing to aggregate".to_string()));
    }
    if items != weights {
        return Err(Error::Aggregation(format!(
            "{} inputs but {} weights",
            items, weights
        )));
    }
    Ok(())
}

impl SignatureScheme for Bls12381 {
    type PublicKey = PublicKey;
    type Signature = Signature;

    const PRIVATE_KEY_LENGTH: usize = 32;
    const PUBLIC_KEY_LENGTH: usize = 48;
    const SIGNATURE_LENGTH: usize = 96;
    const HASH_LENGTH: usize = 32;

    fn derive_public_key(key: &KeyShare) -> Result<PublicKey> {
        let sk = scalar_from_key(key)?;
        Ok(PublicKey(G1Affine::from(G1Projective::generator() * sk)))
    }

    fn sign(key: &KeyShare, message_hash: &[u8], domain: &DomainTag) -> Result<Signature> {
        if message_hash.len() != Self::HASH_LENGTH {
            return Err(Error::InvalidEncoding("message hash has the wrong length"));
        }
        let sk = scalar_from_key(key)?;
        Ok(Signature(G2Affine::from(hash_to_g2(message_hash, domain) * sk)))
    }

    fn verify(
        public_key: &PublicKey,
        message_hash: &[u8],
        signature: &Signature,
        domain: &DomainTag,
    ) -> bool {
        if message_hash.len() != Self::HASH_LENGTH {
            return false;
        }
        let h = G2Affine::from(hash_to_g2(message_hash, domain));
        pairing(&public_key.0, &h) == pairing(&G1Affine::generator(), &signature.0)
    }

    fn aggregate_public_keys(keys: &[PublicKey], weights: &[i64]) -> Result<PublicKey> {
        check_weights(keys.len(), weights.len())?;
        let sum = keys
            .iter()
            .zip(weights)
            .fold(G1Projective::identity(), |acc, (key, &w)| {
                acc + G1Projective::from(key.0) * scalar_from_weight(w)
            });
        Ok(PublicKey(G1Affine::from(sum)))
    }

    fn aggregate_signatures(signatures: &[Signature], weights: &[i64]) -> Result<Signature> {
        check_weights(signatures.len(), weights.len())?;
        let sum = signatures
            .iter()
            .zip(weights)
            .fold(G2Projective::identity(), |acc, (sig, &w)| {
                acc + G2Projective::from(sig.0) * scalar_from_weight(w)
            });
        Ok(Signature(G2Affine::from(sum)))
    }

    fn public_key_bytes(public_key: &PublicKey) -> Vec<u8> {
        public_key.to_bytes().to_vec()
    }

    fn signature_bytes(signature: &Signature) -> Vec<u8> {
        signature.to_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const HASH: [u8; 32] = [0x56; 32];

    fn key(byte: u8) -> KeyShare {
        let mut bytes = vec![0u8; 32];
        bytes[31] = byte;
        KeyShare::from_bytes(bytes)
    }

    #[test]
    fn test_sign_and_verify() {
        let mut rng = StdRng::seed_from_u64(7);
        let sk = Bls12381::generate_key(&mut rng, 11).unwrap();
        let pk = Bls12381::derive_public_key(&sk).unwrap();
        let sig = Bls12381::sign(&sk, &HASH, &DomainTag::ONE).unwrap();
        assert!(Bls12381::verify(&pk, &HASH, &sig, &DomainTag::ONE));
        assert!(!Bls12381::verify(&pk, &HASH, &sig, &DomainTag::ZERO));
        assert!(!Bls12381::verify(&pk, &[0xab; 32], &sig, &DomainTag::ONE));
    }

    #[test]
    fn test_weighted_aggregation_is_linear() {
        // 3*k5 - 2*k7 = k1
        let pks: Vec<_> = [5u8, 7]
            .iter()
            .map(|&b| Bls12381::derive_public_key(&key(b)).unwrap())
            .collect();
        let agg = Bls12381::aggregate_public_keys(&pks, &[3, -2]).unwrap();
        assert_eq!(agg, Bls12381::derive_public_key(&key(1)).unwrap());

        let sigs: Vec<_> = [5u8, 7]
            .iter()
            .map(|&b| Bls12381::sign(&key(b), &HASH, &DomainTag::HIGH_BIT).unwrap())
            .collect();
        let agg = Bls12381::aggregate_signatures(&sigs, &[3, -2]).unwrap();
        assert_eq!(agg, Bls12381::sign(&key(1), &HASH, &DomainTag::HIGH_BIT).unwrap());
    }

    #[test]
    fn test_aggregation_input_checks() {
        let pk = Bls12381::derive_public_key(&key(1)).unwrap();
        assert!(Bls12381::aggregate_public_keys(&[], &[]).is_err());
        assert!(Bls12381::aggregate_public_keys(&[pk], &[1, 2]).is_err());
    }

    #[test]
    fn test_generate_key_headroom() {
        let mut rng = StdRng::seed_from_u64(1);
        let sk = Bls12381::generate_key(&mut rng, 11).unwrap();
        assert_eq!(sk.len(), 32);
        assert_eq!(sk.as_bytes()[0], 0);
        assert!(sk.as_bytes()[1] < 0x20);
        assert!(Bls12381::generate_key(&mut rng, 31 * 8).is_err());
    }

    #[test]
    fn test_encoding_round_trip() {
        let pk = Bls12381::derive_public_key(&key(9)).unwrap();
        assert_eq!(PublicKey::from_bytes(&pk.to_bytes()).unwrap(), pk);
        assert!(PublicKey::from_bytes(&[0xff; 48]).is_err());
    }

    #[test]
    fn test_wrong_key_length() {
        let short = KeyShare::from_bytes(vec![1u8; 16]);
        assert!(matches!(
            Bls12381::derive_public_key(&short),
            Err(Error::KeyLengthMismatch { expected: 32, actual: 16 })
        ));
    }
}
