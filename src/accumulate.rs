//! Fixed-width weighted accumulation over big-endian key-share bytes.
//!
//! This one operation folds raw shares into shared private keys (weights from
//! a [`WeightMatrix`](crate::weights::WeightMatrix) row) and folds collected
//! shared keys into a participant's aggregate private key (unit weights).

use crate::error::{Error, Result};
use crate::types::KeyShare;

/// Computes `sum(weights[j] * shares[j])` in a buffer as wide as the shares.
///
/// Returns `Ok(None)` when `shares` or `weights` is empty or their lengths
/// differ; callers treat that as a no-op. Carry past the most-significant
/// byte is [`Error::KeyOverflow`], never a silent wrap.
pub fn weighted_accumulate(shares: &[KeyShare], weights: &[u64]) -> Result<Option<KeyShare>> {
    if shares.is_empty() || weights.is_empty() || shares.len() != weights.len() {
        return Ok(None);
    }

    let width = shares[0].len();
    if let Some(bad) = shares.iter().find(|s| s.len() != width) {
        return Err(Error::KeyLengthMismatch {
            expected: width,
            actual: bad.len(),
        });
    }

    let mut result = KeyShare::zeroed(width);
    let acc = result.as_bytes_mut();
    for (share, &weight) in shares.iter().zip(weights) {
        let bytes = share.as_bytes();
        for i in (0..width).rev() {
            let rough = acc[i] as u128 + bytes[i] as u128 * weight as u128;
            acc[i] = rough as u8;
            let mut carry = rough >> 8;
            let mut p = i;
            while carry != 0 {
                if p == 0 {
                    return Err(Error::KeyOverflow);
                }
                p -= 1;
                carry += acc[p] as u128;
                acc[p] = carry as u8;
                carry >>= 8;
            }
        }
    }
    Ok(Some(result))
}

/// Unit-weight accumulation: plain fixed-width addition of every share.
pub fn sum(shares: &[KeyShare]) -> Result<Option<KeyShare>> {
    weighted_accumulate(shares, &vec![1u64; shares.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn share(bytes: &[u8]) -> KeyShare {
        KeyShare::from_bytes(bytes.to_vec())
    }

    fn to_u128(share: &KeyShare) -> u128 {
        share.as_bytes().iter().fold(0u128, |acc, &b| (acc << 8) | b as u128)
    }

    #[test]
    fn test_single_unit_weight_is_identity() {
        let s = share(&[0x00, 0x12, 0x34, 0xff]);
        let out = weighted_accumulate(&[s.clone()], &[1]).unwrap().unwrap();
        assert_eq!(out, s);
    }

    #[test]
    fn test_unit_weights_add_with_carry() {
        let a = share(&[0x00, 0x00, 0xff, 0xff]);
        let b = share(&[0x00, 0x00, 0x00, 0x01]);
        let out = sum(&[a, b]).unwrap().unwrap();
        assert_eq!(out.as_bytes(), &[0x00, 0x01, 0x00, 0x00]);
    }

    #[test]
    fn test_matches_integer_arithmetic() {
        let a = share(&[0x00, 0x00, 0x00, 0x01, 0x23, 0x45, 0x67, 0x89]);
        let b = share(&[0x00, 0x00, 0x00, 0x00, 0xfe, 0xdc, 0xba, 0x98]);
        let c = share(&[0x00, 0x00, 0x00, 0x0f, 0xff, 0xff, 0xff, 0xff]);
        let weights = [1u64, 49, 1000];
        let out = weighted_accumulate(&[a.clone(), b.clone(), c.clone()], &weights)
            .unwrap()
            .unwrap();
        let expected = to_u128(&a) + 49 * to_u128(&b) + 1000 * to_u128(&c);
        assert_eq!(to_u128(&out), expected);
    }

    #[test]
    fn test_large_weight() {
        let a = share(&[0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0xff]);
        let out = weighted_accumulate(&[a], &[u64::MAX]).unwrap().unwrap();
        assert_eq!(to_u128(&out), 0xff * u64::MAX as u128);
    }

    #[test]
    fn test_overflow_is_an_error() {
        let a = share(&[0x80, 0x00]);
        let b = share(&[0x80, 0x00]);
        assert!(matches!(sum(&[a.clone(), b]), Err(Error::KeyOverflow)));
        assert!(matches!(
            weighted_accumulate(&[a], &[2]),
            Err(Error::KeyOverflow)
        ));
    }

    #[test]
    fn test_degenerate_inputs_are_noops() {
        let a = share(&[1, 2]);
        assert!(weighted_accumulate(&[], &[]).unwrap().is_none());
        assert!(weighted_accumulate(&[a.clone()], &[]).unwrap().is_none());
        assert!(weighted_accumulate(&[a], &[1, 2]).unwrap().is_none());
    }

    #[test]
    fn test_width_mismatch() {
        let a = share(&[1, 2]);
        let b = share(&[1, 2, 3]);
        assert!(matches!(
            sum(&[a, b]),
            Err(Error::KeyLengthMismatch { expected: 2, actual: 3 })
        ));
    }
}
