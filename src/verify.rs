//! Reconstruction of the group signature from every quorum, and its final check.

use crate::error::{Error, Result};
use crate::lagrange::{coefficients, combination_lcm, integer_weights, lcm_of};
use crate::quorum;
use crate::scheme::SignatureScheme;
use crate::types::{Combination, DomainTag, Fraction, ThresholdParams};
use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;
use std::marker::PhantomData;

/// Every quorum for a parameter set together with its reconstruction
/// coefficients and the overall LCM that makes them integral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuorumPlan {
    pub combinations: Vec<Combination>,
    pub fractions: Vec<Vec<Fraction>>,
    pub lcms: Vec<u64>,
    pub overall_lcm: u64,
}

impl QuorumPlan {
    /// Enumerates every quorum and solves its weights.
    ///
    /// Parameters whose overall LCM, or any weight scaled by it, does not fit
    /// an `i64` are rejected as [`Error::InvalidParameters`].
    pub fn new(params: &ThresholdParams) -> Result<Self> {
        let combinations = quorum::enumerate(params);
        let fractions = combinations
            .par_iter()
            .map(|c| {
                coefficients(c).ok_or_else(|| {
                    Error::InvalidParameters(format!("degenerate combination {:?}", c))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let too_large = |_: Error| {
            Error::InvalidParameters(format!(
                "n={}, m={}: reconstruction weights exceed {} (the signed 64-bit weight bound)",
                params.n(),
                params.m(),
                i64::MAX
            ))
        };
        let lcms = fractions
            .iter()
            .map(|f| combination_lcm(f).map_err(too_large))
            .collect::<Result<Vec<_>>>()?;
        let overall_lcm = lcm_of(lcms.iter().copied()).map_err(too_large)?;

        // Reject up front if any scaled weight does not fit the signed weight type.
        for f in &fractions {
            integer_weights(f, overall_lcm).map_err(too_large)?;
        }
        debug!(
            "quorum plan: {} combinations, overall LCM {}",
            combinations.len(),
            overall_lcm
        );
        Ok(Self {
            combinations,
            fractions,
            lcms,
            overall_lcm,
        })
    }

    pub fn len(&self) -> usize {
        self.combinations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combinations.is_empty()
    }

    /// Signed integer weights of combination `index`, scaled by the overall LCM.
    pub fn weights(&self, index: usize) -> Result<Vec<i64>> {
        let fractions = self
            .fractions
            .get(index)
            .ok_or_else(|| Error::InvalidParameters(format!("no combination {}", index)))?;
        integer_weights(fractions, self.overall_lcm)
    }
}

/// Combines per-participant signatures quorum by quorum and checks the result.
pub struct SignatureReconstructor<'a, S: SignatureScheme> {
    plan: &'a QuorumPlan,
    message_hash: &'a [u8],
    domain: DomainTag,
    _scheme: PhantomData<fn() -> S>,
}

impl<'a, S: SignatureScheme> SignatureReconstructor<'a, S> {
    pub fn new(plan: &'a QuorumPlan, message_hash: &'a [u8], domain: DomainTag) -> Self {
        Self {
            plan,
            message_hash,
            domain,
            _scheme: PhantomData,
        }
    }

    /// Checks every participant's signature against its published aggregate public key.
    pub fn check_partials(
        &self,
        signatures: &[S::Signature],
        public_keys: &[S::PublicKey],
    ) -> Result<()> {
        if signatures.len() != public_keys.len() {
            return Err(Error::InvalidParameters(format!(
                "{} signatures but {} public keys",
                signatures.len(),
                public_keys.len()
            )));
        }
        signatures
            .par_iter()
            .zip(public_keys.par_iter())
            .enumerate()
            .try_for_each(|(participant, (sig, pk))| {
                if S::verify(pk, self.message_hash, sig, &self.domain) {
                    Ok(())
                } else {
                    Err(Error::PartialSignatureInvalid { participant })
                }
            })
    }

    /// Aggregates the signatures of `members` (1-based ids) under their
    /// Lagrange weights scaled by `scale`.
    pub fn combine(
        &self,
        members: &[u32],
        signatures: &[S::Signature],
        scale: u64,
    ) -> Result<S::Signature> {
        let fractions = coefficients(members).ok_or_else(|| {
            Error::InvalidParameters(format!("invalid quorum {:?}", members))
        })?;
        let weights = integer_weights(&fractions, scale)?;
        aggregate::<S>(&fractions, &weights, signatures)
    }

    /// Reconstructs the group signature from every quorum of the plan and
    /// requires all of them to be byte-identical.
    pub fn reconstruct(&self, signatures: &[S::Signature]) -> Result<S::Signature> {
        let finals = self
            .plan
            .fractions
            .par_iter()
            .enumerate()
            .map(|(index, fractions)| {
                let weights = self.plan.weights(index)?;
                aggregate::<S>(fractions, &weights, signatures)
            })
            .collect::<Result<Vec<_>>>()?;

        let first = finals
            .first()
            .ok_or_else(|| Error::InvalidParameters("no combinations to reconstruct".to_string()))?;
        let first_bytes = S::signature_bytes(first);
        for (other, sig) in finals.iter().enumerate().skip(1) {
            if S::signature_bytes(sig) != first_bytes {
                return Err(Error::ReconstructionMismatch { first: 0, other });
            }
        }
        info!(
            "{} combinations reconstructed the same signature",
            finals.len()
        );
        Ok(first.clone())
    }

    /// `overall_lcm * sum(published)`: the public key the group signature verifies under.
    ///
    /// `published` holds each participant's first published (non-shared) public key.
    pub fn reference_public_key(&self, published: &[S::PublicKey]) -> Result<S::PublicKey> {
        reference_public_key::<S>(published, self.plan.overall_lcm)
    }

    pub fn verify_final(
        &self,
        signature: &S::Signature,
        reference_key: &S::PublicKey,
    ) -> Result<()> {
        if !S::verify(reference_key, self.message_hash, signature, &self.domain) {
            return Err(Error::FinalVerificationFailed);
        }
        info!("final signature verified against the aggregate public key");
        Ok(())
    }
}

/// Gathers the signature of each fraction's member and aggregates them under `weights`.
fn aggregate<S: SignatureScheme>(
    fractions: &[Fraction],
    weights: &[i64],
    signatures: &[S::Signature],
) -> Result<S::Signature> {
    let gathered = fractions
        .iter()
        .map(|f| {
            signatures
                .get(f.id as usize)
                .cloned()
                .ok_or(Error::UnknownParticipant(f.id as usize))
        })
        .collect::<Result<Vec<_>>>()?;
    S::aggregate_signatures(&gathered, weights)
}

/// Aggregates `published` keys, each with weight `scale`.
pub fn reference_public_key<S: SignatureScheme>(
    published: &[S::PublicKey],
    scale: u64,
) -> Result<S::PublicKey> {
    let weight = i64::try_from(scale).map_err(|_| Error::WeightOverflow)?;
    S::aggregate_public_keys(published, &vec![weight; published.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bls::Bls12381;
    use crate::types::KeyShare;

    #[test]
    fn test_plan_four_choose_two() {
        let params = ThresholdParams::new(4, 2).unwrap();
        let plan = QuorumPlan::new(&params).unwrap();
        assert_eq!(plan.len(), 6);
        // Denominators are |x - y| for x, y in 1..=4: 1, 2, 3.
        assert_eq!(plan.overall_lcm, 6);
        // {1, 2}: l_1 = 2, l_2 = -1
        assert_eq!(plan.weights(0).unwrap(), vec![12, -6]);
        assert!(plan.weights(6).is_err());
    }

    #[test]
    fn test_plan_degenerate() {
        let params = ThresholdParams::new(1, 1).unwrap();
        let plan = QuorumPlan::new(&params).unwrap();
        assert_eq!(plan.combinations, vec![vec![1]]);
        assert_eq!(plan.overall_lcm, 1);
        assert_eq!(plan.weights(0).unwrap(), vec![1]);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let params = ThresholdParams::new(7, 3).unwrap();
        let a = QuorumPlan::new(&params).unwrap();
        let b = QuorumPlan::new(&params).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 35);
        for (fractions, lcm) in a.fractions.iter().zip(&a.lcms) {
            assert_eq!(a.overall_lcm % lcm, 0);
            assert_eq!(fractions.len(), 3);
        }
    }

    #[test]
    fn test_plan_rejects_weights_past_i64() {
        // For m = 2 the overall LCM is lcm(1..n-1) and the largest weight is n times it.
        let plan = QuorumPlan::new(&ThresholdParams::new(42, 2).unwrap()).unwrap();
        assert_eq!(plan.overall_lcm, 219_060_189_739_591_200);

        let params = ThresholdParams::new(43, 2).unwrap();
        let result = QuorumPlan::new(&params);
        assert!(
            matches!(result, Err(Error::InvalidParameters(_))),
            "Expected InvalidParameters for n=43, m=2, got {:?}",
            result
        );
    }

    fn key(value: u64) -> KeyShare {
        let mut bytes = vec![0u8; Bls12381::PRIVATE_KEY_LENGTH];
        bytes[24..].copy_from_slice(&value.to_be_bytes());
        KeyShare::from_bytes(bytes)
    }

    #[test]
    fn test_reconstruct_takes_weights_from_plan() {
        // F(x) = 11 + 4x, participant i signs with F(i + 1).
        let hash = [0x56; 32];
        let params = ThresholdParams::new(3, 2).unwrap();
        let signatures: Vec<_> = (1..=3u64)
            .map(|x| Bls12381::sign(&key(11 + 4 * x), &hash, &DomainTag::ONE).unwrap())
            .collect();

        let mut plan = QuorumPlan::new(&params).unwrap();
        let reconstructor = SignatureReconstructor::<Bls12381>::new(&plan, &hash, DomainTag::ONE);
        let sig = reconstructor.reconstruct(&signatures).unwrap();
        let expected = Bls12381::sign(&key(11 * plan.overall_lcm), &hash, &DomainTag::ONE).unwrap();
        assert_eq!(sig, expected);

        plan.fractions[0][0].sign = !plan.fractions[0][0].sign;
        let reconstructor = SignatureReconstructor::<Bls12381>::new(&plan, &hash, DomainTag::ONE);
        assert!(matches!(
            reconstructor.reconstruct(&signatures),
            Err(Error::ReconstructionMismatch { first: 0, other: 1 })
        ));
    }
}
