//! Phase 3: local aggregation and signing.

use crate::error::Result;
use crate::participant::Participant;
use crate::scheme::SignatureScheme;
use log::info;
use rayon::prelude::*;

/// Each participant signs `message_hash` with its aggregate private key.
///
/// Returns the signatures indexed by participant. A participant whose
/// signature fails its own verification aborts the whole phase.
pub fn sign_all<S: SignatureScheme>(
    participants: &mut [Participant<S>],
    message_hash: &[u8],
) -> Result<Vec<S::Signature>> {
    let signatures = participants
        .par_iter_mut()
        .map(|p| p.sign(message_hash))
        .collect::<Result<Vec<_>>>()?;
    info!("{} participants signed", signatures.len());
    Ok(signatures)
}

/// Publishes every participant's aggregate public key to every peer.
///
/// Returns the published keys indexed by participant.
pub fn distribute_aggregate_public_keys<S: SignatureScheme>(
    participants: &mut [Participant<S>],
) -> Result<Vec<S::PublicKey>> {
    let published = participants
        .iter_mut()
        .map(|p| p.aggregate_key_pair().map(|pair| pair.public_key.clone()))
        .collect::<Result<Vec<_>>>()?;
    for p in participants.iter_mut() {
        for (peer, key) in published.iter().enumerate() {
            p.collect_peer_public_key(peer, key.clone())?;
        }
    }
    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bls::Bls12381;
    use crate::keygen::{distribute_shared_keys, generate_participants};
    use crate::types::{DomainTag, ThresholdParams};
    use crate::weights::WeightMatrix;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_participant_signs_under_its_aggregate_key() {
        let params = ThresholdParams::new(3, 2).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let mut participants =
            generate_participants::<Bls12381, _>(params, DomainTag::COUNTING, &mut rng).unwrap();
        distribute_shared_keys(&mut participants, &WeightMatrix::new(&params).unwrap()).unwrap();

        let hash = [0xab; 32];
        let signatures = sign_all(&mut participants, &hash).unwrap();
        let published = distribute_aggregate_public_keys(&mut participants).unwrap();
        assert_eq!(signatures.len(), 3);
        for (i, sig) in signatures.iter().enumerate() {
            assert!(Bls12381::verify(&published[i], &hash, sig, &DomainTag::COUNTING));
            assert_eq!(participants[(i + 1) % 3].peer_public_key(i), Some(&published[i]));
        }
    }
}
