//! Key setup: raw share generation, shared key derivation, and the all-to-all
//! exchange of shared key pairs.
//!
//! # Phases
//! - Phase 1: each participant derives one shared key pair per consumer.
//!   Participants are independent, so this runs in parallel.
//! - Phase 2: every producer's pairs are delivered to every consumer. This is
//!   a full barrier: no consumer aggregates before all producers delivered.

use crate::error::Result;
use crate::participant::Participant;
use crate::scheme::SignatureScheme;
use crate::types::{DomainTag, SharedKeyPair, ThresholdParams};
use crate::weights::WeightMatrix;
use log::{debug, info};
use rand::{CryptoRng, RngCore};
use rayon::prelude::*;

/// Creates `n` participants, each holding `m` freshly generated raw shares.
pub fn generate_participants<S, R>(
    params: ThresholdParams,
    domain: DomainTag,
    rng: &mut R,
) -> Result<Vec<Participant<S>>>
where
    S: SignatureScheme,
    R: RngCore + CryptoRng,
{
    let participants = (0..params.n() as usize)
        .map(|index| Participant::generate(index, params, domain, &mut *rng))
        .collect::<Result<Vec<_>>>()?;
    info!(
        "generated {} participants with {} raw shares each ({} headroom bits)",
        params.n(),
        params.m(),
        params.headroom_bits()
    );
    Ok(participants)
}

/// Runs phases 1 and 2: derive every shared key pair, then deliver each to its consumer.
pub fn distribute_shared_keys<S: SignatureScheme>(
    participants: &mut [Participant<S>],
    weights: &WeightMatrix,
) -> Result<()> {
    // Step 1: every producer derives its row of shared key pairs.
    let outputs: Vec<Vec<SharedKeyPair<S::PublicKey>>> = participants
        .par_iter()
        .map(|producer| producer.shared_key_pairs(weights))
        .collect::<Result<_>>()?;
    debug!("derived {} rows of shared key pairs", outputs.len());

    // Step 2: deliver pair (producer -> consumer) into the consumer's slot for that producer.
    for (producer, pairs) in outputs.into_iter().enumerate() {
        for (consumer, pair) in pairs.into_iter().enumerate() {
            participants[consumer].collect_shared_key_pair(producer, pair)?;
        }
    }
    info!("shared key exchange complete");
    Ok(())
}

/// Sign-and-verify check of every collected shared key pair.
pub fn check_shared_keys<S: SignatureScheme>(
    participants: &[Participant<S>],
    message_hash: &[u8],
) -> Result<()> {
    let n = participants.len();
    participants.par_iter().try_for_each(|consumer| {
        (0..n).try_for_each(|producer| consumer.check_shared_key_pair(producer, message_hash))
    })?;
    info!("verified {} shared key pairs", n * n);
    Ok(())
}
