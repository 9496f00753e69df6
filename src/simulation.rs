//! End-to-end run of the threshold scheme.

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::keygen::{check_shared_keys, distribute_shared_keys, generate_participants};
use crate::participant::Participant;
use crate::scheme::SignatureScheme;
use crate::sign::{distribute_aggregate_public_keys, sign_all};
use crate::types::DomainTag;
use crate::verify::{QuorumPlan, SignatureReconstructor};
use crate::weights::WeightMatrix;
use log::info;
use rand::{CryptoRng, RngCore};
use serde::Serialize;

/// Everything a run produced, for callers that want more than the report.
pub struct Outcome<S: SignatureScheme> {
    pub participants: Vec<Participant<S>>,
    pub weights: WeightMatrix,
    pub plan: QuorumPlan,
    /// Per-participant signatures, indexed by participant.
    pub signatures: Vec<S::Signature>,
    /// Each participant's first published public key.
    pub published: Vec<S::PublicKey>,
    pub final_signature: S::Signature,
    pub reference_public_key: S::PublicKey,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub n: u32,
    pub m: u32,
    pub domain_tag: DomainTag,
    pub combinations: usize,
    pub overall_lcm: u64,
    pub final_signature: String,
    pub reference_public_key: String,
}

impl SimulationReport {
    pub fn from_outcome<S: SignatureScheme>(config: &SimulationConfig, outcome: &Outcome<S>) -> Self {
        Self {
            n: config.n,
            m: config.m,
            domain_tag: config.domain_tag,
            combinations: outcome.plan.len(),
            overall_lcm: outcome.plan.overall_lcm,
            final_signature: hex::encode(S::signature_bytes(&outcome.final_signature)),
            reference_public_key: hex::encode(S::public_key_bytes(&outcome.reference_public_key)),
        }
    }
}

/// Runs key setup, exchange, signing, reconstruction over every quorum, and
/// the final verification.
pub fn execute<S, R>(config: &SimulationConfig, rng: &mut R) -> Result<Outcome<S>>
where
    S: SignatureScheme,
    R: RngCore + CryptoRng,
{
    let params = config.validate::<S>()?;
    let hash = config.message_hash.as_slice();
    let domain = config.domain_tag;
    info!("starting ({}, {}) threshold run", params.n(), params.m());

    let weights = WeightMatrix::new(&params)?;
    let plan = QuorumPlan::new(&params)?;

    let mut participants = generate_participants::<S, R>(params, domain, rng)?;
    distribute_shared_keys(&mut participants, &weights)?;
    if config.verify_shared_keys {
        check_shared_keys(&participants, hash)?;
    }

    let signatures = sign_all(&mut participants, hash)?;
    let aggregate_keys = distribute_aggregate_public_keys(&mut participants)?;

    let reconstructor = SignatureReconstructor::<S>::new(&plan, hash, domain);
    reconstructor.check_partials(&signatures, &aggregate_keys)?;
    let final_signature = reconstructor.reconstruct(&signatures)?;

    let published = participants
        .iter()
        .map(|p| {
            p.derive_public_keys()?
                .into_iter()
                .next()
                .ok_or_else(|| Error::InvalidParameters("participant has no shares".to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    let reference_public_key = reconstructor.reference_public_key(&published)?;
    reconstructor.verify_final(&final_signature, &reference_public_key)?;

    Ok(Outcome {
        participants,
        weights,
        plan,
        signatures,
        published,
        final_signature,
        reference_public_key,
    })
}

/// Runs the scheme and summarises the result.
pub fn run<S, R>(config: &SimulationConfig, rng: &mut R) -> Result<SimulationReport>
where
    S: SignatureScheme,
    R: RngCore + CryptoRng,
{
    let outcome = execute::<S, R>(config, rng)?;
    Ok(SimulationReport::from_outcome(config, &outcome))
}
