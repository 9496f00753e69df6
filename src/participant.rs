//! A simulated signer.
//!
//! Each participant owns `m` raw key shares. It folds them under every row of
//! the weight matrix to produce one shared key pair per consumer, collects the
//! shared key pairs addressed to it, and signs with the unit-weight fold of
//! everything it collected.

use crate::accumulate::{sum, weighted_accumulate};
use crate::error::{Error, Result};
use crate::scheme::SignatureScheme;
use crate::types::{AggregateKeyPair, DomainTag, KeyShare, SharedKeyPair, ThresholdParams};
use crate::weights::WeightMatrix;
use log::{debug, warn};
use rand::{CryptoRng, RngCore};

pub struct Participant<S: SignatureScheme> {
    index: usize,
    params: ThresholdParams,
    domain: DomainTag,
    shares: Vec<KeyShare>,
    collected: Vec<Option<SharedKeyPair<S::PublicKey>>>,
    peer_public_keys: Vec<Option<S::PublicKey>>,
    aggregate: Option<AggregateKeyPair<S::PublicKey>>,
}

impl<S: SignatureScheme> Participant<S> {
    /// Creates participant `index` (0-based) from explicit raw shares.
    pub fn new(
        index: usize,
        params: ThresholdParams,
        domain: DomainTag,
        shares: Vec<KeyShare>,
    ) -> Result<Self> {
        let n = params.n() as usize;
        if index >= n {
            return Err(Error::UnknownParticipant(index));
        }
        if shares.len() != params.m() as usize {
            return Err(Error::InvalidParameters(format!(
                "participant {} needs {} raw shares, got {}",
                index,
                params.m(),
                shares.len()
            )));
        }
        if let Some(bad) = shares.iter().find(|s| s.len() != S::PRIVATE_KEY_LENGTH) {
            return Err(Error::KeyLengthMismatch {
                expected: S::PRIVATE_KEY_LENGTH,
                actual: bad.len(),
            });
        }
        Ok(Self {
            index,
            params,
            domain,
            shares,
            collected: vec![None; n],
            peer_public_keys: vec![None; n],
            aggregate: None,
        })
    }

    /// Creates participant `index` with `m` freshly generated raw shares.
    pub fn generate<R: RngCore + CryptoRng>(
        index: usize,
        params: ThresholdParams,
        domain: DomainTag,
        rng: &mut R,
    ) -> Result<Self> {
        let headroom = params.headroom_bits();
        let shares = (0..params.m())
            .map(|_| S::generate_key(&mut *rng, headroom))
            .collect::<Result<Vec<_>>>()?;
        Self::new(index, params, domain, shares)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn domain(&self) -> &DomainTag {
        &self.domain
    }

    pub fn params(&self) -> &ThresholdParams {
        &self.params
    }

    /// One shared private key per consumer: raw shares folded under each weight row.
    pub fn generate_shared_private_keys(&self, weights: &WeightMatrix) -> Result<Vec<KeyShare>> {
        weights
            .rows()
            .iter()
            .map(|row| {
                weighted_accumulate(&self.shares, row)?.ok_or_else(|| {
                    Error::InvalidParameters("weight row does not match share count".to_string())
                })
            })
            .collect()
    }

    /// Published public keys, one per raw share.
    pub fn derive_public_keys(&self) -> Result<Vec<S::PublicKey>> {
        self.shares.iter().map(S::derive_public_key).collect()
    }

    /// One shared public key per consumer, folded from the published keys
    /// under the same weight rows as the private side.
    pub fn derive_shared_public_keys(&self, weights: &WeightMatrix) -> Result<Vec<S::PublicKey>> {
        let published = self.derive_public_keys()?;
        (0..weights.len())
            .map(|i| S::aggregate_public_keys(&published, &weights.signed_row(i)?))
            .collect()
    }

    /// Shared key pairs for every consumer, indexed by consumer.
    pub fn shared_key_pairs(
        &self,
        weights: &WeightMatrix,
    ) -> Result<Vec<SharedKeyPair<S::PublicKey>>> {
        let private_keys = self.generate_shared_private_keys(weights)?;
        let public_keys = self.derive_shared_public_keys(weights)?;
        Ok(private_keys
            .into_iter()
            .zip(public_keys)
            .map(|(private_key, public_key)| SharedKeyPair {
                private_key,
                public_key,
            })
            .collect())
    }

    /// Stores the shared key pair from `producer`. A filled slot is left untouched.
    pub fn collect_shared_key_pair(
        &mut self,
        producer: usize,
        pair: SharedKeyPair<S::PublicKey>,
    ) -> Result<()> {
        let slot = self
            .collected
            .get_mut(producer)
            .ok_or(Error::UnknownParticipant(producer))?;
        if slot.is_some() {
            warn!(
                "participant {} ignored a second shared key pair from {}",
                self.index, producer
            );
            return Ok(());
        }
        *slot = Some(pair);
        Ok(())
    }

    /// Stores `peer`'s aggregate public key. A filled slot is left untouched.
    pub fn collect_peer_public_key(&mut self, peer: usize, public_key: S::PublicKey) -> Result<()> {
        let slot = self
            .peer_public_keys
            .get_mut(peer)
            .ok_or(Error::UnknownParticipant(peer))?;
        if slot.is_none() {
            *slot = Some(public_key);
        }
        Ok(())
    }

    pub fn peer_public_key(&self, peer: usize) -> Option<&S::PublicKey> {
        self.peer_public_keys.get(peer).and_then(Option::as_ref)
    }

    /// Signs with the shared key collected from `producer` and verifies it
    /// against the matching shared public key.
    pub fn check_shared_key_pair(&self, producer: usize, message_hash: &[u8]) -> Result<()> {
        let pair = self.collected_pair(producer)?;
        let signature = S::sign(&pair.private_key, message_hash, &self.domain)?;
        if !S::verify(&pair.public_key, message_hash, &signature, &self.domain) {
            return Err(Error::SharedKeyVerificationFailed {
                producer,
                consumer: self.index,
            });
        }
        Ok(())
    }

    fn collected_pair(&self, producer: usize) -> Result<&SharedKeyPair<S::PublicKey>> {
        self.collected
            .get(producer)
            .ok_or(Error::UnknownParticipant(producer))?
            .as_ref()
            .ok_or(Error::MissingSharedKey {
                participant: self.index,
                producer,
            })
    }

    /// Unit-weight fold of all collected shared key pairs, computed once.
    pub fn aggregate_key_pair(&mut self) -> Result<&AggregateKeyPair<S::PublicKey>> {
        if self.aggregate.is_none() {
            let pairs = (0..self.collected.len())
                .map(|producer| self.collected_pair(producer))
                .collect::<Result<Vec<_>>>()?;

            let private_keys: Vec<KeyShare> = pairs.iter().map(|p| p.private_key.clone()).collect();
            let public_keys: Vec<S::PublicKey> = pairs.iter().map(|p| p.public_key.clone()).collect();

            let private_key = sum(&private_keys)?.ok_or_else(|| {
                Error::InvalidParameters("no shared keys collected".to_string())
            })?;
            let public_key = S::aggregate_public_keys(&public_keys, &vec![1; public_keys.len()])?;
            debug!("participant {} derived its aggregate key pair", self.index);
            self.aggregate = Some(AggregateKeyPair {
                private_key,
                public_key,
            });
        }
        self.aggregate
            .as_ref()
            .ok_or_else(|| Error::InvalidParameters("aggregate key pair unavailable".to_string()))
    }

    /// Signs `message_hash` with the aggregate private key and checks the
    /// result against the aggregate public key.
    pub fn sign(&mut self, message_hash: &[u8]) -> Result<S::Signature> {
        let index = self.index;
        let domain = self.domain;
        let pair = self.aggregate_key_pair()?;
        let signature = S::sign(&pair.private_key, message_hash, &domain)?;
        if !S::verify(&pair.public_key, message_hash, &signature, &domain) {
            return Err(Error::SelfVerificationFailed { participant: index });
        }
        Ok(signature)
    }
}
