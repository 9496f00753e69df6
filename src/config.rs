//! Run configuration.
//!
//! The threshold parameters, the domain tag and the message hash are the only
//! externally supplied inputs of a run.

use crate::error::{Error, Result};
use crate::scheme::SignatureScheme;
use crate::types::{DomainTag, ThresholdParams};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub n: u32,
    pub m: u32,
    pub domain_tag: DomainTag,
    #[serde(with = "hex")]
    pub message_hash: Vec<u8>,
    /// Sign-and-verify every collected shared key pair after the exchange.
    pub verify_shared_keys: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            n: 7,
            m: 3,
            domain_tag: DomainTag::ONE,
            message_hash: vec![0x56; 32],
            verify_shared_keys: false,
        }
    }
}

impl SimulationConfig {
    pub fn new(n: u32, m: u32) -> Self {
        Self {
            n,
            m,
            ..Self::default()
        }
    }

    pub fn params(&self) -> Result<ThresholdParams> {
        ThresholdParams::new(self.n, self.m)
    }

    /// Checks the parameters and the message hash length expected by `S`.
    pub fn validate<S: SignatureScheme>(&self) -> Result<ThresholdParams> {
        if self.message_hash.len() != S::HASH_LENGTH {
            return Err(Error::InvalidParameters(format!(
                "message hash must be {} bytes, got {}",
                S::HASH_LENGTH,
                self.message_hash.len()
            )));
        }
        self.params()
    }
}
