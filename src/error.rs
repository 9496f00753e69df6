//! Error taxonomy for the threshold signature simulation.
//!
//! Every failure aborts the run: the arithmetic is deterministic, so a retry
//! would reproduce the same error.

use thiserror::Error;

/// Errors raised while deriving keys, signing or reconstructing.
#[derive(Debug, Error)]
pub enum Error {
    /// n = 0, m = 0, m > n, or parameters too large for the integer widths in use.
    #[error("invalid threshold parameters: {0}")]
    InvalidParameters(String),

    /// Weighted accumulation carried past the most-significant byte.
    #[error("private key exceeds limit: weighted accumulation overflowed the key width")]
    KeyOverflow,

    /// A participant's signature did not verify against its own aggregate public key.
    #[error("aggregate key verification failed for participant {participant}")]
    SelfVerificationFailed { participant: usize },

    /// Two quorums reconstructed different final signatures.
    #[error("final signature of combination {other} differs from combination {first}")]
    ReconstructionMismatch { first: usize, other: usize },

    /// The reconstructed signature failed against the full aggregate public key.
    #[error("final signature verification failed")]
    FinalVerificationFailed,

    #[error("shared key pair from participant {producer} failed verification at participant {consumer}")]
    SharedKeyVerificationFailed { producer: usize, consumer: usize },

    #[error("signature of participant {participant} does not match its aggregate public key")]
    PartialSignatureInvalid { participant: usize },

    #[error("participant {participant} has not collected a shared key from participant {producer}")]
    MissingSharedKey { participant: usize, producer: usize },

    #[error("unknown participant index {0}")]
    UnknownParticipant(usize),

    #[error("key share length mismatch: expected {expected} bytes, got {actual}")]
    KeyLengthMismatch { expected: usize, actual: usize },

    /// An integer weight or LCM does not fit the signed weight type.
    #[error("integer weight overflow")]
    WeightOverflow,

    /// The primitive rejected an aggregation request.
    #[error("aggregation failed: {0}")]
    Aggregation(String),

    #[error("invalid encoding: {0}")]
    InvalidEncoding(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
