//! Simulation of an (n, m) threshold multi-signature over BLS12-381.
//!
//! Each of `n` participants holds `m` raw key shares. Folding them under
//! per-participant power weights and exchanging the results gives every
//! participant a point on a shared degree-(m-1) polynomial; any `m` of the
//! resulting signatures recombine, with integer Lagrange weights, into one
//! group signature that is the same for every quorum.
//!
//! ```no_run
//! use threshold_sim::{bls::Bls12381, simulation, SimulationConfig};
//! use rand::rngs::OsRng;
//!
//! let config = SimulationConfig::new(4, 2);
//! let report = simulation::run::<Bls12381, _>(&config, &mut OsRng).unwrap();
//! println!("{} quorums agree on {}", report.combinations, report.final_signature);
//! ```

pub mod accumulate;
pub mod bls;
pub mod config;
pub mod error;
pub mod keygen;
pub mod lagrange;
pub mod participant;
pub mod quorum;
pub mod scheme;
pub mod sign;
pub mod simulation;
pub mod types;
pub mod verify;
pub mod weights;

pub use config::SimulationConfig;
pub use error::{Error, Result};
pub use participant::Participant;
pub use scheme::SignatureScheme;
pub use simulation::{execute, run, Outcome, SimulationReport};
pub use types::{Combination, DomainTag, Fraction, KeyShare, ThresholdParams};
pub use verify::{QuorumPlan, SignatureReconstructor};
pub use weights::WeightMatrix;
