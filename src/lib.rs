//! Prover-side proof generation for CL-signature anonymous credentials.
//!
//! The crate builds primary proofs in two phases: `init_proof` samples
//! blinding randomness and commits to intermediate values, an externally
//! computed challenge binds the commitments, and `finalize_proof` produces
//! the Sigma-protocol responses. See [`cl::prover`] for the entry points.

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Macros from utils are used by the other modules, so it must come first.
#[macro_use]
pub mod utils;

pub mod bn;
pub mod cl;
pub mod errors;
