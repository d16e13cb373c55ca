//! crf — linear-chain conditional random fields trained by gradient
//! methods.
//!
//! Purpose
//! -------
//! Provide the discriminative counterpart to the [`markov`](crate::markov)
//! stack: a linear-chain CRF over discrete observation symbols, its
//! mean-log-likelihood objective with analytic gradient, and a trainer
//! that drives the crate's Argmin-backed optimizer
//! ([`loglik_optimizer`](crate::optimization::loglik_optimizer)) with a
//! choice of solver family and line search.
//!
//! Key behaviors
//! -------------
//! - [`LinearChainCrf`] owns the weight vector (documented fixed layout)
//!   and exposes scoring, conditional log-likelihood, and Viterbi
//!   decoding.
//! - [`CrfObjective`] implements the optimizer's `LogLikelihood` trait:
//!   the objective equals the batch mean conditional log-likelihood (so
//!   the minimized cost is the negative average log-likelihood) and the
//!   gradient is the exact empirical-minus-expected feature counts,
//!   computed with the same forward/backward machinery the HMM side
//!   uses.
//! - [`CrfTrainer`] selects the solver, runs the optimization, installs
//!   the result, and degrades gracefully on solver-runtime failures
//!   (best weights so far, never an exception).
//!
//! Invariants & assumptions
//! ------------------------
//! - Objective and gradient are defined for **any finite weight
//!   vector**; no parameter-domain restriction exists beyond what the
//!   optimizer enforces.
//! - Batches are validated once at construction ([`CrfBatch`]); training
//!   never starts on malformed data.
//!
//! Testing notes
//! -------------
//! - The gradient-vs-finite-differences check in [`objective`] is the
//!   load-bearing test; trainer tests cover all three solver families.

pub mod errors;
pub mod model;
pub mod objective;
pub mod trainer;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{CrfError, CrfResult};
pub use self::model::LinearChainCrf;
pub use self::objective::{CrfBatch, CrfObjective, LabeledSequence};
pub use self::trainer::{CrfFit, CrfTrainer};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{CrfError, CrfResult};
    pub use super::model::LinearChainCrf;
    pub use super::objective::{CrfBatch, CrfObjective, LabeledSequence};
    pub use super::trainer::{CrfFit, CrfTrainer};
}
