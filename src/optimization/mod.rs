//! optimization — gradient-based training stack, log-space numerics, and
//! unified error surface.
//!
//! Purpose
//! -------
//! Provide a cohesive optimization layer for gradient-trained sequence
//! models, combining an Argmin-backed log-likelihood optimizer, log-domain
//! numerical primitives, and a single error/result surface. Callers
//! implement a log-likelihood, choose a solver and stopping criteria, and
//! obtain fitted weights and diagnostics without touching backend solver
//! details.
//!
//! Key behaviors
//! -------------
//! - Expose a high-level API for **maximizing log-likelihoods** `ℓ(θ)`
//!   (`loglik_optimizer`), including the choice of solver family
//!   (steepest descent, nonlinear conjugate gradient, L-BFGS) and line
//!   search.
//! - Supply shared log-domain primitives (`numerical_stability`) used
//!   pervasively by the Markov-model and CRF layers: pairwise and sliced
//!   log-sum-exp and in-place log-row normalization.
//! - Normalize configuration issues, numerical failures, and backend solver
//!   errors into a single enum (`errors::OptError`) with a common result
//!   alias (`OptResult<T>`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Optimizers operate on an unconstrained weight vector `θ` and assume
//!   finite entries once validation has passed; invalid states are reported
//!   as `OptError`, not panics.
//! - Log-likelihood implementations treat domain violations (e.g., labels
//!   out of range, empty batches) as recoverable errors surfaced through
//!   the optimization layer.
//!
//! Conventions
//! -----------
//! - All solvers conceptually maximize a log-likelihood `ℓ(θ)` by minimizing
//!   an internal cost `c(θ) = -ℓ(θ)`; user-facing APIs and outcomes are
//!   expressed in terms of `ℓ`.
//! - Vectors and gradients are `ndarray`-based aliases (`Theta`, `Grad`).
//! - Public entrypoints that can fail return `OptResult<T>`; callers never
//!   see raw Argmin errors.
//! - This module and its submodules perform no I/O and no logging.
//!
//! Downstream usage
//! ----------------
//! - The CRF layer implements `LogLikelihood` for its objective and calls
//!   `maximize` with a weight guess, a labeled batch, and `MLEOptions`.
//! - The Markov-model core imports `numerical_stability::logspace` for its
//!   trellis and posterior computations.
//!
//! Testing notes
//! -------------
//! - Unit tests in the submodules cover solver wiring and tolerance
//!   handling (`loglik_optimizer`), the `-∞` algebra of log-sum-exp
//!   (`numerical_stability`), and error conversions (`errors`).
//! - Integration tests exercise end-to-end CRF training through this
//!   surface.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_markov::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::loglik_optimizer::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
