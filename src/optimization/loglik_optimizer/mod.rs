//! loglik_optimizer — argmin-powered log-likelihood maximization.
//!
//! Purpose
//! -------
//! Provide a high-level, Argmin-backed optimization layer for **maximizing
//! log-likelihoods** `ℓ(θ)`. Callers implement a single trait,
//! [`LogLikelihood`], and invoke [`maximize`] to run the configured solver
//! family (steepest descent, nonlinear conjugate gradient, or L-BFGS) with
//! a configurable line search, tolerances, and finite-difference fallbacks.
//!
//! Key behaviors
//! -------------
//! - Convert user-supplied log-likelihoods `ℓ(θ)` into Argmin-compatible
//!   cost functions `c(θ) = -ℓ(θ)` via [`adapter::ArgMinAdapter`].
//! - Expose a single user-facing entrypoint [`maximize`] that:
//!   - validates the initial guess with [`LogLikelihood::check`],
//!   - selects a solver via [`builders`] based on
//!     [`traits::SolverKind`] and [`traits::LineSearcher`],
//!   - executes the solver via [`run::run_solver`], and
//!   - normalizes results into an [`OptimOutcome`].
//! - Provide robust finite-difference helpers in [`finite_diff`] for
//!   gradients when analytic derivatives are missing, with post-hoc
//!   validation and error capture.
//! - Centralize optimizer configuration ([`Tolerances`], [`MLEOptions`])
//!   and validation logic ([`validation`]) so downstream code can assume
//!   sane, finite inputs.
//!
//! Invariants & assumptions
//! ------------------------
//! - The optimizer **always maximizes** a log-likelihood `ℓ(θ)` by
//!   minimizing a cost `c(θ) = -ℓ(θ)`; user code implements `ℓ(θ)` and
//!   `∇ℓ(θ)` (when available), **never** the cost directly.
//! - [`LogLikelihood::value`] and [`LogLikelihood::grad`] must treat
//!   invalid inputs as recoverable [`OptError`](super::errors::OptError)
//!   values, not panics.
//! - Vectors use the canonical aliases [`Theta`] and [`Grad`]; all are
//!   assumed finite whenever optimization proceeds.
//!
//! Conventions
//! -----------
//! - Weights live in an unconstrained optimizer space as [`Theta`]
//!   (`Array1<f64>`); the CRF layer's weight layout is documented there.
//! - Gradients exposed by [`LogLikelihood::grad`] are for the
//!   log-likelihood (`∇ℓ(θ)`); the adapter flips signs to obtain the cost
//!   gradient.
//! - Errors bubble up as `OptResult<T>` / `OptError`; this module and its
//!   children never intentionally panic or use `unsafe`.
//!
//! Downstream usage
//! ----------------
//! - The CRF objective implements [`LogLikelihood`] and its trainer calls
//!   [`maximize`] with a weight guess, a labeled batch, and an
//!   [`MLEOptions`] configuration.
//!
//! Testing notes
//! -------------
//! - Unit tests in submodules cover sign conventions and gradient handling
//!   in [`adapter`], solver construction in [`builders`],
//!   finite-difference behavior in [`finite_diff`], validation in
//!   [`validation`], and configuration/outcome invariants in [`traits`];
//!   [`api`] runs a toy concave objective through every solver family.
//! - Integration tests exercise [`maximize`] on the CRF objective.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{
    LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, SolverKind, Tolerances,
};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, FnEvalMap, Grad, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_markov::optimization::loglik_optimizer::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::maximize;
    pub use super::traits::{
        LineSearcher, LogLikelihood, MLEOptions, OptimOutcome, SolverKind, Tolerances,
    };
    pub use super::types::{Cost, Grad, Theta};
}
