//! loglik_optimizer::types — shared numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Centralize the core numeric types and solver aliases used by the
//! log-likelihood optimizer. By defining these in one place, the rest of
//! the optimization code stays agnostic to `ndarray` and Argmin generics
//! and can evolve more easily if the backend changes.
//!
//! Key behaviors
//! -------------
//! - Define canonical aliases for weight vectors, gradients, and scalar
//!   costs (`Theta`, `Grad`, `Cost`).
//! - Provide a standard map type for Argmin function-evaluation counters
//!   (`FnEvalMap`).
//! - Expose pre-wired solver aliases for the three supported solver
//!   families — L-BFGS, steepest gradient descent, and nonlinear conjugate
//!   gradient — each paired with either line search.
//!
//! Invariants & assumptions
//! ------------------------
//! - All optimizer vectors are `ndarray` containers over `f64`.
//! - `Cost` is a scalar `f64`; higher layers handle the sign flip between
//!   cost and log-likelihood.
//! - The aliases assume Argmin's three-parameter line-search forms
//!   `(Param, Gradient, Float)` as of the pinned Argmin version.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` are treated conceptually as column vectors with
//!   length equal to the number of free weights.
//! - `DEFAULT_LBFGS_MEM` encodes the typical history size for L-BFGS;
//!   callers may override this via per-run options.
//! - The conjugate-gradient aliases fix the Polak–Ribière beta update; a
//!   different update rule would get its own alias rather than a runtime
//!   switch.
//!
//! Downstream usage
//! ----------------
//! - Other optimizer modules import these aliases instead of referring
//!   directly to `ndarray` or Argmin generics.
//! - [`builders`](super::builders) constructs concrete solver instances
//!   from these aliases based on the configured solver kind and line
//!   search.
//!
//! Testing notes
//! -------------
//! - This module only defines type aliases and constants; correctness is
//!   exercised by the builder and runner tests that instantiate them.
use argmin::solver::{
    conjugategradient::{NonlinearConjugateGradient, beta::PolakRibiere},
    gradientdescent::SteepestDescent,
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::Array1;
use std::collections::HashMap;

/// Weight vector `θ` for log-likelihood optimization.
///
/// Alias for `ndarray::Array1<f64>`, used as the canonical parameter type
/// throughout the optimizer.
pub type Theta = Array1<f64>;

/// Gradient vector `∇ℓ(θ)` or `∇c(θ)` for optimization.
///
/// Alias for `ndarray::Array1<f64>`, matching the shape of `Theta`.
pub type Grad = Array1<f64>;

/// Scalar objective value used by the optimizer.
///
/// In this crate, this is the cost `c(θ) = -ℓ(θ)` derived from a
/// log-likelihood `ℓ(θ)`.
pub type Cost = f64;

/// Function-evaluation counters as reported by the solver.
///
/// Maps human-readable counter names (e.g., `"cost_count"`) to counts.
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Hager–Zhang line search specialized to this crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search specialized to this crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS solver wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS solver wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Steepest gradient descent wired to the Hager–Zhang line search.
pub type SteepestHagerZhang = SteepestDescent<HagerZhangLS>;

/// Steepest gradient descent wired to the More–Thuente line search.
pub type SteepestMoreThuente = SteepestDescent<MoreThuenteLS>;

/// Nonlinear conjugate gradient (Polak–Ribière) with Hager–Zhang line search.
pub type NcgHagerZhang = NonlinearConjugateGradient<Theta, HagerZhangLS, PolakRibiere, Cost>;

/// Nonlinear conjugate gradient (Polak–Ribière) with More–Thuente line search.
pub type NcgMoreThuente = NonlinearConjugateGradient<Theta, MoreThuenteLS, PolakRibiere, Cost>;
