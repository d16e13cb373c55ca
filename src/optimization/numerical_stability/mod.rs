//! numerical_stability — log-domain primitives shared across the crate.
//!
//! Purpose
//! -------
//! Collect the numerically stable log-space arithmetic that every layer of
//! the sequence-model stack relies on: pairwise and sliced log-sum-exp and
//! in-place normalization of log-probability rows. Centralizing these
//! primitives keeps the trellis, posterior, re-estimation, and CRF code
//! free of ad-hoc `exp`/`ln` juggling and guarantees one consistent
//! treatment of `-∞` (probability zero) everywhere.
//!
//! Key behaviors
//! -------------
//! - Provide [`log_sum_exp_pair`] and [`log_sum_exp`] computing
//!   `ln(Σ exp(xᵢ))` via the max-shift trick, without overflow for large
//!   inputs and without producing NaN for `-∞` inputs.
//! - Provide [`log_normalize`], which shifts a log-probability row so it
//!   sums to one in probability space, leaving all-`-∞` rows untouched.
//!
//! Invariants & assumptions
//! ------------------------
//! - `-∞` encodes exact probability zero; `log_sum_exp_pair(-∞, x) == x`
//!   and `log_sum_exp(&[-∞, …, -∞]) == -∞`. No valid input produces NaN.
//! - Inputs are assumed to be non-NaN; NaN handling belongs to the callers
//!   that clamp degenerate weights (see the re-estimation layer).
//!
//! Conventions
//! -----------
//! - All routines operate on scalars and plain `f64` slices and perform no
//!   heap allocation, no I/O, and no logging; they are safe to call inside
//!   the tightest trellis loops.
//!
//! Downstream usage
//! ----------------
//! - The Markov core uses these for the forward/backward recurrences,
//!   posterior (gamma/ksi) normalization, and parameter re-estimation.
//! - The CRF layer uses them for partition-function and marginal
//!   computations.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`logspace`] compare against extended-precision naïve
//!   evaluation on safe grids and pin down the `-∞` algebra explicitly.

pub mod logspace;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::logspace::{LOG_ZERO, log_normalize, log_sum_exp, log_sum_exp_pair};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::logspace::{LOG_ZERO, log_normalize, log_sum_exp, log_sum_exp_pair};
}
