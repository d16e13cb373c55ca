//! Learner configuration, validated at construction.
//!
//! Purpose
//! -------
//! Bundle every knob the iterative learners expose — stopping criteria,
//! mini-batching, random seeding, emission fitting options, and the
//! cooperative cancellation token — into one validated options type, so a
//! learner constructed with a [`LearnOptions`] never has to re-check its
//! configuration mid-loop.
//!
//! Key behaviors
//! -------------
//! - [`LearnOptions::new`] validates the stopping criteria; the `with_*`
//!   builders refine the remaining fields, validating where needed.
//! - Defaults match the common training setup: relative tolerance `1e-5`,
//!   100 iterations, a single convergence pass, one batch (no
//!   mini-batching), unseeded shuffling, default emission fitting.
//!
//! Invariants & assumptions
//! ------------------------
//! - `tolerance` is finite and ≥ 0 (0 disables the tolerance criterion in
//!   practice, leaving the iteration cap in charge).
//! - `max_iterations == 0` means no cap; callers wanting "tolerance only"
//!   combine that with a positive tolerance.
//! - `required_passes ≥ 1` and `batches ≥ 1`.
//!
//! Conventions
//! -----------
//! - `batches` is consumed by the Viterbi learner only; Baum-Welch always
//!   processes the full batch per iteration.
//! - The `cancel` token is shared: keep a clone at the call site to
//!   signal cancellation while `learn` runs elsewhere.
//!
//! Downstream usage
//! ----------------
//! - Learners copy these options at construction and build their
//!   [`ConvergenceMonitor`](super::convergence::ConvergenceMonitor) from
//!   them per `learn` call.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each validation boundary and the default values.
use crate::markov::core::convergence::CancelToken;
use crate::markov::core::emission::FitOptions;
use crate::markov::errors::{HmmError, HmmResult};

/// Configuration for the iterative learners.
///
/// Fields:
/// - `tolerance`: threshold on the objective change (relative by
///   default); finite, ≥ 0.
/// - `max_iterations`: iteration cap; 0 disables the cap.
/// - `required_passes`: consecutive within-tolerance checks required for
///   convergence; ≥ 1.
/// - `relative`: whether the tolerance is relative to the previous
///   objective's magnitude.
/// - `batches`: mini-batch count for the Viterbi learner; ≥ 1, 1 means
///   whole-batch iterations.
/// - `seed`: optional RNG seed for mini-batch shuffling; `None` draws
///   from the thread RNG.
/// - `fit_options`: emission re-estimation options.
/// - `cancel`: shared cooperative cancellation token.
#[derive(Debug, Clone)]
pub struct LearnOptions {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub required_passes: usize,
    pub relative: bool,
    pub batches: usize,
    pub seed: Option<u64>,
    pub fit_options: FitOptions,
    pub cancel: CancelToken,
}

impl LearnOptions {
    /// Construct options with the given stopping criteria and defaults
    /// everywhere else.
    ///
    /// # Errors
    /// - [`HmmError::InvalidTolerance`] for a negative or non-finite
    ///   tolerance.
    pub fn new(tolerance: f64, max_iterations: usize) -> HmmResult<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(HmmError::InvalidTolerance { value: tolerance });
        }
        Ok(Self {
            tolerance,
            max_iterations,
            required_passes: 1,
            relative: true,
            batches: 1,
            seed: None,
            fit_options: FitOptions::default(),
            cancel: CancelToken::new(),
        })
    }

    /// Require `passes` consecutive within-tolerance checks.
    ///
    /// # Errors
    /// - [`HmmError::InvalidRequiredPasses`] when `passes == 0`.
    pub fn with_required_passes(mut self, passes: usize) -> HmmResult<Self> {
        if passes == 0 {
            return Err(HmmError::InvalidRequiredPasses { value: passes });
        }
        self.required_passes = passes;
        Ok(self)
    }

    /// Use an absolute (rather than relative) change criterion.
    pub fn with_absolute_tolerance(mut self) -> Self {
        self.relative = false;
        self
    }

    /// Partition each Viterbi-learning iteration into `batches` random
    /// groups.
    ///
    /// # Errors
    /// - [`HmmError::InvalidBatchCount`] when `batches == 0`.
    pub fn with_batches(mut self, batches: usize) -> HmmResult<Self> {
        if batches == 0 {
            return Err(HmmError::InvalidBatchCount { value: batches });
        }
        self.batches = batches;
        Ok(self)
    }

    /// Seed the mini-batch shuffling RNG for reproducible runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the emission fitting options.
    pub fn with_fit_options(mut self, fit_options: FitOptions) -> Self {
        self.fit_options = fit_options;
        self
    }

    /// Share a cancellation token with the caller.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }
}

impl Default for LearnOptions {
    fn default() -> Self {
        Self::new(1e-5, 100).unwrap()
    }
}
