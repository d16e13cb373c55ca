//! learners — training orchestrations over the Markov core.
//!
//! Purpose
//! -------
//! House the user-facing training loops: expectation-maximization
//! ([`BaumWelchLearner`]) and segmental/hard-assignment learning
//! ([`ViterbiLearner`]). Both expose the same single entry point —
//! `learn(&TrainingSet) -> &HiddenMarkovModel` — and share the
//! convergence, cancellation, and progress-reporting machinery.
//!
//! Key behaviors
//! -------------
//! - One learner exclusively owns its model for the duration of training;
//!   the model is mutated in place between iterations and borrowed out
//!   (or moved out via `into_model`) afterwards.
//! - Progress is reported through an injected callback invoked once per
//!   completed iteration with an [`IterationReport`]; the callback is
//!   observational only and cannot influence the loop (stop training via
//!   the [`CancelToken`](crate::markov::core::CancelToken) instead).
//! - After `learn` returns, a [`LearnSummary`] records the iteration
//!   count, final objective, termination state, and the full objective
//!   history.
//!
//! Conventions
//! -----------
//! - The iteration objective is the batch **mean** per-sequence
//!   log-likelihood (Baum-Welch) or mean best-path log-probability
//!   (Viterbi learning).
//! - Incremental (single-sequence online) learning is not supported by
//!   either learner and reports `UnsupportedOperation` rather than doing
//!   the wrong thing quietly.
//!
//! Testing notes
//! -------------
//! - Learner unit tests cover loop mechanics (monotonicity, termination
//!   states, callbacks, cancellation); the integration suite covers the
//!   end-to-end scenarios.

pub mod baum_welch;
pub mod viterbi;

use crate::markov::core::convergence::MonitorState;

/// Per-iteration progress snapshot handed to an injected callback.
///
/// `change` is the monitor's scaled `|Δ|` (infinite on the first
/// iteration); `state` is the monitor state *after* observing this
/// iteration's objective.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationReport {
    pub iteration: usize,
    pub objective: f64,
    pub change: f64,
    pub state: MonitorState,
}

/// Injected progress observer, invoked once per completed iteration.
pub type ProgressCallback = Box<dyn FnMut(&IterationReport) + Send>;

/// Result summary of the most recent `learn` call.
///
/// `history` holds the objective of every iteration in order;
/// `objective` duplicates its last entry for convenience.
#[derive(Debug, Clone, PartialEq)]
pub struct LearnSummary {
    pub iterations: usize,
    pub objective: f64,
    pub state: MonitorState,
    pub history: Vec<f64>,
}

pub use self::baum_welch::BaumWelchLearner;
pub use self::viterbi::ViterbiLearner;
