//! markov — hidden-Markov-model training stack: core numerics, learners,
//! and errors.
//!
//! Purpose
//! -------
//! Provide a cohesive HMM layer bundling the model and training-data
//! containers, log-domain trellis and posterior kernels, closed-form
//! re-estimation, convergence control, and the two learner
//! orchestrations (Baum-Welch and Viterbi/segmental) under a single
//! namespace. This is the surface most consumers should depend on.
//!
//! Key behaviors
//! -------------
//! - Collect the numerical and structural building blocks in [`core`]:
//!   training data, topologies, the emission contract and stock
//!   families, trellises, posteriors, re-estimation, decoding, options,
//!   and convergence.
//! - Expose the user-facing training loops in [`learners`], both with
//!   the single `learn(&TrainingSet) -> &HiddenMarkovModel` entry point,
//!   per-iteration progress callbacks, and cooperative cancellation.
//! - Centralize HMM-specific error types in [`errors`] (`HmmError`,
//!   `ParamError`, `EmissionError` and their `Result` aliases) so
//!   callers see one uniform error surface.
//!
//! Invariants & assumptions
//! ------------------------
//! - Training data arrive in validated [`TrainingSet`] instances: no
//!   empty batch, no zero-length sequence, weights matched and finite.
//! - Model parameters are log-space, row-stochastic within `1e-6`, and
//!   NaN-free; `-∞` marks structural zeros that training preserves.
//! - A model is owned by one learner at a time; convergence counters
//!   belong to the learner, never the model.
//! - Numerical degeneracy mid-training (unreachable states, underflowed
//!   weights) is clamped to zero mass and training continues; validation
//!   problems fail before any computation starts.
//!
//! Conventions
//! -----------
//! - The stack performs no I/O and no logging; progress reporting is an
//!   injected callback on the learners.
//! - Indexing is 0-based; `log_transitions[[i, j]]` reads "from i to j".
//!
//! Downstream usage
//! ----------------
//! - Typical flow: build a [`TrainingSet`]; construct a learner via
//!   `from_topology` (ergodic or left-to-right) with an emission
//!   factory; call `learn`; read the model, the `LearnSummary`, and use
//!   `log_likelihood` / `decode` / `posterior` for inference.
//! - Python bindings import from this module and rely on the
//!   `HmmError → PyErr` conversion defined in [`errors`].
//!
//! Testing notes
//! -------------
//! - Unit tests live with each kernel in [`core`] and each learner in
//!   [`learners`]; crate-level integration tests drive the end-to-end
//!   training scenarios.

pub mod core;
pub mod errors;
pub mod learners;

// ---- Re-exports (primary public surface) ----------------------------------
//
// These are the “everyday” types most users need. More specialized items
// (trellis fills, posterior statistics, re-estimation) remain under their
// respective submodules.

pub use self::core::{
    CancelToken, ConvergenceMonitor, DiscreteEmission, EmissionModel, FitOptions,
    GaussianEmission, HiddenMarkovModel, LearnOptions, MonitorState, Topology, TrainingSet,
};

pub use self::errors::{
    EmissionError, EmissionResult, HmmError, HmmResult, ParamError, ParamResult,
};

pub use self::learners::{
    BaumWelchLearner, IterationReport, LearnSummary, ProgressCallback, ViterbiLearner,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::core::{
        CancelToken, DiscreteEmission, EmissionModel, FitOptions, GaussianEmission,
        HiddenMarkovModel, LearnOptions, MonitorState, Topology, TrainingSet,
    };
    pub use super::errors::{HmmError, HmmResult};
    pub use super::learners::{BaumWelchLearner, LearnSummary, ViterbiLearner};
}
