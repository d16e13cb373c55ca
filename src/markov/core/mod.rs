//! core — shared HMM data, parameters, trellis machinery, and convergence
//! control.
//!
//! Purpose
//! -------
//! Collect the building blocks the learners are assembled from: the
//! validated training-set container, the model and its topologies, the
//! emission-distribution contract and stock families, log-domain
//! forward/backward trellises, posterior (gamma/ksi) statistics,
//! parameter re-estimation, Viterbi decoding, and convergence/cancellation
//! control.
//!
//! Key behaviors
//! -------------
//! - Define the validated containers ([`TrainingSet`], [`HiddenMarkovModel`])
//!   and configuration types ([`LearnOptions`], [`FitOptions`],
//!   [`Topology`]).
//! - Implement the per-sequence computational kernels: trellis fills
//!   ([`trellis`]), posterior statistics ([`posteriors`]), decoding
//!   ([`decode`]), and in-place re-estimation ([`reestimate`]).
//! - Provide the training-loop state machine ([`ConvergenceMonitor`],
//!   [`CancelToken`], [`MonitorState`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - All probabilities are carried as natural logs with `-∞` as exact
//!   zero; models are validated row-stochastic on construction and kept
//!   so by re-estimation (up to the documented degeneracy guards).
//! - Input validation is front-loaded into the container constructors;
//!   the kernels assume well-formed input and only re-check the
//!   zero-length precondition they cannot survive.
//! - Per-sequence kernels own their scratch exclusively; cross-sequence
//!   parallelism with per-worker [`TrellisBuffers`] is the learners'
//!   concern.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based; `log_transitions[[i, j]]` reads "from i to j".
//! - This module performs no I/O and no logging; progress reporting is a
//!   learner-level callback.
//!
//! Downstream usage
//! ----------------
//! - The learners in [`markov::learners`](super::learners) orchestrate
//!   these pieces; applications usually touch only the re-exports below.
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests for its kernel against
//!   hand-checked or brute-force references; the learner and integration
//!   suites cover multi-iteration behavior.

pub mod convergence;
pub mod data;
pub mod decode;
pub mod emission;
pub mod model;
pub mod options;
pub mod posteriors;
pub mod reestimate;
pub mod topology;
pub mod trellis;

// ---- Re-exports (primary public surface) ----------------------------------
//
// These are the “everyday” types most users need. More specialized items
// (trellis fills, raw statistics, re-estimation) remain under their
// submodules.

pub use self::convergence::{CancelToken, ConvergenceMonitor, MonitorState};
pub use self::data::TrainingSet;
pub use self::decode::viterbi_decode;
pub use self::emission::{DiscreteEmission, EmissionModel, FitOptions, GaussianEmission};
pub use self::model::HiddenMarkovModel;
pub use self::options::LearnOptions;
pub use self::topology::Topology;
pub use self::trellis::TrellisBuffers;
