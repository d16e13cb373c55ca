//! Baum-Welch (expectation-maximization) learning.
//!
//! Purpose
//! -------
//! Fit a hidden Markov model to a batch of observation sequences by
//! iterating the forward-backward E-step and the closed-form M-step until
//! the batch mean log-likelihood converges, the iteration budget runs
//! out, or the caller cancels.
//!
//! Key behaviors
//! -------------
//! - Each iteration computes per-sequence posterior statistics
//!   (parallelizable across sequences — every worker owns its trellis
//!   buffers), reduces the mean log-likelihood, and feeds the
//!   convergence monitor.
//! - The loop stops **before** applying the terminating iteration's
//!   M-step: the final E-step only measures convergence, so the returned
//!   model always reflects the last fully-completed M-step.
//! - EM monotonicity: the objective history is non-decreasing up to
//!   floating-point noise; this is the learner's core tested property.
//!
//! Invariants & assumptions
//! ------------------------
//! - The training set is validated at construction; by the time `learn`
//!   runs there is no empty batch and no zero-length sequence, so no
//!   parameter is ever mutated on invalid input.
//! - Under a correct [`EmissionModel`] implementation the returned model
//!   never contains NaN parameters (debug-asserted after training).
//!
//! Conventions
//! -----------
//! - Cancellation is polled between iterations; an in-flight batch
//!   E-step always completes.
//!
//! Downstream usage
//! ----------------
//! - Construct with an existing model or from a topology plus emission
//!   factory, call `learn`, then read the model and the
//!   [`LearnSummary`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover monotonicity, termination states, the progress
//!   callback, cancellation, and the unsupported-incremental error; the
//!   integration suite covers the end-to-end two-symbol scenario.
use crate::markov::core::convergence::{ConvergenceMonitor, MonitorState};
use crate::markov::core::data::TrainingSet;
use crate::markov::core::emission::EmissionModel;
use crate::markov::core::model::HiddenMarkovModel;
use crate::markov::core::options::LearnOptions;
use crate::markov::core::posteriors::{SequenceStatistics, compute_statistics};
use crate::markov::core::reestimate::reestimate_parameters;
use crate::markov::core::topology::Topology;
use crate::markov::core::trellis::TrellisBuffers;
use crate::markov::errors::{HmmError, HmmResult, ParamResult};
use crate::markov::learners::{IterationReport, LearnSummary, ProgressCallback};

/// Expectation-maximization trainer owning its model.
///
/// See the module docs for loop semantics. The learner exclusively owns
/// and mutates the model during `learn`; convergence state lives here,
/// never on the model.
pub struct BaumWelchLearner<E: EmissionModel> {
    pub options: LearnOptions,
    model: HiddenMarkovModel<E>,
    summary: Option<LearnSummary>,
    progress: Option<ProgressCallback>,
}

impl<E: EmissionModel> std::fmt::Debug for BaumWelchLearner<E>
where
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaumWelchLearner")
            .field("options", &self.options)
            .field("model", &self.model)
            .field("summary", &self.summary)
            .field("progress", &self.progress.as_ref().map(|_| "FnMut(..)"))
            .finish()
    }
}

impl<E: EmissionModel> BaumWelchLearner<E> {
    /// Train an existing model (e.g., a warm start or a hand-seeded
    /// initialization).
    pub fn new(model: HiddenMarkovModel<E>, options: LearnOptions) -> Self {
        Self { options, model, summary: None, progress: None }
    }

    /// Construct the model from a topology and per-state emission factory,
    /// then wrap it in a learner.
    ///
    /// # Errors
    /// - Propagates topology/parameter errors (e.g., zero states).
    pub fn from_topology(
        topology: Topology, n_states: usize, emission_factory: impl FnMut(usize) -> E,
        options: LearnOptions,
    ) -> ParamResult<Self> {
        let model = HiddenMarkovModel::from_topology(topology, n_states, emission_factory)?;
        Ok(Self::new(model, options))
    }

    /// Install a progress callback invoked once per completed iteration.
    pub fn with_progress(
        mut self, callback: impl FnMut(&IterationReport) + Send + 'static,
    ) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    /// The learner's model (last completed M-step after `learn`).
    pub fn model(&self) -> &HiddenMarkovModel<E> {
        &self.model
    }

    /// Consume the learner, keeping the trained model.
    pub fn into_model(self) -> HiddenMarkovModel<E> {
        self.model
    }

    /// Summary of the most recent `learn` call, if any.
    pub fn summary(&self) -> Option<&LearnSummary> {
        self.summary.as_ref()
    }

    /// Incremental (single-sequence online) learning is not supported.
    ///
    /// Baum-Welch re-estimates from whole-batch statistics; feeding one
    /// sequence at a time would silently optimize a different objective.
    ///
    /// # Errors
    /// Always returns [`HmmError::UnsupportedOperation`].
    pub fn learn_incremental(&mut self, _sequence: &[E::Observation]) -> HmmResult<()> {
        Err(HmmError::UnsupportedOperation {
            operation: "incremental learning",
            reason: "Baum-Welch requires whole-batch statistics; collect sequences into a \
                     TrainingSet and call learn.",
        })
    }
}

impl<E> BaumWelchLearner<E>
where
    E: EmissionModel + Sync,
    E::Observation: Clone + Sync,
{
    /// Fit the model to the training set.
    ///
    /// Runs E-step → convergence check → M-step until the monitor leaves
    /// `Running`; see the module docs for the final-iteration rule. The
    /// returned reference is the learner's model after the last completed
    /// M-step; the same model stays available through
    /// [`model`](Self::model) and [`into_model`](Self::into_model).
    ///
    /// # Errors
    /// - Lifts emission-fitting errors from the M-step.
    /// - Propagates kernel errors (which the validated `TrainingSet`
    ///   makes unreachable in practice).
    pub fn learn(
        &mut self, training: &TrainingSet<E::Observation>,
    ) -> HmmResult<&HiddenMarkovModel<E>> {
        let pooled = training.pooled_observations();
        let mut monitor = ConvergenceMonitor::new(
            self.options.tolerance,
            self.options.max_iterations,
            self.options.required_passes,
            self.options.relative,
            self.options.cancel.clone(),
        );
        let mut history = Vec::new();

        loop {
            let statistics = Self::expectation_step(&self.model, training)?;
            let objective = statistics.iter().map(|s| s.log_likelihood).sum::<f64>()
                / training.len() as f64;
            history.push(objective);

            let state = monitor.observe(objective);
            if let Some(callback) = self.progress.as_mut() {
                callback(&IterationReport {
                    iteration: monitor.iteration(),
                    objective,
                    change: monitor.change_magnitude(),
                    state,
                });
            }
            if state != MonitorState::Running {
                break;
            }

            reestimate_parameters(
                &mut self.model,
                training,
                &pooled,
                &statistics,
                &self.options.fit_options,
            )?;
        }

        self.model.debug_assert_nan_free();
        self.summary = Some(LearnSummary {
            iterations: monitor.iteration(),
            objective: monitor.current_objective(),
            state: monitor.state(),
            history,
        });
        Ok(&self.model)
    }

    /// Batch E-step: one [`SequenceStatistics`] per sequence.
    ///
    /// With the `parallel` feature, sequences fan out across the rayon
    /// pool with one freshly-owned trellis workspace per task; serially,
    /// one workspace sized for the longest sequence is reused across the
    /// batch. Either way no scratch is shared between in-flight
    /// sequences.
    fn expectation_step(
        model: &HiddenMarkovModel<E>, training: &TrainingSet<E::Observation>,
    ) -> HmmResult<Vec<SequenceStatistics>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            training
                .sequences()
                .par_iter()
                .map(|sequence| {
                    let mut buffers = TrellisBuffers::new(sequence.len(), model.n_states());
                    compute_statistics(model, sequence, &mut buffers)
                })
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            let mut buffers =
                TrellisBuffers::new(training.max_sequence_len(), model.n_states());
            training
                .sequences()
                .iter()
                .map(|sequence| compute_statistics(model, sequence, &mut buffers))
                .collect()
        }
    }
}
