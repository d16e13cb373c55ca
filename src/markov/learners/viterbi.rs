//! Viterbi (segmental) learning with optional mini-batching.
//!
//! Purpose
//! -------
//! Fit a hidden Markov model by alternating hard decoding and counting:
//! each sequence is decoded to its single most likely state path, and
//! parameters are re-estimated from normalized path counts instead of
//! soft expectations. A cheaper, cruder relative of Baum-Welch that is
//! often good enough — and a good initializer for it.
//!
//! Key behaviors
//! -------------
//! - Per iteration, sequences are partitioned into `options.batches`
//!   random groups (one group when mini-batching is off) processed
//!   sequentially; each group is decoded (parallelizable across its
//!   sequences) and immediately triggers a hard-count update, letting
//!   early iterations stabilize on subsets before the whole set weighs
//!   in.
//! - Hard-count updates respect the topology: the smoothing pseudocount
//!   is applied only to structurally-allowed entries, so a `-∞` zero is
//!   never resurrected, and a state (or row) with no counts in a group
//!   keeps its previous estimate.
//! - The iteration objective is the batch mean best-path
//!   log-probability; unlike EM it is not guaranteed monotone, which is
//!   why the convergence monitor supports consecutive-pass requirements.
//!
//! Invariants & assumptions
//! ------------------------
//! - Decoding is deterministic (lowest-index tie-break), so a fixed seed
//!   makes entire runs reproducible.
//! - Per-sequence weights enter as multiplicities on the counted paths.
//!
//! Downstream usage
//! ----------------
//! - Same surface as the Baum-Welch learner: construct, `learn`, read
//!   the model and [`LearnSummary`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover objective improvement on separable data, seeded
//!   reproducibility with mini-batches, structural-zero preservation,
//!   and the unsupported-incremental error.
use crate::markov::core::convergence::{ConvergenceMonitor, MonitorState};
use crate::markov::core::data::TrainingSet;
use crate::markov::core::decode::viterbi_decode;
use crate::markov::core::emission::EmissionModel;
use crate::markov::core::model::HiddenMarkovModel;
use crate::markov::core::options::LearnOptions;
use crate::markov::core::topology::Topology;
use crate::markov::errors::{HmmError, HmmResult, ParamResult};
use crate::markov::learners::{IterationReport, LearnSummary, ProgressCallback};
use crate::optimization::numerical_stability::logspace::LOG_ZERO;
use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Segmental trainer owning its model.
///
/// See the module docs; the `learn` loop and result surface mirror
/// [`BaumWelchLearner`](super::baum_welch::BaumWelchLearner).
pub struct ViterbiLearner<E: EmissionModel> {
    pub options: LearnOptions,
    model: HiddenMarkovModel<E>,
    summary: Option<LearnSummary>,
    progress: Option<ProgressCallback>,
}

impl<E: EmissionModel> std::fmt::Debug for ViterbiLearner<E>
where
    E: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViterbiLearner")
            .field("options", &self.options)
            .field("model", &self.model)
            .field("summary", &self.summary)
            .field("progress", &self.progress.as_ref().map(|_| "FnMut(..)"))
            .finish()
    }
}

impl<E: EmissionModel> ViterbiLearner<E> {
    /// Train an existing model.
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

    /// The learner's model.
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
    /// # Errors
    /// Always returns [`HmmError::UnsupportedOperation`].
    pub fn learn_incremental(&mut self, _sequence: &[E::Observation]) -> HmmResult<()> {
        Err(HmmError::UnsupportedOperation {
            operation: "incremental learning",
            reason: "Viterbi learning counts whole decoded paths; collect sequences into a \
                     TrainingSet and call learn.",
        })
    }
}

impl<E> ViterbiLearner<E>
where
    E: EmissionModel + Sync,
    E::Observation: Clone + Sync,
{
    /// Fit the model to the training set by segmental (hard-assignment)
    /// re-estimation.
    ///
    /// # Errors
    /// - Lifts emission-fitting errors from the count-based updates.
    pub fn learn(
        &mut self, training: &TrainingSet<E::Observation>,
    ) -> HmmResult<&HiddenMarkovModel<E>> {
        let mut monitor = ConvergenceMonitor::new(
            self.options.tolerance,
            self.options.max_iterations,
            self.options.required_passes,
            self.options.relative,
            self.options.cancel.clone(),
        );
        let mut rng = match self.options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut history = Vec::new();

        loop {
            let mut order: Vec<usize> = (0..training.len()).collect();
            if self.options.batches > 1 {
                order.shuffle(&mut rng);
            }
            let group_size = training.len().div_ceil(self.options.batches);

            let mut score_total = 0.0_f64;
            for group in order.chunks(group_size) {
                let decoded = Self::decode_group(&self.model, training, group)?;
                score_total += decoded.iter().map(|(_, _, score)| score).sum::<f64>();
                self.maximize_from_paths(training, &decoded)?;
            }

            let objective = score_total / training.len() as f64;
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

    /// Decode one group of sequences; parallel across the group's
    /// sequences when the `parallel` feature is on.
    fn decode_group(
        model: &HiddenMarkovModel<E>, training: &TrainingSet<E::Observation>, group: &[usize],
    ) -> HmmResult<Vec<(usize, Vec<usize>, f64)>> {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            group
                .par_iter()
                .map(|&index| {
                    viterbi_decode(model, training.sequence(index))
                        .map(|(path, score)| (index, path, score))
                })
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            group
                .iter()
                .map(|&index| {
                    viterbi_decode(model, training.sequence(index))
                        .map(|(path, score)| (index, path, score))
                })
                .collect()
        }
    }

    /// Hard-count update from one group's decoded paths.
    ///
    /// Counts carry the per-sequence weights as multiplicities. Smoothing
    /// applies only to structurally-allowed entries, and a row (or the
    /// initial vector, or a state's emission) with zero mass in this
    /// group keeps its previous estimate.
    fn maximize_from_paths(
        &mut self, training: &TrainingSet<E::Observation>, decoded: &[(usize, Vec<usize>, f64)],
    ) -> HmmResult<()> {
        let n_states = self.model.n_states();
        let smoothing = self.options.fit_options.smoothing;

        let mut initial_counts = vec![0.0_f64; n_states];
        let mut transition_counts = Array2::<f64>::zeros((n_states, n_states));
        for (index, path, _) in decoded {
            let weight = training.log_weight(*index).exp();
            initial_counts[path[0]] += weight;
            for pair in path.windows(2) {
                transition_counts[[pair[0], pair[1]]] += weight;
            }
        }

        // Initial-state frequencies.
        let raw_mass: f64 = initial_counts.iter().sum();
        if raw_mass > 0.0 {
            let allowed: Vec<bool> =
                self.model.log_initial.iter().map(|&v| v > LOG_ZERO).collect();
            let smoothed_mass =
                raw_mass + smoothing * allowed.iter().filter(|&&a| a).count() as f64;
            for i in 0..n_states {
                let count = initial_counts[i] + if allowed[i] { smoothing } else { 0.0 };
                self.model.log_initial[i] =
                    if count > 0.0 { (count / smoothed_mass).ln() } else { LOG_ZERO };
            }
        }

        // Transition frequencies, row by row.
        for i in 0..n_states {
            let row_mass: f64 = transition_counts.row(i).sum();
            if row_mass <= 0.0 {
                continue;
            }
            let allowed: Vec<bool> = self
                .model
                .log_transitions
                .row(i)
                .iter()
                .map(|&v| v > LOG_ZERO)
                .collect();
            let smoothed_mass =
                row_mass + smoothing * allowed.iter().filter(|&&a| a).count() as f64;
            for j in 0..n_states {
                let count =
                    transition_counts[[i, j]] + if allowed[j] { smoothing } else { 0.0 };
                self.model.log_transitions[[i, j]] =
                    if count > 0.0 { (count / smoothed_mass).ln() } else { LOG_ZERO };
            }
        }

        // Emission refits from hard assignments over this group's samples.
        let mut observations: Vec<E::Observation> = Vec::new();
        let mut assignments: Vec<usize> = Vec::new();
        let mut multiplicities: Vec<f64> = Vec::new();
        for (index, path, _) in decoded {
            let weight = training.log_weight(*index).exp();
            for (observation, &state) in training.sequence(*index).iter().zip(path.iter()) {
                observations.push(observation.clone());
                assignments.push(state);
                multiplicities.push(weight);
            }
        }
        let mut weights = vec![0.0_f64; observations.len()];
        for i in 0..n_states {
            for ((slot, &state), &multiplicity) in
                weights.iter_mut().zip(assignments.iter()).zip(multiplicities.iter())
            {
                *slot = if state == i { multiplicity } else { 0.0 };
            }
            self.model.emissions[i]
                .fit(&observations, &weights, &self.options.fit_options)
                .map_err(HmmError::from)?;
        }
        Ok(())
    }
}
