//! Hidden Markov model container: validated log-space parameters plus the
//! standard inference entry points.
//!
//! Purpose
//! -------
//! Own a model's parameters — initial-state log-probabilities, the
//! transition log-matrix, and one emission distribution per state — and
//! guarantee through construction-time validation that every downstream
//! computation can assume probability-normalized, NaN-free parameters.
//!
//! Key behaviors
//! -------------
//! - Construct from a [`Topology`] plus an explicit per-state emission
//!   factory closure, or from explicit (log-)parameters with full
//!   validation.
//! - Expose forward scoring ([`HiddenMarkovModel::log_likelihood`]),
//!   posterior state occupation ([`HiddenMarkovModel::posterior`]), and
//!   Viterbi decoding ([`HiddenMarkovModel::decode`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - `exp(log_initial)` sums to one and every `exp(log_transitions)` row
//!   sums to one, both within `1e-6`; entries are finite or `-∞`, never
//!   NaN or `+∞` (the re-estimation layer preserves these invariants and
//!   debug-asserts them after each update).
//! - `emissions.len() == n_states`, fixed for the model's lifetime.
//! - A model is exclusively owned by at most one running learner; the
//!   learner mutates it in place between iterations.
//!
//! Conventions
//! -----------
//! - All probability parameters live in natural-log space; `-∞` encodes a
//!   structural zero that training never resurrects.
//! - `log_transitions[[i, j]]` is the log-probability of moving *from* `i`
//!   *to* `j`.
//!
//! Downstream usage
//! ----------------
//! - Learners construct models via [`HiddenMarkovModel::from_topology`]
//!   and re-estimate their fields through the `core::reestimate` routines.
//! - Applications score, decode, and compute posteriors through the
//!   methods here without touching the trellis layer directly.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each validation rejection and the agreement of the
//!   probability-space constructor with the log-space one.
//! - The inference methods are exercised against hand-computed references
//!   in the trellis/decode/posterior modules and the integration suite.
use crate::markov::core::decode::viterbi_decode;
use crate::markov::core::emission::EmissionModel;
use crate::markov::core::posteriors::compute_statistics;
use crate::markov::core::topology::Topology;
use crate::markov::core::trellis::{TrellisBuffers, compute_forward_into, fill_log_emissions};
use crate::markov::errors::{HmmResult, ParamError, ParamResult};
use crate::optimization::numerical_stability::logspace::log_sum_exp;
use ndarray::{Array1, Array2};

/// Tolerance for probability-mass validation (probability space).
pub(crate) const PROB_EPSILON: f64 = 1e-6;

/// A hidden Markov model with one emission distribution per state.
///
/// Parameters are stored in log space and validated on construction; see
/// the module docs for the exact invariants. The generic parameter `E`
/// is the emission family, connected to the training core through the
/// [`EmissionModel`] contract only.
#[derive(Debug, Clone, PartialEq)]
pub struct HiddenMarkovModel<E> {
    n_states: usize,
    pub(crate) log_initial: Array1<f64>,
    pub(crate) log_transitions: Array2<f64>,
    pub(crate) emissions: Vec<E>,
}

impl<E> HiddenMarkovModel<E> {
    /// Construct a model from a topology and a per-state emission factory.
    ///
    /// The factory is called once per state with the state index; this is
    /// the supported way to seed states with distinct starting
    /// distributions (e.g., spread Gaussian means).
    ///
    /// # Errors
    /// - Propagates [`ParamError::InvalidStateCount`] from the topology
    ///   build when `n_states == 0`.
    pub fn from_topology(
        topology: Topology, n_states: usize, mut emission_factory: impl FnMut(usize) -> E,
    ) -> ParamResult<Self> {
        let (log_initial, log_transitions) = topology.build(n_states)?;
        let emissions = (0..n_states).map(&mut emission_factory).collect();
        Ok(Self { n_states, log_initial, log_transitions, emissions })
    }

    /// Construct a model from explicit log-space parameters.
    ///
    /// # Errors
    /// - [`ParamError::InvalidStateCount`] for an empty initial vector.
    /// - [`ParamError::TransitionShapeMismatch`] /
    ///   [`ParamError::EmissionCountMismatch`] for inconsistent shapes.
    /// - [`ParamError::NonFiniteLogParameter`] for NaN or `+∞` entries
    ///   (the initial vector is reported as row 0).
    /// - [`ParamError::InvalidInitialMass`] /
    ///   [`ParamError::InvalidTransitionRow`] when probability mass
    ///   deviates from one by more than `1e-6`.
    pub fn from_log_parameters(
        log_initial: Array1<f64>, log_transitions: Array2<f64>, emissions: Vec<E>,
    ) -> ParamResult<Self> {
        let n_states = log_initial.len();
        if n_states == 0 {
            return Err(ParamError::InvalidStateCount { count: 0 });
        }
        if log_transitions.nrows() != n_states || log_transitions.ncols() != n_states {
            return Err(ParamError::TransitionShapeMismatch {
                expected: n_states,
                rows: log_transitions.nrows(),
                cols: log_transitions.ncols(),
            });
        }
        if emissions.len() != n_states {
            return Err(ParamError::EmissionCountMismatch {
                expected: n_states,
                actual: emissions.len(),
            });
        }

        for (col, &value) in log_initial.iter().enumerate() {
            if value.is_nan() || value == f64::INFINITY {
                return Err(ParamError::NonFiniteLogParameter { row: 0, col, value });
            }
        }
        for ((row, col), &value) in log_transitions.indexed_iter() {
            if value.is_nan() || value == f64::INFINITY {
                return Err(ParamError::NonFiniteLogParameter { row, col, value });
            }
        }

        let initial_mass: f64 = log_initial.iter().map(|&v| v.exp()).sum();
        if (initial_mass - 1.0).abs() > PROB_EPSILON {
            return Err(ParamError::InvalidInitialMass { sum: initial_mass });
        }
        for (row, transition_row) in log_transitions.rows().into_iter().enumerate() {
            let mass: f64 = transition_row.iter().map(|&v| v.exp()).sum();
            if (mass - 1.0).abs() > PROB_EPSILON {
                return Err(ParamError::InvalidTransitionRow { row, sum: mass });
            }
        }

        Ok(Self { n_states, log_initial, log_transitions, emissions })
    }

    /// Construct a model from probability-space parameters.
    ///
    /// Zero probabilities are allowed and become structural `-∞` entries.
    ///
    /// # Errors
    /// Same as [`HiddenMarkovModel::from_log_parameters`], applied after
    /// the element-wise `ln`.
    pub fn from_probabilities(
        initial: Array1<f64>, transitions: Array2<f64>, emissions: Vec<E>,
    ) -> ParamResult<Self> {
        Self::from_log_parameters(
            initial.mapv(f64::ln),
            transitions.mapv(f64::ln),
            emissions,
        )
    }

    /// Number of hidden states; fixed for the model's lifetime.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Initial-state log-probabilities (length `n_states`).
    pub fn log_initial(&self) -> &Array1<f64> {
        &self.log_initial
    }

    /// Transition log-probabilities (`n_states × n_states`, row-stochastic
    /// in probability space).
    pub fn log_transitions(&self) -> &Array2<f64> {
        &self.log_transitions
    }

    /// Per-state emission distributions.
    pub fn emissions(&self) -> &[E] {
        &self.emissions
    }

    /// One state's emission distribution.
    ///
    /// # Panics
    /// Panics if `state` is out of bounds, as slice indexing does.
    pub fn emission(&self, state: usize) -> &E {
        &self.emissions[state]
    }

    /// Debug-only guard against NaN leaking into final parameters.
    ///
    /// Numerical degeneracy mid-iteration is clamped rather than raised,
    /// so a NaN surviving into the model indicates a bug in the
    /// re-estimation layer, not bad user input.
    pub(crate) fn debug_assert_nan_free(&self) {
        debug_assert!(
            self.log_initial.iter().all(|v| !v.is_nan())
                && self.log_transitions.iter().all(|v| !v.is_nan()),
            "NaN reached final model parameters"
        );
    }
}

impl<E: EmissionModel> HiddenMarkovModel<E> {
    /// Log-likelihood of one observation sequence under this model.
    ///
    /// Runs the forward recurrence and reduces the terminal row; the cost
    /// is `O(T · K²)` with no allocation beyond the trellis buffer.
    ///
    /// # Errors
    /// - [`HmmError::EmptySequence`](crate::markov::errors::HmmError) for a
    ///   zero-length sequence.
    pub fn log_likelihood(&self, sequence: &[E::Observation]) -> HmmResult<f64> {
        let mut buffers = TrellisBuffers::new(sequence.len(), self.n_states);
        fill_log_emissions(self, sequence, &mut buffers.log_emissions)?;
        compute_forward_into(self, &buffers.log_emissions, sequence.len(), &mut buffers.log_forward)?;
        Ok(log_sum_exp(
            buffers
                .log_forward
                .row(sequence.len() - 1)
                .as_slice()
                .expect("row is contiguous"),
        ))
    }

    /// Posterior state-occupation probabilities for one sequence.
    ///
    /// Returns a `T × n_states` matrix in **probability space** (rows sum
    /// to one wherever any state is reachable) together with the sequence
    /// log-likelihood.
    ///
    /// # Errors
    /// - [`HmmError::EmptySequence`](crate::markov::errors::HmmError) for a
    ///   zero-length sequence.
    pub fn posterior(
        &self, sequence: &[E::Observation],
    ) -> HmmResult<(Array2<f64>, f64)> {
        let mut buffers = TrellisBuffers::new(sequence.len(), self.n_states);
        let statistics = compute_statistics(self, sequence, &mut buffers)?;
        Ok((statistics.gamma.mapv(f64::exp), statistics.log_likelihood))
    }

    /// Most likely state path and its joint log-probability.
    ///
    /// Ties between predecessor states are broken toward the lowest state
    /// index; see [`viterbi_decode`] for the decoding contract.
    ///
    /// # Errors
    /// - [`HmmError::EmptySequence`](crate::markov::errors::HmmError) for a
    ///   zero-length sequence.
    pub fn decode(&self, sequence: &[E::Observation]) -> HmmResult<(Vec<usize>, f64)> {
        viterbi_decode(self, sequence)
    }
}
