//! rust_markov — hidden Markov model and CRF training core with Python
//! bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the discrete-emission HMM to Python via the `_rust_markov`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing classes and the `#[pymodule]`
//! initializer used by the `rust_markov` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`markov`, `crf`, `optimization`)
//!   as the public crate surface.
//! - Define the `DiscreteHmm` `#[pyclass]` wrapper (construct, `fit`
//!   with either learning algorithm, `decode`, `score`, parameter
//!   getters) and the `_rust_markov` module initializer.
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerical work lives in the inner Rust modules; this file
//!   performs only FFI glue, input conversion, and error mapping.
//! - On successful conversion from Python objects to Rust types, the
//!   invariants documented in the core modules are assumed to hold.
//!
//! Conventions
//! -----------
//! - Python-exposed probabilities are returned in probability space
//!   (`exp` of the core's log parameters) since that is what notebook
//!   users expect to read.
//! - Errors from core Rust code propagate as rich error types internally
//!   and convert to `ValueError` at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend directly on the inner modules (or
//!   their preludes) and can ignore the PyO3 items behind the
//!   `python-bindings` feature.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and the
//!   crate-level integration suites; binding smoke tests live on the
//!   Python side.

pub mod crf;
pub mod markov;
pub mod optimization;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*};

#[cfg(feature = "python-bindings")]
use crate::{
    markov::{
        core::{data::TrainingSet, emission::DiscreteEmission, model::HiddenMarkovModel},
        learners::{baum_welch::BaumWelchLearner, viterbi::ViterbiLearner},
    },
    utils::{extract_learn_options, extract_training_set, parse_topology},
};

/// DiscreteHmm — Python-facing discrete-emission hidden Markov model.
///
/// Wraps a [`HiddenMarkovModel<DiscreteEmission>`] plus the two training
/// loops. Construction seeds a uniform model over the requested topology;
/// `fit` trains in place and returns the final objective.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_markov")]
pub struct DiscreteHmm {
    inner: HiddenMarkovModel<DiscreteEmission>,
    n_symbols: usize,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl DiscreteHmm {
    #[new]
    #[pyo3(
        signature = (n_states, n_symbols, topology = None),
        text_signature = "(n_states, n_symbols, /, topology='ergodic')"
    )]
    pub fn new(n_states: usize, n_symbols: usize, topology: Option<&str>) -> PyResult<Self> {
        if n_symbols == 0 {
            return Err(PyValueError::new_err("n_symbols must be at least 1"));
        }
        let topology = parse_topology(topology)?;
        let inner = HiddenMarkovModel::from_topology(topology, n_states, |_| {
            DiscreteEmission::uniform(n_symbols).expect("n_symbols checked above")
        })
        .map_err(crate::markov::errors::HmmError::from)?;
        Ok(Self { inner, n_symbols })
    }

    /// Train in place; returns the final training objective.
    #[pyo3(
        signature = (
            sequences,
            weights = None,
            algorithm = None,
            tolerance = None,
            max_iterations = None,
            batches = None,
            seed = None,
        ),
        text_signature = "(self, sequences, /, weights=None, algorithm='baum_welch', \
                          tolerance=1e-5, max_iterations=100, batches=None, seed=None)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn fit(
        &mut self, sequences: Vec<Vec<usize>>, weights: Option<Vec<f64>>,
        algorithm: Option<&str>, tolerance: Option<f64>, max_iterations: Option<usize>,
        batches: Option<usize>, seed: Option<u64>,
    ) -> PyResult<f64> {
        let training: TrainingSet<usize> = extract_training_set(sequences, weights)?;
        let options = extract_learn_options(tolerance, max_iterations, batches, seed)?;

        match algorithm.map(str::to_lowercase).as_deref() {
            None | Some("baum_welch") => {
                let mut learner = BaumWelchLearner::new(self.inner.clone(), options);
                learner.learn(&training)?;
                let objective = learner.summary().map(|s| s.objective).unwrap_or(f64::NAN);
                self.inner = learner.into_model();
                Ok(objective)
            }
            Some("viterbi") => {
                let mut learner = ViterbiLearner::new(self.inner.clone(), options);
                learner.learn(&training)?;
                let objective = learner.summary().map(|s| s.objective).unwrap_or(f64::NAN);
                self.inner = learner.into_model();
                Ok(objective)
            }
            Some(other) => Err(PyValueError::new_err(format!(
                "unknown algorithm '{other}'; expected 'baum_welch' or 'viterbi'"
            ))),
        }
    }

    /// Most likely state path for one sequence.
    pub fn decode(&self, sequence: Vec<usize>) -> PyResult<Vec<usize>> {
        let (path, _) = self.inner.decode(&sequence)?;
        Ok(path)
    }

    /// Log-likelihood of one sequence under the current parameters.
    pub fn score(&self, sequence: Vec<usize>) -> PyResult<f64> {
        Ok(self.inner.log_likelihood(&sequence)?)
    }

    /// Posterior state-occupation probabilities (rows over time).
    pub fn posteriors(&self, sequence: Vec<usize>) -> PyResult<Vec<Vec<f64>>> {
        let (gamma, _) = self.inner.posterior(&sequence)?;
        Ok(gamma.rows().into_iter().map(|row| row.to_vec()).collect())
    }

    #[getter]
    pub fn n_states(&self) -> usize {
        self.inner.n_states()
    }

    #[getter]
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    #[getter]
    pub fn initial_probs(&self) -> Vec<f64> {
        self.inner.log_initial().iter().map(|&v| v.exp()).collect()
    }

    #[getter]
    pub fn transition_matrix(&self) -> Vec<Vec<f64>> {
        self.inner
            .log_transitions()
            .rows()
            .into_iter()
            .map(|row| row.iter().map(|&v| v.exp()).collect())
            .collect()
    }
}

/// _rust_markov — PyO3 module initializer for the Python extension.
///
/// Registers the binding classes on the `_rust_markov` module; the
/// pure-Python `rust_markov` package wraps them with user-facing
/// facades.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_markov<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    m.add_class::<DiscreteHmm>()?;
    Ok(())
}
