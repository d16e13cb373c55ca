//! Conversion helpers for the PyO3 binding surface.
//!
//! Purpose
//! -------
//! Keep the FFI glue out of the binding classes: parse Python-friendly
//! arguments (topology names, option scalars, optional weight lists) into
//! the validated core types, mapping every failure into a Python
//! `ValueError`. Only compiled with the `python-bindings` feature; native
//! Rust callers should construct the core types directly.
#![cfg(feature = "python-bindings")]

use crate::markov::core::data::TrainingSet;
use crate::markov::core::options::LearnOptions;
use crate::markov::core::topology::Topology;
use pyo3::PyResult;
use pyo3::exceptions::PyValueError;

/// Parse a topology name (case-insensitive).
///
/// Accepts `"ergodic"`, `"left_to_right"`, and `"left_to_right_skip"`.
///
/// # Errors
/// `PyValueError` naming the accepted spellings.
pub fn parse_topology(name: Option<&str>) -> PyResult<Topology> {
    match name.map(str::to_lowercase).as_deref() {
        None | Some("ergodic") => Ok(Topology::Ergodic),
        Some("left_to_right") => Ok(Topology::LeftToRight { allow_skip: false }),
        Some("left_to_right_skip") => Ok(Topology::LeftToRight { allow_skip: true }),
        Some(other) => Err(PyValueError::new_err(format!(
            "unknown topology '{other}'; expected 'ergodic', 'left_to_right', or \
             'left_to_right_skip'"
        ))),
    }
}

/// Build a validated training set from Python lists.
///
/// # Errors
/// `PyValueError` carrying the core validation message (empty batch,
/// zero-length sequence, weight mismatches).
pub fn extract_training_set(
    sequences: Vec<Vec<usize>>, weights: Option<Vec<f64>>,
) -> PyResult<TrainingSet<usize>> {
    TrainingSet::new(sequences, weights).map_err(Into::into)
}

/// Assemble learner options from optional Python scalars.
///
/// Defaults mirror [`LearnOptions::default`]: relative tolerance `1e-5`,
/// 100 iterations, one batch.
///
/// # Errors
/// `PyValueError` for invalid tolerance or batch count.
pub fn extract_learn_options(
    tolerance: Option<f64>, max_iterations: Option<usize>, batches: Option<usize>,
    seed: Option<u64>,
) -> PyResult<LearnOptions> {
    let defaults = LearnOptions::default();
    let mut options = LearnOptions::new(
        tolerance.unwrap_or(defaults.tolerance),
        max_iterations.unwrap_or(defaults.max_iterations),
    )?;
    if let Some(batches) = batches {
        options = options.with_batches(batches)?;
    }
    if let Some(seed) = seed {
        options = options.with_seed(seed);
    }
    Ok(options)
}
