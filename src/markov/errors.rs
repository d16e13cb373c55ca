//! Errors for hidden-Markov-model training (data validation, parameter
//! checks, emission fitting, and learner failures).
//!
//! This module defines a training error type, [`HmmError`], a parameter
//! error type, [`ParamError`], and an emission-fitting error type,
//! [`EmissionError`], used across the Rust core and the Python-facing API.
//! All implement `Display`/`Error`; the training error converts to `PyErr`
//! behind the `python-bindings` feature.
//!
//! ## Conventions
//! - **Indices are 0-based** (match Rust/NumPy).
//! - Probabilities are validated in probability space (`[0, 1]`, rows
//!   summing to one within `1e-6`) and carried in log space afterwards.
//! - Validation failures are raised **before any computation begins**;
//!   numerical degeneracy mid-training is clamped, not raised.
//! - Cancellation is not an error: a cancelled `learn` returns the model
//!   trained so far together with a `Cancelled` monitor state.
#[cfg(feature = "python-bindings")]
use pyo3::PyErr;
#[cfg(feature = "python-bindings")]
use pyo3::exceptions::PyValueError;

/// Crate-wide result alias for HMM training operations that may produce
/// [`HmmError`].
pub type HmmResult<T> = Result<T, HmmError>;

/// Result alias for parameter-construction/validation paths that may
/// produce [`ParamError`].
pub type ParamResult<T> = Result<T, ParamError>;

/// Result alias for emission-distribution fitting that may produce
/// [`EmissionError`].
pub type EmissionResult<T> = Result<T, EmissionError>;

/// Unified error type for HMM training.
///
/// Covers training-set validation, learner configuration, and emission
/// failures surfaced during re-estimation. Implements `Display`/`Error`
/// and converts to a Python `ValueError` at PyO3 boundaries.
#[derive(Debug, Clone, PartialEq)]
pub enum HmmError {
    // ---- Training-set validation ----
    /// Training set contains no sequences.
    EmptyTrainingSet,

    /// A training sequence has zero length.
    EmptySequence { index: usize },

    /// Weight vector length does not match the number of sequences.
    WeightCountMismatch { sequences: usize, weights: usize },

    /// A sequence weight is NaN, infinite, or negative.
    InvalidWeight { index: usize, value: f64 },

    // ---- Learner configuration ----
    /// Convergence tolerance must be finite and non-negative.
    InvalidTolerance { value: f64 },

    /// The number of required consecutive convergence passes must be ≥ 1.
    InvalidRequiredPasses { value: usize },

    /// The mini-batch count must be ≥ 1.
    InvalidBatchCount { value: usize },

    // ---- Unsupported operations ----
    /// The requested operation is not supported by this learner.
    UnsupportedOperation { operation: &'static str, reason: &'static str },

    // ---- Parameter errors (lifted) ----
    /// Number of states must be ≥ 1.
    InvalidStateCount { count: usize },

    /// Initial-state vector length does not match the state count.
    InitialLengthMismatch { expected: usize, actual: usize },

    /// Transition matrix shape does not match the state count.
    TransitionShapeMismatch { expected: usize, rows: usize, cols: usize },

    /// Emission array length does not match the state count.
    EmissionCountMismatch { expected: usize, actual: usize },

    /// Initial-state probabilities do not sum to one.
    InvalidInitialMass { sum: f64 },

    /// A transition-matrix row does not sum to one.
    InvalidTransitionRow { row: usize, sum: f64 },

    /// A log-parameter entry is NaN or +∞.
    NonFiniteLogParameter { row: usize, col: usize, value: f64 },

    // ---- Emission errors (lifted) ----
    /// A discrete observation lies outside the emission alphabet.
    SymbolOutOfRange { symbol: usize, n_symbols: usize },

    /// Observation and weight tracks disagree in length during fitting.
    FitLengthMismatch { observations: usize, weights: usize },

    /// Additive smoothing must be finite and non-negative.
    InvalidSmoothing { value: f64 },

    /// The variance floor must be finite and strictly positive.
    InvalidVarianceFloor { value: f64 },

    /// ---- Fallback ----
    UnknownError,
}

impl std::error::Error for HmmError {}

impl std::fmt::Display for HmmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Training-set validation ----
            HmmError::EmptyTrainingSet => {
                write!(f, "Training set contains no sequences.")
            }
            HmmError::EmptySequence { index } => {
                write!(f, "Observation sequence at position {index} has zero length.")
            }
            HmmError::WeightCountMismatch { sequences, weights } => {
                write!(f, "Got {weights} sequence weights for {sequences} sequences.")
            }
            HmmError::InvalidWeight { index, value } => {
                write!(
                    f,
                    "Sequence weight at index {index} is {value}; weights must be finite and \
                     non-negative."
                )
            }

            // ---- Learner configuration ----
            HmmError::InvalidTolerance { value } => {
                write!(f, "Convergence tolerance {value} must be finite and non-negative.")
            }
            HmmError::InvalidRequiredPasses { value } => {
                write!(f, "Required convergence passes {value} must be at least 1.")
            }
            HmmError::InvalidBatchCount { value } => {
                write!(f, "Mini-batch count {value} must be at least 1.")
            }

            // ---- Unsupported operations ----
            HmmError::UnsupportedOperation { operation, reason } => {
                write!(f, "Operation '{operation}' is not supported: {reason}")
            }

            // ---- Parameter errors ----
            HmmError::InvalidStateCount { count } => {
                write!(f, "Invalid state count {count}; a model needs at least one state.")
            }
            HmmError::InitialLengthMismatch { expected, actual } => {
                write!(f, "Initial-state vector length mismatch: expected {expected}, got {actual}")
            }
            HmmError::TransitionShapeMismatch { expected, rows, cols } => {
                write!(
                    f,
                    "Transition matrix shape mismatch: expected {expected}x{expected}, got \
                     {rows}x{cols}"
                )
            }
            HmmError::EmissionCountMismatch { expected, actual } => {
                write!(f, "Emission count mismatch: expected {expected}, got {actual}")
            }
            HmmError::InvalidInitialMass { sum } => {
                write!(f, "Initial-state probabilities sum to {sum}, expected 1.")
            }
            HmmError::InvalidTransitionRow { row, sum } => {
                write!(f, "Transition row {row} sums to {sum}, expected 1.")
            }
            HmmError::NonFiniteLogParameter { row, col, value } => {
                write!(f, "Log-parameter at ({row}, {col}) is {value}; NaN and +inf are invalid.")
            }

            // ---- Emission errors ----
            HmmError::SymbolOutOfRange { symbol, n_symbols } => {
                write!(f, "Symbol {symbol} is out of range for an alphabet of {n_symbols}.")
            }
            HmmError::FitLengthMismatch { observations, weights } => {
                write!(f, "Emission fit got {observations} observations but {weights} weights.")
            }
            HmmError::InvalidSmoothing { value } => {
                write!(f, "Smoothing pseudocount {value} must be finite and non-negative.")
            }
            HmmError::InvalidVarianceFloor { value } => {
                write!(f, "Variance floor {value} must be finite and strictly positive.")
            }

            // ---- Fallback ----
            HmmError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

/// Error type for model-parameter construction and validation.
///
/// Raised when explicit initial/transition/emission parameters or a
/// topology request cannot form a valid model. Lifted into [`HmmError`]
/// at the learner surface via `From`.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamError {
    /// Number of states must be ≥ 1.
    InvalidStateCount { count: usize },

    /// Initial-state vector length does not match the state count.
    InitialLengthMismatch { expected: usize, actual: usize },

    /// Transition matrix shape does not match the state count.
    TransitionShapeMismatch { expected: usize, rows: usize, cols: usize },

    /// Emission array length does not match the state count.
    EmissionCountMismatch { expected: usize, actual: usize },

    /// Initial-state probabilities do not sum to one.
    InvalidInitialMass { sum: f64 },

    /// A transition-matrix row does not sum to one.
    InvalidTransitionRow { row: usize, sum: f64 },

    /// A log-parameter entry is NaN or +∞.
    NonFiniteLogParameter { row: usize, col: usize, value: f64 },
}

impl std::error::Error for ParamError {}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamError::InvalidStateCount { count } => {
                write!(f, "Invalid state count {count}; a model needs at least one state.")
            }
            ParamError::InitialLengthMismatch { expected, actual } => {
                write!(f, "Initial-state vector length mismatch: expected {expected}, got {actual}")
            }
            ParamError::TransitionShapeMismatch { expected, rows, cols } => {
                write!(
                    f,
                    "Transition matrix shape mismatch: expected {expected}x{expected}, got \
                     {rows}x{cols}"
                )
            }
            ParamError::EmissionCountMismatch { expected, actual } => {
                write!(f, "Emission count mismatch: expected {expected}, got {actual}")
            }
            ParamError::InvalidInitialMass { sum } => {
                write!(f, "Initial-state probabilities sum to {sum}, expected 1.")
            }
            ParamError::InvalidTransitionRow { row, sum } => {
                write!(f, "Transition row {row} sums to {sum}, expected 1.")
            }
            ParamError::NonFiniteLogParameter { row, col, value } => {
                write!(f, "Log-parameter at ({row}, {col}) is {value}; NaN and +inf are invalid.")
            }
        }
    }
}

impl From<ParamError> for HmmError {
    fn from(err: ParamError) -> Self {
        match err {
            ParamError::InvalidStateCount { count } => HmmError::InvalidStateCount { count },
            ParamError::InitialLengthMismatch { expected, actual } => {
                HmmError::InitialLengthMismatch { expected, actual }
            }
            ParamError::TransitionShapeMismatch { expected, rows, cols } => {
                HmmError::TransitionShapeMismatch { expected, rows, cols }
            }
            ParamError::EmissionCountMismatch { expected, actual } => {
                HmmError::EmissionCountMismatch { expected, actual }
            }
            ParamError::InvalidInitialMass { sum } => HmmError::InvalidInitialMass { sum },
            ParamError::InvalidTransitionRow { row, sum } => {
                HmmError::InvalidTransitionRow { row, sum }
            }
            ParamError::NonFiniteLogParameter { row, col, value } => {
                HmmError::NonFiniteLogParameter { row, col, value }
            }
        }
    }
}

/// Error type for emission-distribution fitting and evaluation.
///
/// Surfaced by [`EmissionModel`](crate::markov::core::emission::EmissionModel)
/// implementations; lifted into [`HmmError`] by the re-estimation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum EmissionError {
    /// A discrete observation lies outside the emission alphabet.
    SymbolOutOfRange { symbol: usize, n_symbols: usize },

    /// Observation and weight tracks disagree in length.
    FitLengthMismatch { observations: usize, weights: usize },

    /// Additive smoothing must be finite and non-negative.
    InvalidSmoothing { value: f64 },

    /// The variance floor must be finite and strictly positive.
    InvalidVarianceFloor { value: f64 },
}

impl std::error::Error for EmissionError {}

impl std::fmt::Display for EmissionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmissionError::SymbolOutOfRange { symbol, n_symbols } => {
                write!(f, "Symbol {symbol} is out of range for an alphabet of {n_symbols}.")
            }
            EmissionError::FitLengthMismatch { observations, weights } => {
                write!(f, "Emission fit got {observations} observations but {weights} weights.")
            }
            EmissionError::InvalidSmoothing { value } => {
                write!(f, "Smoothing pseudocount {value} must be finite and non-negative.")
            }
            EmissionError::InvalidVarianceFloor { value } => {
                write!(f, "Variance floor {value} must be finite and strictly positive.")
            }
        }
    }
}

impl From<EmissionError> for HmmError {
    fn from(err: EmissionError) -> Self {
        match err {
            EmissionError::SymbolOutOfRange { symbol, n_symbols } => {
                HmmError::SymbolOutOfRange { symbol, n_symbols }
            }
            EmissionError::FitLengthMismatch { observations, weights } => {
                HmmError::FitLengthMismatch { observations, weights }
            }
            EmissionError::InvalidSmoothing { value } => HmmError::InvalidSmoothing { value },
            EmissionError::InvalidVarianceFloor { value } => {
                HmmError::InvalidVarianceFloor { value }
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<HmmError> for PyErr {
    fn from(err: HmmError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Display output of the variants users hit first (validation).
    // - Lifting of `ParamError` and `EmissionError` into `HmmError`.
    //
    // They intentionally DO NOT cover:
    // - PyErr conversion (exercised by Python-level tests when the
    //   `python-bindings` feature is enabled).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the zero-length-sequence message names the offending index,
    // matching the fail-fast contract of the training entry point.
    //
    // Given
    // -----
    // - `HmmError::EmptySequence { index: 3 }`.
    //
    // Expect
    // ------
    // - The message contains "position 3" and "zero length".
    fn empty_sequence_message_names_the_position() {
        let msg = HmmError::EmptySequence { index: 3 }.to_string();
        assert!(msg.contains("position 3"), "got: {msg}");
        assert!(msg.contains("zero length"), "got: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that parameter and emission errors lift into `HmmError` with
    // their payloads intact.
    //
    // Given
    // -----
    // - A `ParamError::InvalidTransitionRow` and an
    //   `EmissionError::SymbolOutOfRange`.
    //
    // Expect
    // ------
    // - Conversion yields the same-shaped `HmmError` variants.
    fn param_and_emission_errors_lift_with_payload() {
        let lifted: HmmError = ParamError::InvalidTransitionRow { row: 1, sum: 0.8 }.into();
        assert_eq!(lifted, HmmError::InvalidTransitionRow { row: 1, sum: 0.8 });

        let lifted: HmmError = EmissionError::SymbolOutOfRange { symbol: 9, n_symbols: 4 }.into();
        assert_eq!(lifted, HmmError::SymbolOutOfRange { symbol: 9, n_symbols: 4 });
    }
}
