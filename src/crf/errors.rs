//! Errors for linear-chain CRF modeling (batch validation, weight-vector
//! checks, and trainer failures).
//!
//! [`CrfError`] covers everything the CRF surface can reject; validation
//! variants convert losslessly into the optimizer's
//! [`OptError`](crate::optimization::errors::OptError) (and back, for the
//! trainer), so the `LogLikelihood` conformance layer reports the same
//! shapes callers see here.
//!
//! ## Conventions
//! - **Indices are 0-based**; `sequence`/`position` locate the offending
//!   element inside the batch.
//! - Labels live in `0..n_labels`, observation symbols in `0..n_symbols`;
//!   both are validated at batch construction, before any training.
//! - Optimizer/backend failures are normalized to
//!   [`CrfError::OptimizationFailed`] with a human-readable status.
use crate::optimization::errors::OptError;

/// Result alias for CRF operations that may produce [`CrfError`].
pub type CrfResult<T> = Result<T, CrfError>;

/// Unified error type for linear-chain CRF modeling.
#[derive(Debug, Clone, PartialEq)]
pub enum CrfError {
    // ---- Model shape ----
    /// Label set and alphabet must both be non-empty.
    InvalidModelShape { n_labels: usize, n_symbols: usize },

    // ---- Batch validation ----
    /// Training batch contains no sequences.
    EmptyBatch,

    /// A labeled sequence has zero length.
    EmptySequence { index: usize },

    /// Observation and label tracks of a sequence disagree in length.
    SequenceLengthMismatch { sequence: usize, observations: usize, labels: usize },

    /// A label lies outside the model's label set.
    LabelOutOfRange { sequence: usize, position: usize, label: usize, n_labels: usize },

    /// An observation symbol lies outside the model's alphabet.
    SymbolOutOfRange { sequence: usize, position: usize, symbol: usize, n_symbols: usize },

    // ---- Weight vector ----
    /// Weight vector length does not match the model's layout.
    WeightLengthMismatch { expected: usize, actual: usize },

    /// Weight vector entries need to be finite.
    NonFiniteWeight { index: usize, value: f64 },

    // ---- Training ----
    /// The optimizer failed; training degraded to the best weights seen.
    OptimizationFailed { status: String },
}

impl std::error::Error for CrfError {}

impl std::fmt::Display for CrfError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CrfError::InvalidModelShape { n_labels, n_symbols } => {
                write!(
                    f,
                    "Invalid CRF shape: {n_labels} labels over {n_symbols} symbols; both must \
                     be at least 1."
                )
            }
            CrfError::EmptyBatch => {
                write!(f, "Training batch contains no sequences.")
            }
            CrfError::EmptySequence { index } => {
                write!(f, "Labeled sequence at position {index} has zero length.")
            }
            CrfError::SequenceLengthMismatch { sequence, observations, labels } => {
                write!(
                    f,
                    "Sequence {sequence} has {observations} observations but {labels} labels."
                )
            }
            CrfError::LabelOutOfRange { sequence, position, label, n_labels } => {
                write!(
                    f,
                    "Label {label} at sequence {sequence}, position {position} is out of range \
                     for {n_labels} labels."
                )
            }
            CrfError::SymbolOutOfRange { sequence, position, symbol, n_symbols } => {
                write!(
                    f,
                    "Symbol {symbol} at sequence {sequence}, position {position} is out of \
                     range for an alphabet of {n_symbols}."
                )
            }
            CrfError::WeightLengthMismatch { expected, actual } => {
                write!(f, "Weight length mismatch: expected {expected}, actual {actual}")
            }
            CrfError::NonFiniteWeight { index, value } => {
                write!(f, "Weight at index {index} is {value}; weights must be finite.")
            }
            CrfError::OptimizationFailed { status } => {
                write!(f, "Optimization failed: {status}")
            }
        }
    }
}

impl From<OptError> for CrfError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::WeightLengthMismatch { expected, actual } => {
                CrfError::WeightLengthMismatch { expected, actual }
            }
            OptError::InvalidWeightEntry { index, value } => {
                CrfError::NonFiniteWeight { index, value }
            }
            OptError::EmptyBatch => CrfError::EmptyBatch,
            OptError::LabelOutOfRange { sequence, position, label, n_labels } => {
                CrfError::LabelOutOfRange { sequence, position, label, n_labels }
            }
            OptError::SymbolOutOfRange { sequence, position, symbol, n_symbols } => {
                CrfError::SymbolOutOfRange { sequence, position, symbol, n_symbols }
            }
            OptError::SequenceLengthMismatch { sequence, observations, labels } => {
                CrfError::SequenceLengthMismatch { sequence, observations, labels }
            }
            other => CrfError::OptimizationFailed { status: other.to_string() },
        }
    }
}
