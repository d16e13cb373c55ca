use argmin::core::{ArgminError, Error};

use crate::crf::errors::CrfError;

/// Crate-wide result alias for optimizer operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- Gradient ----
    /// Implies that finite differences should be used.
    GradientNotImplemented,

    /// Gradient dimensions do not match parameter dimensions.
    GradientDimMismatch {
        expected: usize,
        found: usize,
    },

    /// Gradient elements need to be finite.
    InvalidGradient {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    // ---- MLEOptions ----
    /// Gradient tolerance needs to be positive and finite.
    InvalidTolGrad {
        tol: f64,
        reason: &'static str,
    },
    /// Cost change tolerance needs to be positive and finite.
    InvalidTolCost {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },
    /// At least one tolerance must be provided.
    NoTolerancesProvided,

    /// Invalid line searcher name.
    InvalidLineSearch {
        name: String,
        reason: &'static str,
    },

    /// Invalid solver name.
    InvalidSolver {
        name: String,
        reason: &'static str,
    },

    /// lbfgs_mem needs to be at least 1.
    InvalidLBFGSMem {
        mem: usize,
        reason: &'static str,
    },

    // ---- Cost function ----
    /// Cost function returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Optimizer outcome ----
    /// Estimated parameters must be finite.
    InvalidThetaHat {
        index: usize,
        value: f64,
        reason: &'static str,
    },

    /// Theta hat is missing.
    MissingThetaHat,

    // ---- Argmin ----
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::CheckPointNotFound
    CheckPointNotFound {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for argmin::ImpossibleError
    ImpossibleError {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- CRF objective errors ----
    /// Weight vector length does not match the CRF layout.
    WeightLengthMismatch {
        expected: usize,
        actual: usize,
    },

    /// Weight vector entries need to be finite.
    InvalidWeightEntry {
        index: usize,
        value: f64,
    },

    /// Training batch contains no sequences.
    EmptyBatch,

    /// A label lies outside the model's label set.
    LabelOutOfRange {
        sequence: usize,
        position: usize,
        label: usize,
        n_labels: usize,
    },

    /// An observation symbol lies outside the model's alphabet.
    SymbolOutOfRange {
        sequence: usize,
        position: usize,
        symbol: usize,
        n_symbols: usize,
    },

    /// Observation and label tracks of a sequence disagree in length.
    SequenceLengthMismatch {
        sequence: usize,
        observations: usize,
        labels: usize,
    },

    // ---- Fallback ----
    UnknownError,
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Gradient ----
            OptError::GradientNotImplemented => {
                write!(f, "Gradient optimization not implemented")
            }
            OptError::GradientDimMismatch { expected, found } => {
                write!(f, "Gradient dimension mismatch: expected {expected}, found {found}")
            }
            OptError::InvalidGradient { index, value, reason } => {
                write!(f, "Invalid gradient at index {index}: {value}: {reason}")
            }

            // ---- MLEOptions ----
            OptError::InvalidTolGrad { tol, reason } => {
                write!(f, "Invalid gradient tolerance {tol}: {reason}")
            }
            OptError::InvalidTolCost { tol, reason } => {
                write!(f, "Invalid cost function change tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }
            OptError::NoTolerancesProvided => {
                write!(f, "No tolerances provided")
            }
            OptError::InvalidLineSearch { name, reason } => {
                write!(f, "Invalid line searcher '{name}': {reason}")
            }
            OptError::InvalidSolver { name, reason } => {
                write!(f, "Invalid solver '{name}': {reason}")
            }
            OptError::InvalidLBFGSMem { mem, reason } => {
                write!(f, "Invalid L-BFGS memory {mem}: {reason}")
            }

            // ---- Cost function ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite cost value: {value}")
            }

            // ---- Optimizer outcome ----
            OptError::InvalidThetaHat { index, value, reason } => {
                write!(f, "Invalid estimated parameter at index {index}: {value}: {reason}")
            }
            OptError::MissingThetaHat => {
                write!(f, "Missing estimated parameters (theta hat)")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::CheckPointNotFound { text } => {
                write!(f, "Checkpoint not found: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::ImpossibleError { text } => {
                write!(f, "Impossible error: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- CRF objective errors ----
            OptError::WeightLengthMismatch { expected, actual } => {
                write!(f, "Weight length mismatch: expected {expected}, actual {actual}")
            }
            OptError::InvalidWeightEntry { index, value } => {
                write!(f, "Invalid weight at index {index}: {value}, must be finite")
            }
            OptError::EmptyBatch => {
                write!(f, "Training batch contains no sequences")
            }
            OptError::LabelOutOfRange { sequence, position, label, n_labels } => {
                write!(
                    f,
                    "Label {label} at sequence {sequence}, position {position} is out of range \
                     for {n_labels} labels"
                )
            }
            OptError::SymbolOutOfRange { sequence, position, symbol, n_symbols } => {
                write!(
                    f,
                    "Symbol {symbol} at sequence {sequence}, position {position} is out of range \
                     for an alphabet of {n_symbols}"
                )
            }
            OptError::SequenceLengthMismatch { sequence, observations, labels } => {
                write!(
                    f,
                    "Sequence {sequence} has {observations} observations but {labels} labels"
                )
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        match original_err.downcast() {
            Ok(opt_err) => match opt_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::CheckpointNotFound { text } => OptError::CheckPointNotFound { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                ArgminError::ImpossibleError { text } => OptError::ImpossibleError { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

impl From<CrfError> for OptError {
    fn from(err: CrfError) -> Self {
        match err {
            CrfError::WeightLengthMismatch { expected, actual } => {
                OptError::WeightLengthMismatch { expected, actual }
            }
            CrfError::NonFiniteWeight { index, value } => {
                OptError::InvalidWeightEntry { index, value }
            }
            CrfError::EmptyBatch => OptError::EmptyBatch,
            CrfError::LabelOutOfRange { sequence, position, label, n_labels } => {
                OptError::LabelOutOfRange { sequence, position, label, n_labels }
            }
            CrfError::SymbolOutOfRange { sequence, position, symbol, n_symbols } => {
                OptError::SymbolOutOfRange { sequence, position, symbol, n_symbols }
            }
            CrfError::SequenceLengthMismatch { sequence, observations, labels } => {
                OptError::SequenceLengthMismatch { sequence, observations, labels }
            }
            _ => OptError::UnknownError,
        }
    }
}
