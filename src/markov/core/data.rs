//! Training data container for sequence learners.
//!
//! Purpose
//! -------
//! Carry a validated batch of ragged observation sequences, with optional
//! per-sequence weights, so that every learner can assume well-formed
//! input: no empty batch, no zero-length sequence, weights matched in
//! count and finite. All validation happens at construction time — the
//! training entry points never start computing and then discover a bad
//! sequence halfway through an iteration.
//!
//! Key behaviors
//! -------------
//! - Validate the batch shape once in [`TrainingSet::new`] and expose
//!   infallible accessors afterwards.
//! - Store per-sequence weights as **log-weights** (`ln w`, with weight 1
//!   mapping to 0), the representation the posterior-accumulation code
//!   consumes directly; a zero weight maps to `-∞` and drops the sequence
//!   from the accumulated statistics without special-casing.
//!
//! Invariants & assumptions
//! ------------------------
//! - `sequences.len() ≥ 1` and every sequence has length ≥ 1.
//! - If weights were provided, there is exactly one finite, non-negative
//!   weight per sequence.
//! - The element type `O` is opaque here; symbol-range or dimensional
//!   checks belong to the emission layer that interprets observations.
//!
//! Conventions
//! -----------
//! - Sequence order is preserved; "flattened in sequence order" in the
//!   re-estimation layer refers to iteration over `sequences()` in index
//!   order, each sequence front to back.
//!
//! Downstream usage
//! ----------------
//! - Learners take `&TrainingSet<O>` in `learn` and rely on its
//!   invariants for buffer sizing and parallel fan-out.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each rejection path and the log-weight mapping.
use crate::markov::errors::{HmmError, HmmResult};

/// Validated batch of ragged observation sequences with optional
/// per-sequence weights.
///
/// Construction enforces the fail-fast validation rules of the training
/// entry point (no empty batch, no zero-length sequence, one finite
/// non-negative weight per sequence when weights are given). After
/// construction all accessors are infallible.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet<O> {
    sequences: Vec<Vec<O>>,
    log_weights: Option<Vec<f64>>,
}

impl<O> TrainingSet<O> {
    /// Construct a validated training set.
    ///
    /// # Arguments
    /// - `sequences`: ragged observation sequences, each of length ≥ 1.
    /// - `weights`: optional per-sequence weights; finite and ≥ 0. Weights
    ///   are stored as `ln w`, so weight 1 becomes log-weight 0 and weight
    ///   0 becomes `-∞` (the sequence contributes nothing to accumulated
    ///   statistics but still participates in validation and scoring).
    ///
    /// # Errors
    /// - [`HmmError::EmptyTrainingSet`] if `sequences` is empty.
    /// - [`HmmError::EmptySequence`] naming the first zero-length sequence.
    /// - [`HmmError::WeightCountMismatch`] if the weight count differs from
    ///   the sequence count.
    /// - [`HmmError::InvalidWeight`] for a NaN, infinite, or negative
    ///   weight.
    pub fn new(sequences: Vec<Vec<O>>, weights: Option<Vec<f64>>) -> HmmResult<Self> {
        if sequences.is_empty() {
            return Err(HmmError::EmptyTrainingSet);
        }
        for (index, sequence) in sequences.iter().enumerate() {
            if sequence.is_empty() {
                return Err(HmmError::EmptySequence { index });
            }
        }
        let log_weights = match weights {
            None => None,
            Some(weights) => {
                if weights.len() != sequences.len() {
                    return Err(HmmError::WeightCountMismatch {
                        sequences: sequences.len(),
                        weights: weights.len(),
                    });
                }
                for (index, &value) in weights.iter().enumerate() {
                    if !value.is_finite() || value < 0.0 {
                        return Err(HmmError::InvalidWeight { index, value });
                    }
                }
                Some(weights.into_iter().map(f64::ln).collect())
            }
        };
        Ok(Self { sequences, log_weights })
    }

    /// Construct an unweighted training set.
    ///
    /// Equivalent to `TrainingSet::new(sequences, None)`.
    pub fn unweighted(sequences: Vec<Vec<O>>) -> HmmResult<Self> {
        Self::new(sequences, None)
    }

    /// Number of sequences in the batch.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the batch is empty. Always `false` for a constructed set;
    /// provided for the conventional `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// All sequences, in their original order.
    pub fn sequences(&self) -> &[Vec<O>] {
        &self.sequences
    }

    /// A single sequence by index.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds, as slice indexing does.
    pub fn sequence(&self, index: usize) -> &[O] {
        &self.sequences[index]
    }

    /// Log-weight of a sequence (`ln w`); 0 when no weights were provided.
    pub fn log_weight(&self, index: usize) -> f64 {
        match &self.log_weights {
            Some(log_weights) => log_weights[index],
            None => 0.0,
        }
    }

    /// Total number of observations across all sequences.
    pub fn total_observations(&self) -> usize {
        self.sequences.iter().map(Vec::len).sum()
    }

    /// Length of the longest sequence; used to size shared trellis buffers.
    pub fn max_sequence_len(&self) -> usize {
        self.sequences.iter().map(Vec::len).max().unwrap_or(0)
    }
}

impl<O: Clone> TrainingSet<O> {
    /// All observations pooled across sequences, flattened in sequence
    /// order.
    ///
    /// The re-estimation layer fits emission distributions against this
    /// pooled view with per-sample weights derived from the state
    /// posteriors; pooling once per training call keeps the per-iteration
    /// cost to weight computation only.
    pub fn pooled_observations(&self) -> Vec<O> {
        let mut pooled = Vec::with_capacity(self.total_observations());
        for sequence in &self.sequences {
            pooled.extend_from_slice(sequence);
        }
        pooled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Every construction-time rejection path.
    // - The log-weight mapping (1 → 0, 0 → -inf, default → 0).
    // - Pooling order of `pooled_observations`.
    //
    // They intentionally DO NOT cover:
    // - Element-type semantics (symbol ranges etc.), which belong to the
    //   emission layer.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the fail-fast rejections: empty batch, zero-length sequence
    // (with the right index), weight count mismatch, and invalid weight.
    //
    // Given
    // -----
    // - Each invalid input in turn.
    //
    // Expect
    // ------
    // - The matching `HmmError` variant for each.
    fn construction_rejects_invalid_batches() {
        assert_eq!(
            TrainingSet::<u8>::new(vec![], None).unwrap_err(),
            HmmError::EmptyTrainingSet
        );
        assert_eq!(
            TrainingSet::new(vec![vec![1u8], vec![], vec![2]], None).unwrap_err(),
            HmmError::EmptySequence { index: 1 }
        );
        assert_eq!(
            TrainingSet::new(vec![vec![1u8]], Some(vec![1.0, 2.0])).unwrap_err(),
            HmmError::WeightCountMismatch { sequences: 1, weights: 2 }
        );
        assert_eq!(
            TrainingSet::new(vec![vec![1u8], vec![2]], Some(vec![1.0, -0.5])).unwrap_err(),
            HmmError::InvalidWeight { index: 1, value: -0.5 }
        );
        assert!(matches!(
            TrainingSet::new(vec![vec![1u8]], Some(vec![f64::NAN])),
            Err(HmmError::InvalidWeight { index: 0, .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Verify the log-weight representation: unweighted sets report 0 for
    // every sequence, weight 1 maps to 0, and weight 0 maps to -inf.
    //
    // Given
    // -----
    // - An unweighted set and a set with weights [1.0, 0.0, 2.0].
    //
    // Expect
    // ------
    // - log_weight values 0, -inf, ln(2) respectively.
    fn log_weights_follow_the_ln_mapping() {
        let unweighted = TrainingSet::new(vec![vec![0u8], vec![1]], None).unwrap();
        assert_eq!(unweighted.log_weight(0), 0.0);
        assert_eq!(unweighted.log_weight(1), 0.0);

        let weighted =
            TrainingSet::new(vec![vec![0u8], vec![1], vec![2]], Some(vec![1.0, 0.0, 2.0]))
                .unwrap();
        assert_eq!(weighted.log_weight(0), 0.0);
        assert_eq!(weighted.log_weight(1), f64::NEG_INFINITY);
        assert!((weighted.log_weight(2) - 2.0_f64.ln()).abs() < 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Verify that pooling preserves sequence order and front-to-back
    // element order, the layout the emission re-fit relies on.
    //
    // Given
    // -----
    // - Sequences [0, 1], [2], [3, 4].
    //
    // Expect
    // ------
    // - Pooled view equals [0, 1, 2, 3, 4]; counts agree.
    fn pooled_observations_preserve_sequence_order() {
        let set =
            TrainingSet::new(vec![vec![0u8, 1], vec![2], vec![3, 4]], None).unwrap();
        assert_eq!(set.pooled_observations(), vec![0, 1, 2, 3, 4]);
        assert_eq!(set.total_observations(), 5);
        assert_eq!(set.max_sequence_len(), 2);
    }
}
