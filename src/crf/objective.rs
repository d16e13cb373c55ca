//! CRF training objective: `LogLikelihood` conformance with analytic
//! gradient.
//!
//! Purpose
//! -------
//! Wire the linear-chain CRF to the optimizer's
//! [`LogLikelihood`] trait: `value` is the batch **mean** conditional
//! log-likelihood (so the minimized cost is the negative average
//! log-likelihood), `grad` its exact analytic gradient, and `check` the
//! pre-run validation hook. Both are defined for any finite weight
//! vector; there is no parameter-domain restriction beyond what the
//! optimizer itself enforces.
//!
//! Key behaviors
//! -------------
//! - `value(θ) = (1/N) Σᵢ [score(xᵢ, yᵢ; θ) − ln Z(xᵢ; θ)]`.
//! - `grad(θ) = (1/N) Σᵢ [F(xᵢ, yᵢ) − E_{y∼P(·|xᵢ;θ)} F(xᵢ, y)]`, the
//!   empirical-minus-expected feature counts, with the expectations
//!   computed from the forward/backward tables:
//!   - node marginals `P(yₜ = a) = exp(α[t,a] + β[t,a] − ln Z)` feed the
//!     initial and emission coordinates,
//!   - edge marginals
//!     `P(yₜ = a, yₜ₊₁ = b) = exp(α[t,a] + w_trans[a,b] +
//!      w_emit[b,xₜ₊₁] + β[t+1,b] − ln Z)` feed the transition
//!     coordinates.
//! - [`CrfBatch`] validates the labeled data once, at construction, so
//!   `value`/`grad` run validation-free inner loops.
//!
//! Invariants & assumptions
//! ------------------------
//! - For finite weights every potential is finite, hence `ln Z` is
//!   finite and all marginals are well-defined probabilities — no
//!   degenerate-row handling is needed here.
//! - `check` confirms the weight length/finiteness and that the batch
//!   was built for the same `(n_labels, n_symbols)` shape.
//!
//! Testing notes
//! -------------
//! - The gradient is verified coordinate-wise against central finite
//!   differences of `value` — the canonical CRF-implementation test.
use crate::crf::errors::{CrfError, CrfResult};
use crate::crf::model::{LinearChainCrf, WeightView};
use crate::optimization::errors::OptResult;
use crate::optimization::loglik_optimizer::{Cost, Grad, LogLikelihood, Theta};
use crate::optimization::numerical_stability::logspace::log_sum_exp;

/// One labeled training sequence: parallel observation and label tracks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabeledSequence {
    pub observations: Vec<usize>,
    pub labels: Vec<usize>,
}

/// Validated batch of labeled sequences for a fixed `(n_labels,
/// n_symbols)` shape.
///
/// All range and length validation happens here, before training starts;
/// the objective's hot path assumes a well-formed batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrfBatch {
    sequences: Vec<LabeledSequence>,
    n_labels: usize,
    n_symbols: usize,
}

impl CrfBatch {
    /// Construct a validated batch.
    ///
    /// # Errors
    /// - [`CrfError::EmptyBatch`] / [`CrfError::EmptySequence`] for
    ///   missing data.
    /// - [`CrfError::SequenceLengthMismatch`] when a sequence's tracks
    ///   disagree.
    /// - [`CrfError::LabelOutOfRange`] / [`CrfError::SymbolOutOfRange`]
    ///   for range violations, with the offending coordinates.
    pub fn new(
        pairs: Vec<(Vec<usize>, Vec<usize>)>, n_labels: usize, n_symbols: usize,
    ) -> CrfResult<Self> {
        if pairs.is_empty() {
            return Err(CrfError::EmptyBatch);
        }
        let mut sequences = Vec::with_capacity(pairs.len());
        for (sequence, (observations, labels)) in pairs.into_iter().enumerate() {
            if observations.is_empty() {
                return Err(CrfError::EmptySequence { index: sequence });
            }
            if observations.len() != labels.len() {
                return Err(CrfError::SequenceLengthMismatch {
                    sequence,
                    observations: observations.len(),
                    labels: labels.len(),
                });
            }
            for (position, &symbol) in observations.iter().enumerate() {
                if symbol >= n_symbols {
                    return Err(CrfError::SymbolOutOfRange {
                        sequence,
                        position,
                        symbol,
                        n_symbols,
                    });
                }
            }
            for (position, &label) in labels.iter().enumerate() {
                if label >= n_labels {
                    return Err(CrfError::LabelOutOfRange { sequence, position, label, n_labels });
                }
            }
            sequences.push(LabeledSequence { observations, labels });
        }
        Ok(Self { sequences, n_labels, n_symbols })
    }

    /// Number of labeled sequences.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    /// Whether the batch is empty (never true once constructed).
    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// The validated sequences.
    pub fn sequences(&self) -> &[LabeledSequence] {
        &self.sequences
    }

    /// The label-set size the batch was validated against.
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// The alphabet size the batch was validated against.
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }
}

/// The mean-conditional-log-likelihood objective for a fixed CRF shape.
///
/// Stateless apart from the shape; the candidate weights arrive from the
/// optimizer on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrfObjective {
    n_labels: usize,
    n_symbols: usize,
}

impl CrfObjective {
    /// Objective for models of the given shape.
    pub fn new(n_labels: usize, n_symbols: usize) -> Self {
        Self { n_labels, n_symbols }
    }

    /// Objective matching an existing model's shape.
    pub fn for_model(model: &LinearChainCrf) -> Self {
        Self::new(model.n_labels(), model.n_symbols())
    }

    fn weight_count(&self) -> usize {
        LinearChainCrf::weight_count(self.n_labels, self.n_symbols)
    }

    #[inline]
    fn transition_index(&self, from: usize, to: usize) -> usize {
        self.n_labels + from * self.n_labels + to
    }

    #[inline]
    fn emission_index(&self, label: usize, symbol: usize) -> usize {
        self.n_labels + self.n_labels * self.n_labels + label * self.n_symbols + symbol
    }
}

impl LogLikelihood for CrfObjective {
    type Data = CrfBatch;

    /// Mean conditional log-likelihood over the batch.
    fn value(&self, theta: &Theta, data: &CrfBatch) -> OptResult<Cost> {
        let view = WeightView::new(theta, self.n_labels, self.n_symbols);
        let mut total = 0.0_f64;
        for sequence in data.sequences() {
            total += view.sequence_score(&sequence.observations, &sequence.labels)
                - view.log_partition(&sequence.observations);
        }
        Ok(total / data.len() as f64)
    }

    /// Reject malformed weight vectors and shape-mismatched batches
    /// before the solver starts.
    fn check(&self, theta: &Theta, data: &CrfBatch) -> OptResult<()> {
        let expected = self.weight_count();
        if theta.len() != expected {
            return Err(CrfError::WeightLengthMismatch { expected, actual: theta.len() }.into());
        }
        for (index, &value) in theta.iter().enumerate() {
            if !value.is_finite() {
                return Err(CrfError::NonFiniteWeight { index, value }.into());
            }
        }
        if data.n_labels() != self.n_labels || data.n_symbols() != self.n_symbols {
            return Err(CrfError::InvalidModelShape {
                n_labels: data.n_labels(),
                n_symbols: data.n_symbols(),
            }
            .into());
        }
        Ok(())
    }

    /// Analytic gradient: empirical minus expected feature counts, per
    /// batch mean.
    fn grad(&self, theta: &Theta, data: &CrfBatch) -> OptResult<Grad> {
        let view = WeightView::new(theta, self.n_labels, self.n_symbols);
        let mut gradient = Grad::zeros(self.weight_count());

        for sequence in data.sequences() {
            let observations = &sequence.observations;
            let labels = &sequence.labels;
            let t_len = observations.len();

            let alpha = view.forward(observations);
            let beta = view.backward(observations);
            let log_partition =
                log_sum_exp(alpha.row(t_len - 1).as_slice().expect("row is contiguous"));

            // Empirical feature counts along the observed labeling.
            gradient[labels[0]] += 1.0;
            gradient[self.emission_index(labels[0], observations[0])] += 1.0;
            for t in 1..t_len {
                gradient[self.transition_index(labels[t - 1], labels[t])] += 1.0;
                gradient[self.emission_index(labels[t], observations[t])] += 1.0;
            }

            // Expected counts under the model: node marginals for the
            // initial and emission coordinates.
            for t in 0..t_len {
                for label in 0..self.n_labels {
                    let marginal =
                        (alpha[[t, label]] + beta[[t, label]] - log_partition).exp();
                    if t == 0 {
                        gradient[label] -= marginal;
                    }
                    gradient[self.emission_index(label, observations[t])] -= marginal;
                }
            }

            // Edge marginals for the transition coordinates.
            for t in 0..t_len - 1 {
                for from in 0..self.n_labels {
                    for to in 0..self.n_labels {
                        let log_edge = alpha[[t, from]]
                            + theta[self.transition_index(from, to)]
                            + theta[self.emission_index(to, observations[t + 1])]
                            + beta[[t + 1, to]]
                            - log_partition;
                        gradient[self.transition_index(from, to)] -= log_edge.exp();
                    }
                }
            }
        }

        gradient.mapv_inplace(|g| g / data.len() as f64);
        Ok(gradient)
    }
}
