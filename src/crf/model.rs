//! Linear-chain conditional random field over discrete observations.
//!
//! Purpose
//! -------
//! Hold the CRF weight vector and implement the chain computations every
//! consumer needs: path scoring, the log-partition function via the
//! forward recurrence, posterior-ready forward/backward tables, and
//! Viterbi decoding. The discriminative mirror of the HMM: the same
//! trellis shapes, but over unnormalized log-potentials built from
//! weights instead of probabilities.
//!
//! Key behaviors
//! -------------
//! - Weight layout (documented, fixed): `[initial (K) | transition (K·K,
//!   row-major from→to) | emission (K·V, row-major label→symbol)]`, total
//!   `K + K² + K·V` weights for `K` labels over a `V`-symbol alphabet.
//! - The log-potential of label `y` at position `t` is
//!   `w_init[y] + w_emit[y, x₀]` for `t = 0` and
//!   `w_trans[prev, y] + w_emit[y, xₜ]` afterwards.
//! - `ln Z(x)` is the log-sum-exp reduction of the terminal forward row;
//!   `ℓ(x, y) = score(x, y) − ln Z(x)` is always ≤ 0 and finite for any
//!   finite weight vector — there is no parameter-domain restriction.
//!
//! Invariants & assumptions
//! ------------------------
//! - Weights are finite (validated on construction and replacement);
//!   potentials are therefore always finite, so every sequence is
//!   reachable and no degenerate-row handling is needed on this side of
//!   the crate.
//! - Symbol/label ranges are validated at the public entry points; the
//!   internal recurrences assume validated input.
//!
//! Conventions
//! -----------
//! - Viterbi ties break toward the lowest label index, matching the HMM
//!   decoder's documented rule.
//!
//! Downstream usage
//! ----------------
//! - The objective layer evaluates these computations through a borrowed
//!   [`WeightView`] over the optimizer's candidate vector — no copy of
//!   the weights per evaluation.
//!
//! Testing notes
//! -------------
//! - Unit tests check the partition function against brute-force label
//!   enumeration, the ≤ 0 bound on log-likelihood, decoding against
//!   enumeration, and validation rejections.
use crate::crf::errors::{CrfError, CrfResult};
use crate::optimization::loglik_optimizer::Theta;
use crate::optimization::numerical_stability::logspace::{LOG_ZERO, log_sum_exp};
use ndarray::Array2;

/// Borrowed, shape-aware view over a CRF weight vector.
///
/// The optimizer hands candidate vectors by reference; this view gives
/// them the same computational surface as an owned model without
/// allocating. [`LinearChainCrf`] delegates all of its math here.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WeightView<'a> {
    weights: &'a Theta,
    n_labels: usize,
    n_symbols: usize,
}

impl<'a> WeightView<'a> {
    pub(crate) fn new(weights: &'a Theta, n_labels: usize, n_symbols: usize) -> Self {
        debug_assert_eq!(weights.len(), LinearChainCrf::weight_count(n_labels, n_symbols));
        Self { weights, n_labels, n_symbols }
    }

    #[inline]
    fn initial(&self, label: usize) -> f64 {
        self.weights[label]
    }

    #[inline]
    fn transition(&self, from: usize, to: usize) -> f64 {
        self.weights[self.n_labels + from * self.n_labels + to]
    }

    #[inline]
    fn emission(&self, label: usize, symbol: usize) -> f64 {
        self.weights[self.n_labels + self.n_labels * self.n_labels + label * self.n_symbols + symbol]
    }

    /// Joint log-score of a labeling: the sum of potentials along the
    /// path.
    pub(crate) fn sequence_score(&self, observations: &[usize], labels: &[usize]) -> f64 {
        let mut score = self.initial(labels[0]) + self.emission(labels[0], observations[0]);
        for t in 1..observations.len() {
            score += self.transition(labels[t - 1], labels[t])
                + self.emission(labels[t], observations[t]);
        }
        score
    }

    /// Forward table: `alpha[t, y] = ln Σ_{paths ending in y at t} exp(score)`.
    pub(crate) fn forward(&self, observations: &[usize]) -> Array2<f64> {
        let t_len = observations.len();
        let mut alpha = Array2::zeros((t_len, self.n_labels));
        for y in 0..self.n_labels {
            alpha[[0, y]] = self.initial(y) + self.emission(y, observations[0]);
        }
        let mut terms = vec![0.0_f64; self.n_labels];
        for t in 1..t_len {
            for y in 0..self.n_labels {
                for (prev, term) in terms.iter_mut().enumerate() {
                    *term = alpha[[t - 1, prev]] + self.transition(prev, y);
                }
                alpha[[t, y]] = log_sum_exp(&terms) + self.emission(y, observations[t]);
            }
        }
        alpha
    }

    /// Backward table, the mirror of [`forward`](Self::forward) with
    /// `beta[T−1, y] = 0`.
    pub(crate) fn backward(&self, observations: &[usize]) -> Array2<f64> {
        let t_len = observations.len();
        let mut beta = Array2::zeros((t_len, self.n_labels));
        let mut terms = vec![0.0_f64; self.n_labels];
        for t in (0..t_len.saturating_sub(1)).rev() {
            for y in 0..self.n_labels {
                for (next, term) in terms.iter_mut().enumerate() {
                    *term = self.transition(y, next)
                        + self.emission(next, observations[t + 1])
                        + beta[[t + 1, next]];
                }
                beta[[t, y]] = log_sum_exp(&terms);
            }
        }
        beta
    }

    /// Log-partition function `ln Z(x)`.
    pub(crate) fn log_partition(&self, observations: &[usize]) -> f64 {
        let alpha = self.forward(observations);
        log_sum_exp(alpha.row(observations.len() - 1).as_slice().expect("row is contiguous"))
    }
}

/// Linear-chain CRF with the weight layout documented in the module docs.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearChainCrf {
    n_labels: usize,
    n_symbols: usize,
    weights: Theta,
}

impl LinearChainCrf {
    /// Number of weights for a `(n_labels, n_symbols)` chain.
    pub fn weight_count(n_labels: usize, n_symbols: usize) -> usize {
        n_labels + n_labels * n_labels + n_labels * n_symbols
    }

    /// Zero-initialized model (the uniform distribution over labelings).
    ///
    /// # Errors
    /// - [`CrfError::InvalidModelShape`] when either dimension is zero.
    pub fn new(n_labels: usize, n_symbols: usize) -> CrfResult<Self> {
        if n_labels == 0 || n_symbols == 0 {
            return Err(CrfError::InvalidModelShape { n_labels, n_symbols });
        }
        Ok(Self {
            n_labels,
            n_symbols,
            weights: Theta::zeros(Self::weight_count(n_labels, n_symbols)),
        })
    }

    /// Model with explicit weights.
    ///
    /// # Errors
    /// - [`CrfError::InvalidModelShape`] for a zero dimension.
    /// - [`CrfError::WeightLengthMismatch`] /
    ///   [`CrfError::NonFiniteWeight`] for a malformed vector.
    pub fn with_weights(n_labels: usize, n_symbols: usize, weights: Theta) -> CrfResult<Self> {
        let mut model = Self::new(n_labels, n_symbols)?;
        model.set_weights(weights)?;
        Ok(model)
    }

    /// Number of labels.
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// Alphabet size.
    pub fn n_symbols(&self) -> usize {
        self.n_symbols
    }

    /// The current weight vector.
    pub fn weights(&self) -> &Theta {
        &self.weights
    }

    /// Replace the weight vector.
    ///
    /// # Errors
    /// - [`CrfError::WeightLengthMismatch`] for a wrong length.
    /// - [`CrfError::NonFiniteWeight`] for a NaN/∞ entry.
    pub fn set_weights(&mut self, weights: Theta) -> CrfResult<()> {
        let expected = Self::weight_count(self.n_labels, self.n_symbols);
        if weights.len() != expected {
            return Err(CrfError::WeightLengthMismatch { expected, actual: weights.len() });
        }
        for (index, &value) in weights.iter().enumerate() {
            if !value.is_finite() {
                return Err(CrfError::NonFiniteWeight { index, value });
            }
        }
        self.weights = weights;
        Ok(())
    }

    pub(crate) fn view(&self) -> WeightView<'_> {
        WeightView::new(&self.weights, self.n_labels, self.n_symbols)
    }

    /// Validate one observation track against the alphabet.
    fn check_observations(&self, observations: &[usize]) -> CrfResult<()> {
        if observations.is_empty() {
            return Err(CrfError::EmptySequence { index: 0 });
        }
        for (position, &symbol) in observations.iter().enumerate() {
            if symbol >= self.n_symbols {
                return Err(CrfError::SymbolOutOfRange {
                    sequence: 0,
                    position,
                    symbol,
                    n_symbols: self.n_symbols,
                });
            }
        }
        Ok(())
    }

    /// Conditional log-likelihood `ln P(labels | observations)`.
    ///
    /// Always finite and ≤ 0 for finite weights.
    ///
    /// # Errors
    /// - Validation errors for empty input, range violations, or a
    ///   label/observation length mismatch.
    pub fn log_likelihood(&self, observations: &[usize], labels: &[usize]) -> CrfResult<f64> {
        self.check_observations(observations)?;
        if labels.len() != observations.len() {
            return Err(CrfError::SequenceLengthMismatch {
                sequence: 0,
                observations: observations.len(),
                labels: labels.len(),
            });
        }
        for (position, &label) in labels.iter().enumerate() {
            if label >= self.n_labels {
                return Err(CrfError::LabelOutOfRange {
                    sequence: 0,
                    position,
                    label,
                    n_labels: self.n_labels,
                });
            }
        }
        let view = self.view();
        Ok(view.sequence_score(observations, labels) - view.log_partition(observations))
    }

    /// Most likely labeling under the current weights.
    ///
    /// Ties break toward the lowest label index, as in the HMM decoder.
    ///
    /// # Errors
    /// - Validation errors for empty input or out-of-alphabet symbols.
    pub fn decode(&self, observations: &[usize]) -> CrfResult<Vec<usize>> {
        self.check_observations(observations)?;
        let view = self.view();
        let t_len = observations.len();
        let n_labels = self.n_labels;

        let mut previous = vec![0.0_f64; n_labels];
        let mut current = vec![0.0_f64; n_labels];
        let mut backpointers = vec![vec![0usize; n_labels]; t_len];
        for (y, slot) in previous.iter_mut().enumerate() {
            *slot = view.initial(y) + view.emission(y, observations[0]);
        }
        for t in 1..t_len {
            for y in 0..n_labels {
                let mut best_score = LOG_ZERO;
                let mut best_label = 0usize;
                for (prev, &score) in previous.iter().enumerate() {
                    let candidate = score + view.transition(prev, y);
                    if candidate > best_score {
                        best_score = candidate;
                        best_label = prev;
                    }
                }
                current[y] = best_score + view.emission(y, observations[t]);
                backpointers[t][y] = best_label;
            }
            std::mem::swap(&mut previous, &mut current);
        }

        let mut best_terminal = LOG_ZERO;
        let mut best_label = 0usize;
        for (y, &score) in previous.iter().enumerate() {
            if score > best_terminal {
                best_terminal = score;
                best_label = y;
            }
        }
        let mut labels = vec![0usize; t_len];
        labels[t_len - 1] = best_label;
        for t in (0..t_len - 1).rev() {
            labels[t] = backpointers[t + 1][labels[t + 1]];
        }
        Ok(labels)
    }
}
