//! Posterior statistics (gamma/ksi) for one sequence — the E-step kernel.
//!
//! Purpose
//! -------
//! Turn a sequence's forward/backward trellises into the posterior
//! statistics expectation-maximization consumes: per-timestep state
//! occupation (gamma), per-timestep transition posteriors (ksi), and the
//! sequence's terminal log-likelihood. One call produces one sequence's
//! statistics; the learners aggregate across the batch.
//!
//! Key behaviors
//! -------------
//! - `gamma[t, k] = ln P(state k at t | sequence)`, computed as
//!   `fwd[t, k] + bwd[t, k]` and normalized per row so each row sums to
//!   one in probability space.
//! - `ksi[t][i, j] = ln P(state i at t, state j at t+1 | sequence)`,
//!   computed as `fwd[t, i] + ln A[i, j] + ln b[j](xₜ₊₁) + bwd[t+1, j]`
//!   and normalized over the whole `K × K` slab per `t`.
//! - `log_likelihood = logΣexp_k(fwd[T−1, k])`.
//! - A row (or slab) whose log-sum is `-∞` is a degenerate, unreachable
//!   configuration; it is left unnormalized (all zeros in probability
//!   space) instead of being poisoned with NaN.
//!
//! Invariants & assumptions
//! ------------------------
//! - For every reachable `t`, `logΣexp_k(gamma[t, k]) ≈ 0` and
//!   `logΣexp_{i,j}(ksi[t][i, j]) ≈ 0`.
//! - Marginalization consistency: `gamma[t, i] ≈ logΣexp_j(ksi[t][i, j])`
//!   for `t < T−1`.
//! - The trellis buffers passed in are scratch: once a sequence's
//!   statistics are computed they carry no live state for that sequence
//!   and may be reused for the next one.
//!
//! Downstream usage
//! ----------------
//! - The Baum-Welch learner computes one [`SequenceStatistics`] per
//!   sequence (parallelizable across sequences with per-worker buffers)
//!   and hands the batch to the re-estimation layer.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the normalization invariants, the
//!   gamma-from-ksi marginalization identity, the log-likelihood
//!   equality with the forward total, and the degenerate all-`-∞` path.
use crate::markov::core::emission::EmissionModel;
use crate::markov::core::model::HiddenMarkovModel;
use crate::markov::core::trellis::{TrellisBuffers, compute_trellises};
use crate::markov::errors::HmmResult;
use crate::optimization::numerical_stability::logspace::{log_normalize, log_sum_exp};
use ndarray::Array2;

/// One sequence's posterior statistics, produced by
/// [`compute_statistics`].
///
/// `gamma` is `T × K`, `ksi` holds `T − 1` matrices of `K × K` (empty for
/// a length-one sequence), both in log space and row/slab-normalized.
/// `log_likelihood` is the sequence's total forward log-probability under
/// the model that produced the statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceStatistics {
    pub gamma: Array2<f64>,
    pub ksi: Vec<Array2<f64>>,
    pub log_likelihood: f64,
}

/// Compute gamma, ksi, and the log-likelihood for one sequence.
///
/// Runs the trellis fills into `buffers`, then builds the normalized
/// posterior statistics. The buffers are pure scratch afterwards.
///
/// # Errors
/// - [`HmmError::EmptySequence`](crate::markov::errors::HmmError) for a
///   zero-length sequence.
pub fn compute_statistics<E: EmissionModel>(
    model: &HiddenMarkovModel<E>, sequence: &[E::Observation], buffers: &mut TrellisBuffers,
) -> HmmResult<SequenceStatistics> {
    compute_trellises(model, sequence, buffers)?;
    let t_len = sequence.len();
    let n_states = model.n_states();
    let log_transitions = model.log_transitions();

    let log_likelihood =
        log_sum_exp(buffers.log_forward.row(t_len - 1).as_slice().expect("row is contiguous"));

    let mut gamma = Array2::zeros((t_len, n_states));
    for t in 0..t_len {
        for k in 0..n_states {
            gamma[[t, k]] = buffers.log_forward[[t, k]] + buffers.log_backward[[t, k]];
        }
        log_normalize(gamma.row_mut(t).as_slice_mut().expect("row is contiguous"));
    }

    let mut ksi = Vec::with_capacity(t_len.saturating_sub(1));
    for t in 0..t_len.saturating_sub(1) {
        let mut slab = Array2::zeros((n_states, n_states));
        for i in 0..n_states {
            for j in 0..n_states {
                slab[[i, j]] = buffers.log_forward[[t, i]]
                    + log_transitions[[i, j]]
                    + buffers.log_emissions[[t + 1, j]]
                    + buffers.log_backward[[t + 1, j]];
            }
        }
        log_normalize(slab.as_slice_mut().expect("slab is contiguous"));
        ksi.push(slab);
    }

    Ok(SequenceStatistics { gamma, ksi, log_likelihood })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markov::core::emission::DiscreteEmission;
    use crate::markov::errors::HmmError;
    use crate::optimization::numerical_stability::logspace::LOG_ZERO;
    use ndarray::{arr1, arr2};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Gamma row and ksi slab normalization on a reachable sequence.
    // - The gamma-from-ksi marginalization identity.
    // - Equality of the reported log-likelihood with the forward total.
    // - The degenerate unreachable-sequence path (rows left at -inf).
    //
    // They intentionally DO NOT cover:
    // - Batch aggregation and weighting (re-estimation layer).
    // -------------------------------------------------------------------------

    fn reference_model() -> HiddenMarkovModel<DiscreteEmission> {
        HiddenMarkovModel::from_probabilities(
            arr1(&[0.6, 0.4]),
            arr2(&[[0.7, 0.3], [0.4, 0.6]]),
            vec![
                DiscreteEmission::from_probabilities(&[0.8, 0.2]).unwrap(),
                DiscreteEmission::from_probabilities(&[0.1, 0.9]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    // Purpose
    // -------
    // Verify the normalization invariants: every gamma row and every ksi
    // slab log-sums to ≈ 0 on a reachable sequence.
    //
    // Given
    // -----
    // - The reference model and the sequence [0, 1, 1, 0].
    //
    // Expect
    // ------
    // - |logΣexp(row)| < 1e-12 for all t in gamma, and likewise for each
    //   flattened ksi slab.
    fn gamma_rows_and_ksi_slabs_are_normalized() {
        let model = reference_model();
        let sequence = [0usize, 1, 1, 0];
        let mut buffers = TrellisBuffers::new(sequence.len(), model.n_states());

        let stats = compute_statistics(&model, &sequence, &mut buffers).unwrap();

        for t in 0..sequence.len() {
            let row_sum = log_sum_exp(stats.gamma.row(t).as_slice().unwrap());
            assert!(row_sum.abs() < 1e-12, "gamma row {t} log-sums to {row_sum}");
        }
        assert_eq!(stats.ksi.len(), sequence.len() - 1);
        for (t, slab) in stats.ksi.iter().enumerate() {
            let slab_sum = log_sum_exp(slab.as_slice().unwrap());
            assert!(slab_sum.abs() < 1e-12, "ksi slab {t} log-sums to {slab_sum}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the marginalization identity linking the two statistics:
    // summing ksi over the successor state recovers gamma.
    //
    // Given
    // -----
    // - The reference model and the sequence [0, 0, 1].
    //
    // Expect
    // ------
    // - gamma[t, i] = logΣexp_j(ksi[t][i, j]) within 1e-12 for t < T-1.
    fn ksi_marginalizes_back_to_gamma() {
        let model = reference_model();
        let sequence = [0usize, 0, 1];
        let mut buffers = TrellisBuffers::new(sequence.len(), model.n_states());

        let stats = compute_statistics(&model, &sequence, &mut buffers).unwrap();

        for (t, slab) in stats.ksi.iter().enumerate() {
            for i in 0..model.n_states() {
                let marginal = log_sum_exp(slab.row(i).as_slice().unwrap());
                let gamma = stats.gamma[[t, i]];
                assert!(
                    (marginal - gamma).abs() < 1e-12,
                    "t = {t}, i = {i}: marginal {marginal} vs gamma {gamma}"
                );
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that the reported log-likelihood is exactly the terminal
    // forward reduction, and finite on a reachable sequence.
    //
    // Given
    // -----
    // - The reference model and the sequence [1, 0].
    //
    // Expect
    // ------
    // - A finite log-likelihood equal to the model's forward scoring
    //   entry point on the same sequence.
    fn log_likelihood_matches_forward_scoring() {
        let model = reference_model();
        let sequence = [1usize, 0];
        let mut buffers = TrellisBuffers::new(sequence.len(), model.n_states());

        let stats = compute_statistics(&model, &sequence, &mut buffers).unwrap();
        let scored = model.log_likelihood(&sequence).unwrap();

        assert!(stats.log_likelihood.is_finite());
        assert_eq!(stats.log_likelihood, scored);
    }

    #[test]
    // Purpose
    // -------
    // Verify the degenerate path: a symbol no state can emit makes the
    // sequence unreachable; gamma rows stay all -inf (zeros in
    // probability space) and nothing becomes NaN.
    //
    // Given
    // -----
    // - A model whose two states emit only symbols 0 and 1, and a
    //   sequence containing symbol 2.
    //
    // Expect
    // ------
    // - log_likelihood = -inf; every gamma entry is -inf; no NaN in
    //   gamma or ksi.
    fn unreachable_sequences_stay_unnormalized_not_nan() {
        let model = HiddenMarkovModel::from_probabilities(
            arr1(&[0.5, 0.5]),
            arr2(&[[0.5, 0.5], [0.5, 0.5]]),
            vec![
                DiscreteEmission::from_probabilities(&[1.0, 0.0]).unwrap(),
                DiscreteEmission::from_probabilities(&[0.0, 1.0]).unwrap(),
            ],
        )
        .unwrap();
        let sequence = [0usize, 2, 1];
        let mut buffers = TrellisBuffers::new(sequence.len(), model.n_states());

        let stats = compute_statistics(&model, &sequence, &mut buffers).unwrap();

        assert_eq!(stats.log_likelihood, LOG_ZERO);
        assert!(stats.gamma.iter().all(|&v| v == LOG_ZERO));
        assert!(stats.gamma.iter().chain(stats.ksi.iter().flatten()).all(|v| !v.is_nan()));
    }
}
