//! Log-domain Viterbi decoding.
//!
//! The maximum-probability path recurrence shares its shape with the
//! forward recurrence, with `max` in place of log-sum-exp and a
//! backpointer table for path reconstruction. Decoding is fully
//! deterministic: when two predecessor states yield the same path score,
//! the **lowest state index wins** (the scan keeps the first maximum and
//! only replaces it on a strictly greater score). Repeated decodes of the
//! same sequence therefore return bit-identical paths.
use crate::markov::core::emission::EmissionModel;
use crate::markov::core::model::HiddenMarkovModel;
use crate::markov::errors::{HmmError, HmmResult};
use crate::optimization::numerical_stability::logspace::LOG_ZERO;

/// Most likely state path for one sequence, with its joint
/// log-probability `ln max_path P(path, sequence)`.
///
/// Ties are broken toward the lowest state index at every step, including
/// the terminal state selection; see the module docs. A path score of
/// `-∞` means the sequence is unreachable under the model (every path has
/// probability zero); the returned path is then the all-lowest-index path
/// and callers should treat the score as the meaningful signal.
///
/// # Errors
/// - [`HmmError::EmptySequence`] for a zero-length sequence.
pub fn viterbi_decode<E: EmissionModel>(
    model: &HiddenMarkovModel<E>, sequence: &[E::Observation],
) -> HmmResult<(Vec<usize>, f64)> {
    let t_len = sequence.len();
    if t_len == 0 {
        return Err(HmmError::EmptySequence { index: 0 });
    }
    let n_states = model.n_states();
    let log_initial = model.log_initial();
    let log_transitions = model.log_transitions();

    // delta[k]: best path log-score ending in state k at the current step.
    let mut delta = vec![0.0_f64; n_states];
    let mut previous_delta = vec![0.0_f64; n_states];
    // backpointers[t][k]: argmax predecessor of state k at step t.
    let mut backpointers = vec![vec![0usize; n_states]; t_len];

    for (k, slot) in previous_delta.iter_mut().enumerate() {
        *slot = log_initial[k] + model.emission(k).log_probability(&sequence[0]);
    }

    for (t, observation) in sequence.iter().enumerate().skip(1) {
        for k in 0..n_states {
            let mut best_score = LOG_ZERO;
            let mut best_state = 0usize;
            for (i, &score) in previous_delta.iter().enumerate() {
                let candidate = score + log_transitions[[i, k]];
                if candidate > best_score {
                    best_score = candidate;
                    best_state = i;
                }
            }
            delta[k] = best_score + model.emission(k).log_probability(observation);
            backpointers[t][k] = best_state;
        }
        std::mem::swap(&mut delta, &mut previous_delta);
    }

    let mut best_final = LOG_ZERO;
    let mut best_state = 0usize;
    for (k, &score) in previous_delta.iter().enumerate() {
        if score > best_final {
            best_final = score;
            best_state = k;
        }
    }

    let mut path = vec![0usize; t_len];
    path[t_len - 1] = best_state;
    for t in (0..t_len - 1).rev() {
        path[t] = backpointers[t + 1][path[t + 1]];
    }

    Ok((path, best_final))
}
