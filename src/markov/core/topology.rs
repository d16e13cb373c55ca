//! Transition topologies for newly constructed models.
//!
//! A topology fixes which state transitions are allowed and supplies the
//! initial log-parameters for a model of a given size: allowed transitions
//! start uniform over each row's support, forbidden ones start (and stay —
//! re-estimation cannot resurrect a zero) at `-∞`. Topologies are consumed
//! only at model-creation time; afterwards the model owns its parameters.
use crate::markov::errors::{ParamError, ParamResult};
use crate::optimization::numerical_stability::logspace::LOG_ZERO;
use ndarray::{Array1, Array2};

/// Allowed pattern of nonzero state transitions.
///
/// Variants:
/// - `Ergodic`: fully connected; every state can start and every
///   transition is allowed. Initial distribution and every transition row
///   start uniform.
/// - `LeftToRight { allow_skip }`: states are ordered and transitions only
///   move forward (`j ≥ i`); the chain always starts in state 0. With
///   `allow_skip` false a state may only hold or advance by one; with it
///   true a single-state skip (`j ≤ i + 2`) is also allowed. The last
///   state is absorbing in both cases.
///
/// A zero in the transition structure is permanent under both Baum-Welch
/// and Viterbi re-estimation: `exp(-∞)` contributes no expected counts, so
/// the forward (left-to-right) structure survives training. This is the
/// property that makes left-to-right models trainable without masking
/// logic in the M-step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Ergodic,
    LeftToRight { allow_skip: bool },
}

impl Topology {
    /// Build initial log-parameters for a model with `n_states` states.
    ///
    /// # Returns
    /// `(log_initial, log_transitions)` where each row of
    /// `log_transitions` is uniform over its allowed successors and
    /// `log_initial` is uniform (`Ergodic`) or concentrated on state 0
    /// (`LeftToRight`).
    ///
    /// # Errors
    /// - [`ParamError::InvalidStateCount`] when `n_states == 0`.
    pub fn build(&self, n_states: usize) -> ParamResult<(Array1<f64>, Array2<f64>)> {
        if n_states == 0 {
            return Err(ParamError::InvalidStateCount { count: 0 });
        }
        match self {
            Topology::Ergodic => {
                let log_uniform = -(n_states as f64).ln();
                let log_initial = Array1::from_elem(n_states, log_uniform);
                let log_transitions = Array2::from_elem((n_states, n_states), log_uniform);
                Ok((log_initial, log_transitions))
            }
            Topology::LeftToRight { allow_skip } => {
                let mut log_initial = Array1::from_elem(n_states, LOG_ZERO);
                log_initial[0] = 0.0;

                let reach = if *allow_skip { 2 } else { 1 };
                let mut log_transitions = Array2::from_elem((n_states, n_states), LOG_ZERO);
                for i in 0..n_states {
                    let last = (i + reach).min(n_states - 1);
                    let fanout = (last - i + 1) as f64;
                    for j in i..=last {
                        log_transitions[[i, j]] = -fanout.ln();
                    }
                }
                Ok((log_initial, log_transitions))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::numerical_stability::logspace::log_sum_exp;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Row-stochasticity of both topologies' initial parameters.
    // - The structural zeros of the left-to-right variants.
    //
    // They intentionally DO NOT cover:
    // - Preservation of zeros under training (integration tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that the ergodic topology yields uniform, row-stochastic
    // parameters.
    //
    // Given
    // -----
    // - A 4-state ergodic build.
    //
    // Expect
    // ------
    // - Initial mass and every transition row log-sum to ≈ 0.
    // - Every entry equals -ln(4).
    fn ergodic_build_is_uniform_and_row_stochastic() {
        let (log_initial, log_transitions) = Topology::Ergodic.build(4).unwrap();

        assert!(log_sum_exp(log_initial.as_slice().unwrap()).abs() < 1e-12);
        let expected = -(4.0_f64).ln();
        for row in log_transitions.rows() {
            assert!(log_sum_exp(row.as_slice().unwrap()).abs() < 1e-12);
            assert!(row.iter().all(|&v| (v - expected).abs() < 1e-12));
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the forward structure: no backward transitions, the start
    // concentrated on state 0, the last state absorbing, and skip width
    // honored.
    //
    // Given
    // -----
    // - 4-state left-to-right builds with and without skip.
    //
    // Expect
    // ------
    // - log_initial = [0, -inf, -inf, -inf].
    // - Without skip: row i allows exactly {i, i+1}; with skip also i+2.
    // - Rows remain row-stochastic; row 3 is absorbing.
    fn left_to_right_builds_respect_structure() {
        for &allow_skip in &[false, true] {
            let (log_initial, log_transitions) =
                Topology::LeftToRight { allow_skip }.build(4).unwrap();

            assert_eq!(log_initial[0], 0.0);
            assert!(log_initial.iter().skip(1).all(|&v| v == LOG_ZERO));

            let reach = if allow_skip { 2 } else { 1 };
            for i in 0..4 {
                let row = log_transitions.row(i);
                assert!(log_sum_exp(row.as_slice().unwrap()).abs() < 1e-12, "row {i}");
                for j in 0..4 {
                    let allowed = j >= i && j <= (i + reach).min(3);
                    assert_eq!(
                        row[j] == LOG_ZERO,
                        !allowed,
                        "allow_skip={allow_skip}, transition {i}->{j}"
                    );
                }
            }
            assert_eq!(log_transitions[[3, 3]], 0.0, "last state must be absorbing");
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the zero-state rejection shared by both topologies.
    //
    // Given
    // -----
    // - `n_states = 0`.
    //
    // Expect
    // ------
    // - `InvalidStateCount { count: 0 }` from either variant.
    fn zero_states_are_rejected() {
        assert_eq!(
            Topology::Ergodic.build(0).unwrap_err(),
            ParamError::InvalidStateCount { count: 0 }
        );
        assert_eq!(
            Topology::LeftToRight { allow_skip: true }.build(0).unwrap_err(),
            ParamError::InvalidStateCount { count: 0 }
        );
    }
}
