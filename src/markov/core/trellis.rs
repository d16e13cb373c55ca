//! Forward/backward trellis computation in log space.
//!
//! Purpose
//! -------
//! Compute, for one observation sequence, the forward and backward
//! log-probability trellises under a model's current parameters. These
//! matrices are the raw material for every learner in the crate: the
//! posterior layer turns them into gamma/ksi statistics, the scoring entry
//! point reduces the terminal forward row, and the CRF layer mirrors the
//! same recurrences over its potentials.
//!
//! Key behaviors
//! -------------
//! - [`fill_log_emissions`] caches `ln p(xₜ | state k)` for a whole
//!   sequence (`T × K`), so each emission density is evaluated exactly
//!   once per sequence instead of once per recurrence visit.
//! - [`compute_forward_into`] / [`compute_backward_into`] run the classic
//!   log-domain recurrences into caller-owned buffers:
//!   - `fwd[0, k] = ln π[k] + ln b[k](x₀)`,
//!     `fwd[t, k] = logΣexp_i(fwd[t−1, i] + ln A[i, k]) + ln b[k](xₜ)`
//!   - `bwd[T−1, k] = 0`,
//!     `bwd[t, k] = logΣexp_j(ln A[k, j] + ln b[j](xₜ₊₁) + bwd[t+1, j])`
//! - [`compute_trellises`] orchestrates all three fills over a
//!   [`TrellisBuffers`] workspace.
//!
//! Invariants & assumptions
//! ------------------------
//! - Trellises are **unnormalized** log joint probabilities; the identity
//!   `logΣexp_k(fwd[T−1, k]) = logΣexp_k(fwd[t, k] + bwd[t, k])` holds at
//!   every `t` and is the module's acceptance test. Working in log space
//!   makes per-step rescaling unnecessary even for long sequences.
//! - Sequence length ≥ 1 is a hard precondition; zero-length input is
//!   rejected before any buffer is touched.
//! - Buffers may be **oversized**: only the first `T` rows are read or
//!   written, so one workspace sized for the longest sequence serves a
//!   whole batch.
//!
//! Conventions
//! -----------
//! - The recurrence over `t` is inherently sequential; parallelism across
//!   *sequences* (independent buffers per worker) is the learners'
//!   responsibility, never parallelism within one trellis.
//!
//! Downstream usage
//! ----------------
//! - One [`TrellisBuffers`] per worker, sized once per training call via
//!   the batch's longest sequence, reused across sequences and
//!   iterations.
//!
//! Testing notes
//! -------------
//! - Unit tests check the forward total against brute-force path
//!   enumeration, the forward/backward identity at every time step, the
//!   zero-length rejection, and the oversized-buffer contract.
use crate::markov::core::emission::EmissionModel;
use crate::markov::core::model::HiddenMarkovModel;
use crate::markov::errors::{HmmError, HmmResult};
use crate::optimization::numerical_stability::logspace::log_sum_exp;
use ndarray::Array2;

/// Per-worker scratch space for one sequence's trellises.
///
/// Holds the cached emission log-probabilities and both trellises, each
/// `capacity × n_states` with `capacity` at least the longest sequence the
/// buffer will see. Rows beyond the current sequence length hold stale
/// data by design; consumers must only read the first `T` rows.
#[derive(Debug, Clone)]
pub struct TrellisBuffers {
    pub log_emissions: Array2<f64>,
    pub log_forward: Array2<f64>,
    pub log_backward: Array2<f64>,
}

impl TrellisBuffers {
    /// Allocate buffers for sequences up to `capacity` observations over
    /// `n_states` states.
    pub fn new(capacity: usize, n_states: usize) -> Self {
        Self {
            log_emissions: Array2::zeros((capacity, n_states)),
            log_forward: Array2::zeros((capacity, n_states)),
            log_backward: Array2::zeros((capacity, n_states)),
        }
    }

    /// Grow the buffers if a longer sequence (or wider model) arrives.
    /// Existing contents are not preserved.
    pub fn ensure_capacity(&mut self, t_len: usize, n_states: usize) {
        if self.log_forward.nrows() < t_len || self.log_forward.ncols() != n_states {
            *self = Self::new(t_len, n_states);
        }
    }
}

/// Cache `ln p(xₜ | state k)` for every position and state of a sequence.
///
/// Writes into the first `sequence.len()` rows of `out`; the buffer may be
/// oversized. The emission contract guarantees each entry is finite or
/// `-∞`, never NaN.
///
/// # Errors
/// - [`HmmError::EmptySequence`] for a zero-length sequence.
pub fn fill_log_emissions<E: EmissionModel>(
    model: &HiddenMarkovModel<E>, sequence: &[E::Observation], out: &mut Array2<f64>,
) -> HmmResult<()> {
    if sequence.is_empty() {
        return Err(HmmError::EmptySequence { index: 0 });
    }
    debug_assert!(out.nrows() >= sequence.len() && out.ncols() == model.n_states());
    for (t, observation) in sequence.iter().enumerate() {
        for (k, emission) in model.emissions().iter().enumerate() {
            out[[t, k]] = emission.log_probability(observation);
        }
    }
    Ok(())
}

/// Forward recurrence into a caller-owned buffer.
///
/// `log_emissions` must already hold the cached emission rows for the
/// first `t_len` positions (see [`fill_log_emissions`]). Only the first
/// `t_len` rows of `out` are written.
///
/// # Errors
/// - [`HmmError::EmptySequence`] when `t_len == 0`.
pub fn compute_forward_into<E>(
    model: &HiddenMarkovModel<E>, log_emissions: &Array2<f64>, t_len: usize,
    out: &mut Array2<f64>,
) -> HmmResult<()> {
    if t_len == 0 {
        return Err(HmmError::EmptySequence { index: 0 });
    }
    let n_states = model.n_states();
    debug_assert!(out.nrows() >= t_len && out.ncols() == n_states);
    let log_initial = model.log_initial();
    let log_transitions = model.log_transitions();

    for k in 0..n_states {
        out[[0, k]] = log_initial[k] + log_emissions[[0, k]];
    }

    let mut terms = vec![0.0_f64; n_states];
    for t in 1..t_len {
        for k in 0..n_states {
            for (i, term) in terms.iter_mut().enumerate() {
                *term = out[[t - 1, i]] + log_transitions[[i, k]];
            }
            out[[t, k]] = log_sum_exp(&terms) + log_emissions[[t, k]];
        }
    }
    Ok(())
}

/// Backward recurrence into a caller-owned buffer.
///
/// Mirror of [`compute_forward_into`]; the terminal row is all zeros
/// (log 1) and only the first `t_len` rows of `out` are written.
///
/// # Errors
/// - [`HmmError::EmptySequence`] when `t_len == 0`.
pub fn compute_backward_into<E>(
    model: &HiddenMarkovModel<E>, log_emissions: &Array2<f64>, t_len: usize,
    out: &mut Array2<f64>,
) -> HmmResult<()> {
    if t_len == 0 {
        return Err(HmmError::EmptySequence { index: 0 });
    }
    let n_states = model.n_states();
    debug_assert!(out.nrows() >= t_len && out.ncols() == n_states);
    let log_transitions = model.log_transitions();

    for k in 0..n_states {
        out[[t_len - 1, k]] = 0.0;
    }

    let mut terms = vec![0.0_f64; n_states];
    for t in (0..t_len.saturating_sub(1)).rev() {
        for k in 0..n_states {
            for (j, term) in terms.iter_mut().enumerate() {
                *term = log_transitions[[k, j]] + log_emissions[[t + 1, j]] + out[[t + 1, j]];
            }
            out[[t, k]] = log_sum_exp(&terms);
        }
    }
    Ok(())
}

/// Fill emissions, forward, and backward trellises for one sequence.
///
/// Grows `buffers` if needed, then runs the three fills in order. After
/// this call the first `sequence.len()` rows of each buffer are valid for
/// this sequence; they remain valid until the buffers are reused.
///
/// # Errors
/// - [`HmmError::EmptySequence`] for a zero-length sequence.
pub fn compute_trellises<E: EmissionModel>(
    model: &HiddenMarkovModel<E>, sequence: &[E::Observation], buffers: &mut TrellisBuffers,
) -> HmmResult<()> {
    let t_len = sequence.len();
    buffers.ensure_capacity(t_len, model.n_states());
    fill_log_emissions(model, sequence, &mut buffers.log_emissions)?;
    compute_forward_into(model, &buffers.log_emissions, t_len, &mut buffers.log_forward)?;
    compute_backward_into(model, &buffers.log_emissions, t_len, &mut buffers.log_backward)?;
    Ok(())
}
