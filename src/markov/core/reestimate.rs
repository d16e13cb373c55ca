//! Parameter re-estimation from accumulated posteriors — the M-step.
//!
//! Purpose
//! -------
//! Re-estimate a model's initial-state vector, transition matrix, and
//! per-state emission parameters in place from a batch of per-sequence
//! gamma/ksi statistics, with the degeneracy guards that keep a training
//! run alive when states become unreachable.
//!
//! Key behaviors
//! -------------
//! - Initial: `ln π[i] = logΣexp_k(w_k + γ_k[0, i]) − logΣexp_k(w_k)`
//!   (with `w_k` the per-sequence log-weights; unweighted batches reduce
//!   this to the mean over sequences).
//! - Transitions:
//!   `ln A[i, j] = logΣexp_{k,t}(w_k + ξ_k[t][i, j]) −
//!                 logΣexp_{k,t}(w_k + γ_k[t, i])`, with `t < T_k − 1` in
//!   both reductions.
//! - Emissions: per state `i`, the pooled per-sample weight is
//!   `exp(w_k + γ_k[t, i] − normalizer_i)` with the normalizer taken over
//!   all samples; any NaN/∞ weight is clamped to zero before the
//!   distribution's `fit` sees it.
//!
//! Invariants & assumptions
//! ------------------------
//! - Guards:
//!   - a `+∞` entry in the existing transition matrix is left untouched
//!     (an already-degenerate entry must not silently re-normalize the
//!     row it corrupted);
//!   - an exactly-equal numerator/denominator maps to `0.0` (log 1)
//!     instead of evaluating `∞ − ∞` — this covers both the genuine
//!     probability-one transition and the never-occupied state;
//!   - an all-zero-mass batch (every log-weight `-∞`) leaves the model
//!     unchanged entirely.
//! - Structural zeros survive: `exp(-∞)` contributes no mass, so a
//!   forbidden transition's numerator stays `-∞` and the entry stays
//!   `-∞` after the update.
//! - After every update, no parameter is NaN (debug-asserted).
//!
//! Conventions
//! -----------
//! - `pooled` is the batch's observations flattened in sequence order
//!   (see `TrainingSet::pooled_observations`); `statistics[k]` must be
//!   the statistics of `training.sequence(k)` under the *current* model.
//!
//! Downstream usage
//! ----------------
//! - Called once per Baum-Welch iteration, after the batch E-step and the
//!   convergence check, never after the convergence-triggering E-step.
//!
//! Testing notes
//! -------------
//! - Unit tests verify row-stochasticity after an update, zero-weight
//!   sequences dropping out, preservation of `+∞` entries and structural
//!   zeros, and the NaN-clamping of emission weights.
use crate::markov::core::data::TrainingSet;
use crate::markov::core::emission::{EmissionModel, FitOptions};
use crate::markov::core::model::HiddenMarkovModel;
use crate::markov::core::posteriors::SequenceStatistics;
use crate::markov::errors::{HmmError, HmmResult};
use crate::optimization::numerical_stability::logspace::{LOG_ZERO, log_sum_exp_pair};

/// Re-estimate all model parameters in place from batch statistics.
///
/// See the module docs for the exact update formulas and guards.
///
/// # Arguments
/// - `model`: the model to update; must be the model that produced
///   `statistics`.
/// - `training`: the batch (supplies per-sequence log-weights).
/// - `pooled`: `training`'s observations flattened in sequence order.
/// - `statistics`: one entry per sequence, in batch order.
/// - `options`: emission fitting options.
///
/// # Errors
/// - Lifts [`EmissionError`](crate::markov::errors::EmissionError) from a
///   distribution's `fit` (structural problems only; degenerate weights
///   are handled by clamping and the fit contract's no-op fallback).
pub fn reestimate_parameters<E: EmissionModel>(
    model: &mut HiddenMarkovModel<E>, training: &TrainingSet<E::Observation>,
    pooled: &[E::Observation], statistics: &[SequenceStatistics], options: &FitOptions,
) -> HmmResult<()> {
    debug_assert_eq!(training.len(), statistics.len());
    let n_states = model.n_states();

    let log_batch_mass = (0..training.len())
        .map(|k| training.log_weight(k))
        .fold(LOG_ZERO, log_sum_exp_pair);
    if log_batch_mass == LOG_ZERO {
        return Ok(());
    }

    reestimate_initial(model, training, statistics, log_batch_mass);
    reestimate_transitions(model, training, statistics);
    reestimate_emissions(model, training, pooled, statistics, options)?;

    model.debug_assert_nan_free();
    Ok(())
}

/// Initial-state update: weighted log-mean of the first gamma row.
fn reestimate_initial<E>(
    model: &mut HiddenMarkovModel<E>, training: &TrainingSet<E::Observation>,
    statistics: &[SequenceStatistics], log_batch_mass: f64,
) where
    E: EmissionModel,
{
    for i in 0..model.n_states() {
        let numerator = statistics
            .iter()
            .enumerate()
            .map(|(k, stats)| training.log_weight(k) + stats.gamma[[0, i]])
            .fold(LOG_ZERO, log_sum_exp_pair);
        model.log_initial[i] = if numerator == log_batch_mass {
            0.0
        } else {
            numerator - log_batch_mass
        };
    }
}

/// Transition update with the `+∞`-preservation and `num == den` guards.
fn reestimate_transitions<E>(
    model: &mut HiddenMarkovModel<E>, training: &TrainingSet<E::Observation>,
    statistics: &[SequenceStatistics],
) where
    E: EmissionModel,
{
    let n_states = model.n_states();
    for i in 0..n_states {
        let denominator = statistics
            .iter()
            .enumerate()
            .flat_map(|(k, stats)| {
                let log_weight = training.log_weight(k);
                // Occupation mass over t < T-1 only, matching the ksi range.
                (0..stats.ksi.len()).map(move |t| (stats, log_weight, t))
            })
            .map(|(stats, log_weight, t)| log_weight + stats.gamma[[t, i]])
            .fold(LOG_ZERO, log_sum_exp_pair);

        for j in 0..n_states {
            if model.log_transitions[[i, j]] == f64::INFINITY {
                continue;
            }
            let numerator = statistics
                .iter()
                .enumerate()
                .flat_map(|(k, stats)| {
                    let log_weight = training.log_weight(k);
                    stats.ksi.iter().map(move |slab| log_weight + slab[[i, j]])
                })
                .fold(LOG_ZERO, log_sum_exp_pair);

            model.log_transitions[[i, j]] =
                if numerator == denominator { 0.0 } else { numerator - denominator };
        }
    }
}

/// Emission update: pooled posterior weights, clamped, handed to `fit`.
fn reestimate_emissions<E: EmissionModel>(
    model: &mut HiddenMarkovModel<E>, training: &TrainingSet<E::Observation>,
    pooled: &[E::Observation], statistics: &[SequenceStatistics], options: &FitOptions,
) -> HmmResult<()> {
    let n_states = model.n_states();
    let mut weights = vec![0.0_f64; pooled.len()];

    for i in 0..n_states {
        let normalizer = statistics
            .iter()
            .enumerate()
            .flat_map(|(k, stats)| {
                let log_weight = training.log_weight(k);
                (0..stats.gamma.nrows()).map(move |t| log_weight + stats.gamma[[t, i]])
            })
            .fold(LOG_ZERO, log_sum_exp_pair);

        let mut sample = 0usize;
        for (k, stats) in statistics.iter().enumerate() {
            let log_weight = training.log_weight(k);
            for t in 0..stats.gamma.nrows() {
                let weight = (log_weight + stats.gamma[[t, i]] - normalizer).exp();
                weights[sample] = if weight.is_finite() { weight } else { 0.0 };
                sample += 1;
            }
        }
        debug_assert_eq!(sample, pooled.len());

        model.emissions[i]
            .fit(pooled, &weights, options)
            .map_err(HmmError::from)?;
    }
    Ok(())
}
