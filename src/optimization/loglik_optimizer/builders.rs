//! loglik_optimizer::builders — solver construction helpers.
//!
//! Purpose
//! -------
//! Provide small, focused builders for the solvers used by the
//! log-likelihood optimizer. These helpers hide Argmin's generic wiring and
//! apply crate-level options (tolerances, L-BFGS memory) so that
//! higher-level code can request a configured solver without touching
//! Argmin-specific types.
//!
//! Key behaviors
//! -------------
//! - Construct L-BFGS, steepest-descent, and nonlinear-conjugate-gradient
//!   solvers with either Hager–Zhang or More–Thuente line search based on
//!   crate-level aliases.
//! - Apply optional gradient and cost-change tolerances from [`MLEOptions`]
//!   to L-BFGS via a shared configuration helper; the other solver families
//!   have no tolerance hooks and stop on `max_iter` or a line-search
//!   failure, applied by the runner layer.
//! - Leave the initial weight vector and maximum iterations to the
//!   runner/executor layer, keeping these builders side-effect free.
//!
//! Invariants & assumptions
//! ------------------------
//! - All solvers operate on the canonical numeric types [`Theta`], [`Grad`],
//!   and [`Cost`] as defined in [`types`](super::types).
//! - The L-BFGS memory (`m`) is either provided via `opts.lbfgs_mem` or
//!   defaults to [`DEFAULT_LBFGS_MEM`].
//! - Any invalid tolerance passed into Argmin's `with_tolerance_grad` /
//!   `with_tolerance_cost` is surfaced as an `OptError` via the crate's
//!   `From<Error>` implementation.
//!
//! Conventions
//! -----------
//! - The conjugate-gradient builders fix the Polak–Ribière beta update (see
//!   the aliases in `types`).
//! - Errors are always reported via [`OptResult`]; underlying
//!   `argmin::core::Error` values never leak across module boundaries.
//!
//! Downstream usage
//! ----------------
//! - [`maximize`](super::api::maximize) selects a builder from the
//!   configured `SolverKind` × `LineSearcher` pair and hands the solver to
//!   the runner together with an adapted problem.
//!
//! Testing notes
//! -------------
//! - Unit tests verify that every builder succeeds for valid options,
//!   including propagation of `lbfgs_mem` and `DEFAULT_LBFGS_MEM`.
//! - Integration tests exercise the builders indirectly by running full
//!   solves with different solver and line-search configurations.
use argmin::solver::{
    conjugategradient::{NonlinearConjugateGradient, beta::PolakRibiere},
    gradientdescent::SteepestDescent,
    quasinewton::LBFGS,
};

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::MLEOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, NcgHagerZhang, NcgMoreThuente, SteepestHagerZhang,
            SteepestMoreThuente, Theta,
        },
    },
};

/// Construct L-BFGS with the Hager–Zhang line search.
///
/// Consults `opts.lbfgs_mem` (falling back to [`DEFAULT_LBFGS_MEM`]) and
/// wires `opts.tols.tol_grad` / `opts.tols.tol_cost` into the solver.
/// Initial weights and `max_iters` are applied later by the runner.
///
/// # Errors
/// Returns an `OptError` if Argmin rejects a tolerance setting.
pub fn build_lbfgs_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct L-BFGS with the More–Thuente line search.
///
/// Identical wiring to [`build_lbfgs_hager_zhang`] apart from the
/// line-search object.
///
/// # Errors
/// Returns an `OptError` if Argmin rejects a tolerance setting.
pub fn build_lbfgs_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct steepest gradient descent with the Hager–Zhang line search.
///
/// Steepest descent exposes no tolerance hooks; termination is governed by
/// `max_iter` (applied by the runner) and line-search behavior.
pub fn build_steepest_hager_zhang(_opts: &MLEOptions) -> OptResult<SteepestHagerZhang> {
    Ok(SteepestDescent::new(HagerZhangLS::new()))
}

/// Construct steepest gradient descent with the More–Thuente line search.
pub fn build_steepest_more_thuente(_opts: &MLEOptions) -> OptResult<SteepestMoreThuente> {
    Ok(SteepestDescent::new(MoreThuenteLS::new()))
}

/// Construct nonlinear conjugate gradient (Polak–Ribière) with the
/// Hager–Zhang line search.
///
/// Like steepest descent, the CG solver stops on `max_iter` or a
/// line-search failure; tolerances in `opts` are ignored here.
pub fn build_ncg_hager_zhang(_opts: &MLEOptions) -> OptResult<NcgHagerZhang> {
    Ok(NonlinearConjugateGradient::new(HagerZhangLS::new(), PolakRibiere::new()))
}

/// Construct nonlinear conjugate gradient (Polak–Ribière) with the
/// More–Thuente line search.
pub fn build_ncg_more_thuente(_opts: &MLEOptions) -> OptResult<NcgMoreThuente> {
    Ok(NonlinearConjugateGradient::new(MoreThuenteLS::new(), PolakRibiere::new()))
}

/// Apply optional tolerances to an L-BFGS solver.
///
/// Generic helper that wires crate-level tolerance options from
/// [`MLEOptions`] into an existing L-BFGS solver, regardless of the
/// line-search type. When a tolerance is `None`, the corresponding
/// `with_tolerance_*` method is not called and Argmin's defaults remain in
/// effect.
///
/// # Errors
/// Returns an `OptError` when Argmin rejects a tolerance (e.g., a
/// non-finite or non-positive value).
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
