//! Convergence control for iterative training loops.
//!
//! Purpose
//! -------
//! Track a scalar objective (the batch mean log-likelihood) across
//! training iterations and decide when to stop: tolerance reached,
//! iteration budget exhausted, or external cancellation. The monitor is a
//! small state machine owned by the learner — never by the model — so two
//! learners can never share convergence state by accident.
//!
//! Key behaviors
//! -------------
//! - [`ConvergenceMonitor::observe`] consumes one objective value per
//!   iteration and returns the resulting [`MonitorState`].
//! - The change criterion is `|Δ| ≤ tolerance`, with `Δ` relative to the
//!   previous objective's magnitude by default (absolute when configured),
//!   and must hold for a configured number of **consecutive** checks
//!   before `Converged` is reached.
//! - Cancellation is cooperative: a [`CancelToken`] shared with the caller
//!   is polled at each `observe`, i.e. between outer-loop iterations, so
//!   in-flight sequence computations always finish.
//!
//! Invariants & assumptions
//! ------------------------
//! - The first observation can never converge (there is no previous value
//!   to compare against; the monitor starts from `-∞`).
//! - All three terminal states are absorbing: further `observe` calls
//!   return the terminal state unchanged.
//! - `max_iterations == 0` means no iteration cap.
//!
//! Conventions
//! -----------
//! - When tolerance and the iteration cap trigger on the same
//!   observation, `Converged` wins — the distinction matters to callers
//!   reading `has_converged`.
//!
//! Downstream usage
//! ----------------
//! - Learners construct one monitor per `learn` call from their
//!   [`LearnOptions`](crate::markov::core::options::LearnOptions), feed it
//!   the iteration objective, and stop on any non-`Running` state.
//!
//! Testing notes
//! -------------
//! - Unit tests drive each transition: tolerance (with consecutive-pass
//!   requirement), iteration cap, cancellation, absorbing behavior, and
//!   the relative-vs-absolute criterion.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cooperative cancellation signal.
///
/// Cloning shares the underlying flag; the caller keeps one clone and
/// hands another to the learner's options. Checked between iterations
/// only — cancelling mid-batch lets the in-flight batch finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Fresh, un-cancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Training-loop state as seen by the convergence monitor.
///
/// `Running` is the only non-terminal state; the three terminal states
/// distinguish *why* the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Running,
    Converged,
    MaxIterationsReached,
    Cancelled,
}

/// Objective tracker deciding when an iterative learner stops.
///
/// Construct via [`ConvergenceMonitor::new`], feed one objective per
/// iteration to [`observe`](ConvergenceMonitor::observe), and read the
/// returned state. See the module docs for the exact semantics.
#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    tolerance: f64,
    max_iterations: usize,
    required_passes: usize,
    relative: bool,
    token: CancelToken,
    iteration: usize,
    previous_objective: f64,
    current_objective: f64,
    consecutive_passes: usize,
    state: MonitorState,
}

impl ConvergenceMonitor {
    /// Construct a monitor.
    ///
    /// # Arguments
    /// - `tolerance`: threshold on `|Δ|` (validated by the options layer).
    /// - `max_iterations`: iteration cap; 0 disables the cap.
    /// - `required_passes`: consecutive within-tolerance checks required
    ///   before `Converged` (≥ 1).
    /// - `relative`: divide `|Δ|` by `|previous|` when the previous
    ///   objective is finite and nonzero.
    /// - `token`: shared cancellation flag.
    pub fn new(
        tolerance: f64, max_iterations: usize, required_passes: usize, relative: bool,
        token: CancelToken,
    ) -> Self {
        Self {
            tolerance,
            max_iterations,
            required_passes,
            relative,
            token,
            iteration: 0,
            previous_objective: f64::NEG_INFINITY,
            current_objective: f64::NEG_INFINITY,
            consecutive_passes: 0,
            state: MonitorState::Running,
        }
    }

    /// Feed one iteration's objective and return the resulting state.
    ///
    /// Terminal states are absorbing; observing after termination returns
    /// the terminal state without consuming the value.
    pub fn observe(&mut self, objective: f64) -> MonitorState {
        if self.state != MonitorState::Running {
            return self.state;
        }
        if self.token.is_cancelled() {
            self.state = MonitorState::Cancelled;
            return self.state;
        }

        self.iteration += 1;
        self.previous_objective = self.current_objective;
        self.current_objective = objective;

        let delta = self.change_magnitude();
        if delta <= self.tolerance {
            self.consecutive_passes += 1;
        } else {
            self.consecutive_passes = 0;
        }

        if self.consecutive_passes >= self.required_passes {
            self.state = MonitorState::Converged;
        } else if self.max_iterations > 0 && self.iteration >= self.max_iterations {
            self.state = MonitorState::MaxIterationsReached;
        }
        self.state
    }

    /// `|Δ|` between the two most recent objectives, scaled per the
    /// relative/absolute setting; `+∞` while no previous value exists.
    pub fn change_magnitude(&self) -> f64 {
        if self.previous_objective == f64::NEG_INFINITY {
            return f64::INFINITY;
        }
        let raw = (self.current_objective - self.previous_objective).abs();
        if self.relative && self.previous_objective != 0.0 {
            raw / self.previous_objective.abs()
        } else {
            raw
        }
    }

    /// Current state.
    pub fn state(&self) -> MonitorState {
        self.state
    }

    /// `true` exactly when the monitor stopped on tolerance (not on the
    /// iteration cap or cancellation).
    pub fn has_converged(&self) -> bool {
        self.state == MonitorState::Converged
    }

    /// Number of objectives observed so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Most recent objective (`-∞` before the first observation).
    pub fn current_objective(&self) -> f64 {
        self.current_objective
    }

    /// Second most recent objective (`-∞` before the second observation).
    pub fn previous_objective(&self) -> f64 {
        self.previous_objective
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Each terminal transition: Converged (with consecutive passes),
    //   MaxIterationsReached, Cancelled.
    // - Precedence of Converged over the iteration cap.
    // - Absorbing behavior of terminal states.
    // - The relative vs absolute change criterion.
    //
    // They intentionally DO NOT cover:
    // - Integration with the learners (learner tests).
    // -------------------------------------------------------------------------

    fn monitor(tolerance: f64, max_iterations: usize, passes: usize) -> ConvergenceMonitor {
        ConvergenceMonitor::new(tolerance, max_iterations, passes, false, CancelToken::new())
    }

    #[test]
    // Purpose
    // -------
    // Verify that the first observation can never converge and that a
    // two-pass requirement needs two consecutive flat observations.
    //
    // Given
    // -----
    // - Tolerance 1e-3, required_passes 2, objectives
    //   [-10, -10, -5, -5, -5].
    //
    // Expect
    // ------
    // - Running, Running (pass 1), Running (reset), Running (pass 1),
    //   Converged (pass 2).
    fn convergence_requires_consecutive_passes() {
        let mut m = monitor(1e-3, 0, 2);
        assert_eq!(m.observe(-10.0), MonitorState::Running);
        assert_eq!(m.observe(-10.0), MonitorState::Running);
        assert_eq!(m.observe(-5.0), MonitorState::Running);
        assert_eq!(m.observe(-5.0), MonitorState::Running);
        assert_eq!(m.observe(-5.0), MonitorState::Converged);
        assert!(m.has_converged());
        assert_eq!(m.iteration(), 5);
    }

    #[test]
    // Purpose
    // -------
    // Verify the iteration cap and its distinction from convergence.
    //
    // Given
    // -----
    // - Tolerance 1e-12, max_iterations 3, strictly improving objectives.
    //
    // Expect
    // ------
    // - Running, Running, MaxIterationsReached; `has_converged` false.
    fn iteration_cap_terminates_without_convergence() {
        let mut m = monitor(1e-12, 3, 1);
        assert_eq!(m.observe(-10.0), MonitorState::Running);
        assert_eq!(m.observe(-8.0), MonitorState::Running);
        assert_eq!(m.observe(-6.0), MonitorState::MaxIterationsReached);
        assert!(!m.has_converged());
    }

    #[test]
    // Purpose
    // -------
    // Verify that convergence wins when tolerance and the cap trigger on
    // the same observation.
    //
    // Given
    // -----
    // - max_iterations 2 and a flat second observation within tolerance.
    //
    // Expect
    // ------
    // - The second observation yields Converged, not
    //   MaxIterationsReached.
    fn convergence_takes_precedence_over_the_cap() {
        let mut m = monitor(1e-3, 2, 1);
        assert_eq!(m.observe(-4.0), MonitorState::Running);
        assert_eq!(m.observe(-4.0), MonitorState::Converged);
    }

    #[test]
    // Purpose
    // -------
    // Verify cooperative cancellation: once the shared token is
    // cancelled, the next observation transitions to Cancelled without
    // counting an iteration, and the state is absorbing.
    //
    // Given
    // -----
    // - A token cancelled after the first observation.
    //
    // Expect
    // ------
    // - Cancelled on the second observe; iteration stays 1; further
    //   observes stay Cancelled.
    fn cancellation_is_cooperative_and_absorbing() {
        let token = CancelToken::new();
        let mut m = ConvergenceMonitor::new(1e-6, 0, 1, false, token.clone());
        assert_eq!(m.observe(-3.0), MonitorState::Running);

        token.cancel();
        assert_eq!(m.observe(-2.0), MonitorState::Cancelled);
        assert_eq!(m.iteration(), 1);
        assert_eq!(m.observe(-1.0), MonitorState::Cancelled);
        assert_eq!(m.iteration(), 1);
    }

    #[test]
    // Purpose
    // -------
    // Verify the relative criterion scales the change by the previous
    // magnitude: a 0.5 absolute change on an objective of -1000 passes a
    // 1e-3 relative tolerance, while the same change on -1 does not.
    //
    // Given
    // -----
    // - Relative monitors fed [-1000, -999.5] and [-1, -0.5].
    //
    // Expect
    // ------
    // - Converged for the first pair, Running for the second.
    fn relative_criterion_scales_by_magnitude() {
        let mut large =
            ConvergenceMonitor::new(1e-3, 0, 1, true, CancelToken::new());
        large.observe(-1000.0);
        assert_eq!(large.observe(-999.5), MonitorState::Converged);

        let mut small = ConvergenceMonitor::new(1e-3, 0, 1, true, CancelToken::new());
        small.observe(-1.0);
        assert_eq!(small.observe(-0.5), MonitorState::Running);
    }
}
