use super::timing::TimingBreakdown;
use serde::Serialize;

/// Terminal state of the iterative solve. Neither state is an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SolveOutcome {
    /// The summed squared update dropped below the threshold.
    Converged,
    /// The iteration cap was hit first; the partial solution is kept.
    MaxIterationsReached,
}

/// Summary of one run of the Poisson solver.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    /// Completed black + red iterations.
    pub iterations: usize,
    /// Summed squared update of the last iteration.
    pub residual: f32,
    /// Convergence threshold `epsilon² · w²`.
    pub threshold: f32,
    /// Relaxation factor `w`.
    pub relaxation: f32,
    pub active_cells: usize,
    /// Residual per iteration, filled only when requested in the options.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub residual_history: Vec<f32>,
}

/// Result of a healing call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealReport {
    pub width: usize,
    pub height: usize,
    pub solve: SolveReport,
    pub timings: TimingBreakdown,
}

impl HealReport {
    /// True when the destination was left untouched because no mask cell
    /// was active.
    pub fn is_noop(&self) -> bool {
        self.solve.active_cells == 0
    }
}
