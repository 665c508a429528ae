//! Knobs controlling the healing solver.
//!
//! Defaults reproduce the classic healing-brush behaviour: at most 1000
//! red/black iterations and a per-channel tolerance of a tenth of an 8-bit
//! quantization step.

use serde::Deserialize;

/// Iteration cap used when no options are given.
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;

/// Residual tolerance used when no options are given.
pub const DEFAULT_EPSILON: f32 = 0.1 / 255.0;

/// Parameters of the Gauss-Seidel/SOR solve.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HealOptions {
    /// Hard cap on full (black + red) iterations.
    pub max_iterations: usize,
    /// Per-channel tolerance; the solve stops once the summed squared update
    /// of one iteration drops below `epsilon² · w²`.
    pub epsilon: f32,
    /// Keep the residual of every iteration in the solve report.
    pub record_residuals: bool,
    /// Row-level parallelism for split, relaxation and merge.
    pub parallel: ParallelOptions,
}

impl Default for HealOptions {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            epsilon: DEFAULT_EPSILON,
            record_residuals: false,
            parallel: ParallelOptions::default(),
        }
    }
}

impl HealOptions {
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_residual_history(mut self) -> Self {
        self.record_residuals = true;
        self
    }

    pub fn with_parallel(mut self, parallel: ParallelOptions) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Controls whether row loops run sequentially or with Rayon.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ParallelOptions {
    enabled: bool,
    min_rows_for_parallel: usize,
}

impl ParallelOptions {
    /// Construct explicit options.
    pub fn new(enabled: bool, min_rows_for_parallel: usize) -> Self {
        Self {
            enabled,
            min_rows_for_parallel: min_rows_for_parallel.max(1),
        }
    }

    /// Disable parallel execution regardless of image size.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_rows_for_parallel: usize::MAX,
        }
    }

    /// Returns true when a loop over `rows` rows should use Rayon.
    pub fn should_parallelize(&self, rows: usize) -> bool {
        cfg!(feature = "parallel") && self.enabled && rows >= self.min_rows_for_parallel
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_rows_for_parallel: 16,
        }
    }
}
