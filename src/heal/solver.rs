//! Red/black Gauss-Seidel with successive over-relaxation.
//!
//! The solver relaxes the difference field towards a solution of the Laplace
//! equation over the active mask cells, with the values of the inactive
//! cells acting as fixed (Dirichlet) boundary conditions.
//!
//! One iteration is a black sub-pass followed by a red sub-pass. A sub-pass
//! writes only cells of its own color and reads only the opposite color, so
//! rows can be relaxed concurrently without locks. The second sub-pass reads
//! the values written by the first, which is what makes this Gauss-Seidel
//! rather than Jacobi.
//!
//! Per active cell, with `a` the number of neighbors inside the image:
//!
//! ```text
//! diff = w · (a·old − (up + down + left + right))
//! new  = old − diff
//! ```
//!
//! Neighbors outside the image contribute nothing and lower `a` by one.
use super::alloc::ScratchAllocator;
use super::checkerboard::{CheckerboardBuffer, Color};
use super::error::HealError;
use super::options::HealOptions;
use super::runs::{self, EncodedMask, Run, RunList};
use crate::diagnostics::{SolveOutcome, SolveReport};
use crate::image::CHANNELS;
use log::{debug, warn};

/// Channels contributing to the residual; the alignment slot is relaxed but
/// not measured.
const COLOR_CHANNELS: usize = 3;

static NO_NEIGHBOR: [f32; CHANNELS] = [0.0; CHANNELS];

/// Empirical over-relaxation factor for `active` cells, pre-scaled by 1/4.
///
/// Benchmarked on round brushes; elongated masks converge with it as well,
/// only more slowly.
pub fn relaxation_factor(active: usize) -> f32 {
    (2.0 - 1.0 / (0.1575 * (active as f32).sqrt() + 0.8)) * 0.25
}

/// Convergence threshold on the summed squared update of one iteration.
pub fn convergence_threshold(epsilon: f32, w: f32) -> f32 {
    epsilon * epsilon * w * w
}

/// Solver bound to one mask; reusable across fields of the same size.
#[derive(Clone, Debug)]
pub struct PoissonSolver {
    width: usize,
    height: usize,
    encoded: EncodedMask,
    w: f32,
    options: HealOptions,
}

impl PoissonSolver {
    /// Encode `mask` into run lists and derive the relaxation factor.
    pub fn new<A: ScratchAllocator>(
        mask: &[f32],
        width: usize,
        height: usize,
        options: &HealOptions,
        alloc: &A,
    ) -> Result<Self, HealError> {
        let encoded = runs::encode(mask, width, height, alloc)?;
        let w = relaxation_factor(encoded.active);
        debug!(
            "PoissonSolver: {}x{} mask, {} active cells ({} red runs, {} black runs), w={:.4}",
            width,
            height,
            encoded.active,
            encoded.red.len(),
            encoded.black.len(),
            w
        );
        Ok(Self {
            width,
            height,
            encoded,
            w,
            options: options.clone(),
        })
    }

    pub fn active_cells(&self) -> usize {
        self.encoded.active
    }

    /// Relaxation factor `w` (already scaled by 1/4).
    pub fn relaxation(&self) -> f32 {
        self.w
    }

    pub fn threshold(&self) -> f32 {
        convergence_threshold(self.options.epsilon, self.w)
    }

    pub fn runs(&self) -> &EncodedMask {
        &self.encoded
    }

    /// Iterate until the residual drops below the threshold or the iteration
    /// cap is hit. Reaching the cap is not an error: the partially relaxed
    /// field is left in `field`.
    pub fn solve(&self, field: &mut CheckerboardBuffer) -> SolveReport {
        let threshold = self.threshold();
        let mut report = self.idle_report();
        if self.encoded.active == 0 {
            return report;
        }

        report.outcome = SolveOutcome::MaxIterationsReached;
        for _ in 0..self.options.max_iterations {
            let residual = self.relax(field, Color::Black) + self.relax(field, Color::Red);
            report.iterations += 1;
            report.residual = residual;
            if self.options.record_residuals {
                report.residual_history.push(residual);
            }
            if residual < threshold {
                report.outcome = SolveOutcome::Converged;
                break;
            }
        }

        match report.outcome {
            SolveOutcome::Converged => debug!(
                "PoissonSolver: converged after {} iterations (residual {:.3e} < {:.3e})",
                report.iterations, report.residual, threshold
            ),
            SolveOutcome::MaxIterationsReached => warn!(
                "PoissonSolver: stopped at iteration cap {} (residual {:.3e}, threshold {:.3e})",
                report.iterations, report.residual, threshold
            ),
        }
        report
    }

    /// Report of a solve that performed no iteration.
    pub fn idle_report(&self) -> SolveReport {
        SolveReport {
            outcome: SolveOutcome::Converged,
            iterations: 0,
            residual: 0.0,
            threshold: self.threshold(),
            relaxation: self.w,
            active_cells: self.encoded.active,
            residual_history: Vec::new(),
        }
    }

    /// Run one sub-pass over the cells of `color` and return the summed
    /// squared update of the color channels.
    pub fn relax(&self, field: &mut CheckerboardBuffer, color: Color) -> f32 {
        let stride = field.row_stride();
        if stride == 0 {
            return 0.0;
        }
        let geometry = RowGeometry {
            stride,
            sub_width: field.sub_width(),
            width: self.width,
            height: self.height,
            w: self.w,
        };
        let runs: &RunList = self.encoded.runs(color);
        let (active, neighbor) = field.split_mut(color);
        let kernel = |(r, row): (usize, &mut [f32])| -> f32 {
            let row_runs = runs.row(r);
            if row_runs.is_empty() {
                return 0.0;
            }
            // 0 when `color` owns the even raster columns of this row
            let offset = usize::from(Color::first_in_row(r - 1) != color);
            relax_row(row, neighbor, r, offset, row_runs, &geometry)
        };

        if self.options.parallel.should_parallelize(self.height) {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                return active
                    .par_chunks_mut(stride)
                    .enumerate()
                    .map(&kernel)
                    .sum();
            }
        }

        active.chunks_mut(stride).enumerate().map(&kernel).sum()
    }
}

struct RowGeometry {
    stride: usize,
    sub_width: usize,
    width: usize,
    height: usize,
    w: f32,
}

/// Relax the runs of padded row `r`. `row` is that row of the active color,
/// `neighbor` the whole opposite-color array.
fn relax_row(
    row: &mut [f32],
    neighbor: &[f32],
    r: usize,
    offset: usize,
    runs: &[Run],
    g: &RowGeometry,
) -> f32 {
    let up = &neighbor[(r - 1) * g.stride..r * g.stride];
    let side = &neighbor[r * g.stride..(r + 1) * g.stride];
    let down = &neighbor[(r + 1) * g.stride..(r + 2) * g.stride];
    let mut a = 4.0f32;
    if r == 1 {
        a -= 1.0;
    }
    if r == g.height {
        a -= 1.0;
    }

    let mut err = 0.0f32;
    for run in runs {
        let first = run.start - r * g.sub_width;
        if run.count == 1 {
            let col = first;
            let x = 2 * col + offset;
            let mut aa = a;
            let left = if x >= 1 {
                let i = (col + offset - 1) * CHANNELS;
                &side[i..i + CHANNELS]
            } else {
                aa -= 1.0;
                &NO_NEIGHBOR[..]
            };
            let right = if x + 1 < g.width {
                let i = (col + offset) * CHANNELS;
                &side[i..i + CHANNELS]
            } else {
                aa -= 1.0;
                &NO_NEIGHBOR[..]
            };
            let i = col * CHANNELS;
            err += relax_cell(
                &mut row[i..i + CHANNELS],
                &up[i..i + CHANNELS],
                &down[i..i + CHANNELS],
                left,
                right,
                aa,
                g.w,
            );
            continue;
        }
        for col in first..first + run.count {
            let i = col * CHANNELS;
            let l = (col + offset - 1) * CHANNELS;
            let rt = (col + offset) * CHANNELS;
            err += relax_cell(
                &mut row[i..i + CHANNELS],
                &up[i..i + CHANNELS],
                &down[i..i + CHANNELS],
                &side[l..l + CHANNELS],
                &side[rt..rt + CHANNELS],
                a,
                g.w,
            );
        }
    }
    err
}

#[inline]
fn relax_cell(
    cell: &mut [f32],
    up: &[f32],
    down: &[f32],
    left: &[f32],
    right: &[f32],
    a: f32,
    w: f32,
) -> f32 {
    let mut err = 0.0;
    for c in 0..CHANNELS {
        let diff = w * (a * cell[c] - (up[c] + down[c] + left[c] + right[c]));
        cell[c] -= diff;
        if c < COLOR_CHANNELS {
            err += diff * diff;
        }
    }
    err
}
