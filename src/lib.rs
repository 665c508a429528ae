#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod diagnostics;
pub mod heal;
pub mod image;

// Tooling support for the binaries.
pub mod config;

// --- High-level re-exports -------------------------------------------------

// Main entry points.
pub use crate::heal::{heal, heal_offload, heal_with, Healer};

// Options, errors and the allocation seam.
pub use crate::heal::{
    AllocSite, DeviceBuffers, HealError, HealOptions, OffloadError, ParallelOptions,
    ScratchAllocator, SystemAllocator,
};

// Reports returned by every entry point.
pub use crate::diagnostics::{HealReport, SolveOutcome, SolveReport};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use seamless_heal::prelude::*;
///
/// # fn main() {
/// let (w, h) = (64usize, 48usize);
/// let source = ImageRgbaF32::new(w, h);
/// let mut destination = ImageRgbaF32::from_fn(w, h, |x, _| [x as f32 / w as f32; 4]);
/// let mask = Mask::from_fn(w, h, |x, y| (16..48).contains(&x) && (12..36).contains(&y));
///
/// let report = Healer::new(HealOptions::default())
///     .heal(&source, &mut destination, &mask)
///     .expect("buffers match");
/// println!("iterations={} outcome={:?}", report.solve.iterations, report.solve.outcome);
/// # }
/// ```
pub mod prelude {
    pub use crate::image::{ImageRgbaF32, Mask};
    pub use crate::{HealError, HealOptions, HealReport, Healer, SolveOutcome};
}

// --- Stage-level API (for tools & advanced users) --------------------------

pub mod stages {
    // Checkerboard split/merge.
    pub use crate::heal::checkerboard::{merge, split, CheckerboardBuffer, Color};

    // Mask run-length encoding.
    pub use crate::heal::runs::{encode, encode_parity_runs, encode_row, EncodedMask, Run, RowRuns, RunList};

    // Solver.
    pub use crate::heal::solver::{convergence_threshold, relaxation_factor, PoissonSolver};
}
