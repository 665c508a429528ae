//! Seamless healing of a masked region.
//!
//! The destination is replaced by `source + D`, where `D` starts as
//! `destination - source` and is relaxed to a harmonic field over the active
//! mask cells. Outside the mask `D` keeps its initial value, which pins the
//! solution to the destination along the mask border: the texture of the
//! source is transplanted while the low-frequency color and lighting of the
//! destination carry through.
//!
//! Stages, in order:
//!
//! 1. validate the buffers (4 values per pixel, sizes matching `width × height`);
//! 2. encode the mask into red/black run lists ([`runs`]) and return early,
//!    destination untouched, when no cell is active;
//! 3. split `destination - source` into checkerboard arrays ([`checkerboard`]);
//! 4. relax the field with red/black SOR ([`solver`]);
//! 5. merge `source + field` back into the destination.
//!
//! Any error leaves the destination exactly as it was; scratch storage is
//! released on every path.
//!
//! Method after T. Georgiev, "Photoshop Healing Brush: a Tool for Seamless
//! Cloning", by way of the GIMP healing tool.

pub mod alloc;
pub mod checkerboard;
pub mod error;
pub mod offload;
pub mod options;
pub mod runs;
pub mod solver;

pub use self::alloc::{AllocSite, ScratchAllocator, SystemAllocator};
pub use self::checkerboard::{CheckerboardBuffer, Color};
pub use self::error::HealError;
pub use self::offload::{heal_offload, DeviceBuffers, OffloadError};
pub use self::options::{HealOptions, ParallelOptions};
pub use self::runs::{EncodedMask, Run, RunList};
pub use self::solver::PoissonSolver;

use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{HealReport, TimingBreakdown};
use crate::image::{ImageView, ImageViewMut, CHANNELS};
use log::{debug, error};
use std::time::Instant;

/// Heal `destination` in place with default options.
///
/// `source` and `destination` hold `channels` floats per pixel, `mask` one
/// float per pixel; a mask cell is active iff it is non-zero. `channels`
/// must be 4.
pub fn heal(
    source: &[f32],
    destination: &mut [f32],
    mask: &[f32],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<HealReport, HealError> {
    heal_with(
        source,
        destination,
        mask,
        width,
        height,
        channels,
        &HealOptions::default(),
        &SystemAllocator,
    )
}

/// Heal `destination` in place with explicit options and scratch allocator.
#[allow(clippy::too_many_arguments)]
pub fn heal_with<A: ScratchAllocator>(
    source: &[f32],
    destination: &mut [f32],
    mask: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    options: &HealOptions,
    alloc: &A,
) -> Result<HealReport, HealError> {
    let result = run_heal(
        source,
        destination,
        mask,
        width,
        height,
        channels,
        options,
        alloc,
    );
    if let Err(err) = &result {
        error!("heal: {err}; destination left unchanged");
    }
    result
}

#[allow(clippy::too_many_arguments)]
fn run_heal<A: ScratchAllocator>(
    source: &[f32],
    destination: &mut [f32],
    mask: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    options: &HealOptions,
    alloc: &A,
) -> Result<HealReport, HealError> {
    let total_start = Instant::now();
    validate(source, destination, mask, width, height, channels)?;
    let mut timings = TimingBreakdown::default();

    let solver = timings.time("encode", || {
        PoissonSolver::new(mask, width, height, options, alloc)
    })?;

    if solver.active_cells() == 0 {
        debug!("heal: no active mask cell in {width}x{height}, destination unchanged");
        timings.total_ms = elapsed_ms(total_start);
        return Ok(HealReport {
            width,
            height,
            solve: solver.idle_report(),
            timings,
        });
    }

    let mut field = timings.time("split", || {
        let mut field = CheckerboardBuffer::allocate(width, height, alloc)?;
        field.split(&*destination, source, &options.parallel);
        Ok::<_, HealError>(field)
    })?;
    let solve = timings.time("solve", || solver.solve(&mut field));
    timings.time("merge", || {
        field.merge(source, destination, &options.parallel)
    });

    timings.total_ms = elapsed_ms(total_start);
    debug!(
        "heal: {}x{} healed in {:.3} ms ({} iterations)",
        width, height, timings.total_ms, solve.iterations
    );
    Ok(HealReport {
        width,
        height,
        solve,
        timings,
    })
}

fn validate(
    source: &[f32],
    destination: &[f32],
    mask: &[f32],
    width: usize,
    height: usize,
    channels: usize,
) -> Result<(), HealError> {
    if channels != CHANNELS {
        return Err(HealError::InvalidChannelCount { found: channels });
    }
    let pixels = width.saturating_mul(height);
    let values = pixels.saturating_mul(CHANNELS);
    for (buffer, expected, found) in [
        ("source", values, source.len()),
        ("destination", values, destination.len()),
        ("mask", pixels, mask.len()),
    ] {
        if expected != found {
            return Err(HealError::BufferSizeMismatch {
                buffer,
                expected,
                found,
            });
        }
    }
    Ok(())
}

/// Reusable healing handle over typed images.
#[derive(Clone, Debug)]
pub struct Healer<A: ScratchAllocator = SystemAllocator> {
    options: HealOptions,
    alloc: A,
}

impl Healer {
    pub fn new(options: HealOptions) -> Self {
        Self {
            options,
            alloc: SystemAllocator,
        }
    }
}

impl Default for Healer {
    fn default() -> Self {
        Self::new(HealOptions::default())
    }
}

impl<A: ScratchAllocator> Healer<A> {
    /// Use a custom scratch allocator.
    pub fn with_allocator(options: HealOptions, alloc: A) -> Self {
        Self { options, alloc }
    }

    pub fn options(&self) -> &HealOptions {
        &self.options
    }

    /// Heal `destination` from `source` over the active cells of `mask`.
    ///
    /// The images must share their dimensions and expose contiguous storage;
    /// color images carry 4 values per pixel, the mask one.
    pub fn heal<S, D, M>(
        &self,
        source: &S,
        destination: &mut D,
        mask: &M,
    ) -> Result<HealReport, HealError>
    where
        S: ImageView<Pixel = f32>,
        D: ImageViewMut<Pixel = f32>,
        M: ImageView<Pixel = f32>,
    {
        let (width, height) = (destination.width(), destination.height());
        if let Err(err) = check_views(source, destination, mask) {
            error!("heal: {err}; destination left unchanged");
            return Err(err);
        }
        let source = contiguous(source, "source")?;
        let mask = contiguous(mask, "mask")?;
        let destination = destination
            .as_mut_slice()
            .ok_or(HealError::NotContiguous {
                buffer: "destination",
            })?;
        self.heal_raw(source, destination, mask, width, height, CHANNELS)
    }

    /// Slice-level variant of [`Healer::heal`].
    pub fn heal_raw(
        &self,
        source: &[f32],
        destination: &mut [f32],
        mask: &[f32],
        width: usize,
        height: usize,
        channels: usize,
    ) -> Result<HealReport, HealError> {
        heal_with(
            source,
            destination,
            mask,
            width,
            height,
            channels,
            &self.options,
            &self.alloc,
        )
    }
}

fn check_views<S, D, M>(source: &S, destination: &D, mask: &M) -> Result<(), HealError>
where
    S: ImageView<Pixel = f32>,
    D: ImageView<Pixel = f32>,
    M: ImageView<Pixel = f32>,
{
    for channels in [source.channels(), destination.channels()] {
        if channels != CHANNELS {
            return Err(HealError::InvalidChannelCount { found: channels });
        }
    }
    let pixels = destination.width() * destination.height();
    if (source.width(), source.height()) != (destination.width(), destination.height()) {
        return Err(HealError::BufferSizeMismatch {
            buffer: "source",
            expected: pixels * CHANNELS,
            found: source.width() * source.height() * CHANNELS,
        });
    }
    let mask_shape = (mask.width(), mask.height(), mask.channels());
    if mask_shape != (destination.width(), destination.height(), 1) {
        return Err(HealError::BufferSizeMismatch {
            buffer: "mask",
            expected: pixels,
            found: mask.width() * mask.height() * mask.channels(),
        });
    }
    for (buffer, contiguous) in [
        ("source", source.is_contiguous()),
        ("destination", destination.is_contiguous()),
        ("mask", mask.is_contiguous()),
    ] {
        if !contiguous {
            return Err(HealError::NotContiguous { buffer });
        }
    }
    Ok(())
}

fn contiguous<'a, V: ImageView<Pixel = f32>>(
    view: &'a V,
    buffer: &'static str,
) -> Result<&'a [f32], HealError> {
    view.as_slice().ok_or(HealError::NotContiguous { buffer })
}
