//! Healing of buffers that live on an accelerator.
//!
//! The solver only runs on the host: device buffers are copied into host
//! staging storage, healed there and the destination is written back. The
//! device side is abstracted by [`DeviceBuffers`].
use super::alloc::{AllocSite, ScratchAllocator};
use super::error::HealError;
use super::heal_with;
use super::options::HealOptions;
use crate::diagnostics::HealReport;
use crate::image::CHANNELS;
use log::error;

/// Device-resident source and destination images of one healing call, both
/// `width × height × 4` floats in the host layout.
pub trait DeviceBuffers {
    type Error: std::error::Error + 'static;

    /// Copy the device source image into `host`.
    fn read_source(&mut self, host: &mut [f32]) -> Result<(), Self::Error>;

    /// Copy the device destination image into `host`.
    fn read_destination(&mut self, host: &mut [f32]) -> Result<(), Self::Error>;

    /// Commit `host` to the device destination image.
    fn write_destination(&mut self, host: &[f32]) -> Result<(), Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum OffloadError<E: std::error::Error + 'static> {
    #[error("device transfer failed: {0}")]
    Transfer(#[source] E),
    #[error(transparent)]
    Heal(#[from] HealError),
}

/// Round-trip the device buffers through host memory and heal them.
///
/// The device destination is written only after a successful heal; on any
/// error it keeps its previous contents.
pub fn heal_offload<D: DeviceBuffers, A: ScratchAllocator>(
    device: &mut D,
    mask: &[f32],
    width: usize,
    height: usize,
    options: &HealOptions,
    alloc: &A,
) -> Result<HealReport, OffloadError<D::Error>> {
    let result = round_trip(device, mask, width, height, options, alloc);
    if let Err(err) = &result {
        error!("heal_offload: {err}; device destination left unchanged");
    }
    result
}

fn round_trip<D: DeviceBuffers, A: ScratchAllocator>(
    device: &mut D,
    mask: &[f32],
    width: usize,
    height: usize,
    options: &HealOptions,
    alloc: &A,
) -> Result<HealReport, OffloadError<D::Error>> {
    let len = width * height * CHANNELS;
    let mut source = alloc.try_filled(AllocSite::HostSource, len, 0.0f32)?;
    let mut destination = alloc.try_filled(AllocSite::HostDestination, len, 0.0f32)?;
    device
        .read_source(&mut source)
        .map_err(OffloadError::Transfer)?;
    device
        .read_destination(&mut destination)
        .map_err(OffloadError::Transfer)?;
    let report = heal_with(
        &source,
        &mut destination,
        mask,
        width,
        height,
        CHANNELS,
        options,
        alloc,
    )?;
    device
        .write_destination(&destination)
        .map_err(OffloadError::Transfer)?;
    Ok(report)
}
