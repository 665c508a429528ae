//! Fallible scratch allocation.
//!
//! Every buffer the healer needs for the duration of one call goes through a
//! [`ScratchAllocator`], tagged with the [`AllocSite`] requesting it. The
//! default [`SystemAllocator`] turns an out-of-memory condition into
//! [`HealError::Allocation`] instead of aborting the process.
use super::error::HealError;
use serde::Serialize;
use std::fmt;

/// Named allocation points of a healing call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AllocSite {
    RedBuffer,
    BlackBuffer,
    RedRuns,
    BlackRuns,
    HostSource,
    HostDestination,
}

impl AllocSite {
    pub const ALL: [AllocSite; 6] = [
        AllocSite::RedBuffer,
        AllocSite::BlackBuffer,
        AllocSite::RedRuns,
        AllocSite::BlackRuns,
        AllocSite::HostSource,
        AllocSite::HostDestination,
    ];
}

impl fmt::Display for AllocSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AllocSite::RedBuffer => "red checkerboard buffer",
            AllocSite::BlackBuffer => "black checkerboard buffer",
            AllocSite::RedRuns => "red run list",
            AllocSite::BlackRuns => "black run list",
            AllocSite::HostSource => "host source staging buffer",
            AllocSite::HostDestination => "host destination staging buffer",
        };
        f.write_str(name)
    }
}

/// Source of scratch storage for one healing call.
pub trait ScratchAllocator {
    /// Allocate an empty vector able to hold `capacity` elements without
    /// reallocating.
    fn try_with_capacity<T>(&self, site: AllocSite, capacity: usize) -> Result<Vec<T>, HealError>;

    /// Allocate a vector of `len` copies of `value`.
    fn try_filled<T: Clone>(&self, site: AllocSite, len: usize, value: T) -> Result<Vec<T>, HealError> {
        let mut out = self.try_with_capacity(site, len)?;
        out.resize(len, value);
        Ok(out)
    }
}

/// Allocates from the global allocator with `try_reserve_exact`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemAllocator;

impl ScratchAllocator for SystemAllocator {
    fn try_with_capacity<T>(&self, site: AllocSite, capacity: usize) -> Result<Vec<T>, HealError> {
        let mut out = Vec::new();
        out.try_reserve_exact(capacity).map_err(|_| HealError::Allocation {
            site,
            bytes: capacity.saturating_mul(std::mem::size_of::<T>()),
        })?;
        Ok(out)
    }
}
