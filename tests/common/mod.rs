#![allow(dead_code)]

pub mod synthetic_image;

use seamless_heal::{AllocSite, HealError, ScratchAllocator, SystemAllocator};

/// Allocator failing at exactly one site and delegating everything else.
pub struct FailingAllocator {
    pub fail_at: AllocSite,
}

impl ScratchAllocator for FailingAllocator {
    fn try_with_capacity<T>(&self, site: AllocSite, capacity: usize) -> Result<Vec<T>, HealError> {
        if site == self.fail_at {
            return Err(HealError::Allocation {
                site,
                bytes: capacity * std::mem::size_of::<T>(),
            });
        }
        SystemAllocator.try_with_capacity(site, capacity)
    }
}
