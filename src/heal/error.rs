use super::alloc::AllocSite;

/// Failures that abort a healing call. The destination buffer is never
/// modified when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HealError {
    /// The pixel layout is not 3 colors + 1 alignment slot.
    #[error("full-color image required: expected 4 channels, got {found}")]
    InvalidChannelCount { found: usize },

    /// A buffer does not match the declared dimensions.
    #[error("{buffer} buffer holds {found} values, expected {expected}")]
    BufferSizeMismatch {
        buffer: &'static str,
        expected: usize,
        found: usize,
    },

    /// An image view cannot be handed to the solver as one flat slice.
    #[error("{buffer} image is not stored contiguously")]
    NotContiguous { buffer: &'static str },

    /// Scratch storage could not be obtained.
    #[error("failed to allocate {bytes} bytes for {site}")]
    Allocation { site: AllocSite, bytes: usize },
}
