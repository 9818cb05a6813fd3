//! The error type returned by the filtering entry points.

use thiserror::Error;

/// Errors detected while validating a filtering request.
///
/// All validation happens before any block is processed; when an error is
/// returned, no output has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MedianFilterError {
    /// The window does not fit inside a block: `2 * radius + 1` must be
    /// strictly smaller than the block size on both axes.
    #[error("window of half-width {radius} does not fit in blocks of size {block}")]
    WindowTooLarge {
        /// The offending window half-width.
        radius: usize,
        /// The resolved block size.
        block: usize,
    },

    /// The image has a zero dimension.
    #[error("image dimensions must be non-zero")]
    EmptyImage,

    /// Per-worker scratch buffers could not be allocated.
    #[error("failed to allocate per-worker scratch buffers")]
    AllocationFailed,
}
