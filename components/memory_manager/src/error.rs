//! Estimation errors.

use thiserror::Error;

/// Hard failure of an estimation pass.
///
/// Running over the byte budget is not an error: the pass stops early and
/// returns the partial total instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemUsageError {
    /// The value graph is nested deeper than the configured ceiling.
    #[error("reached max depth {max_depth}")]
    MaxDepthExceeded {
        /// Configured ceiling
        max_depth: usize,
    },
}
