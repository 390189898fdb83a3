//! Errors raised by the runtime.
//!
//! Script exceptions and interrupts are kept apart: an [`Interrupt`] ends a
//! run abruptly and is never visible to code running inside it.

use core_types::JsError;
use thiserror::Error;

/// Abrupt termination requested from outside the running script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Interrupt {
    /// The runtime's cancellation token was triggered
    #[error("execution cancelled")]
    Cancelled,
    /// The rate limiter cannot grant the next ticks in time
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Why a rate limiter wait failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LimiterError {
    /// Cancelled before or while waiting
    #[error("wait cancelled")]
    Cancelled,
    /// More tokens were requested than the bucket can ever hold
    #[error("wait({requested}) exceeds limiter's burst {burst}")]
    ExceedsBurst {
        /// Tokens requested
        requested: usize,
        /// Bucket capacity
        burst: usize,
    },
    /// The tokens would not be available before the deadline
    #[error("wait would exceed the deadline")]
    WouldExceedDeadline,
}

impl From<LimiterError> for Interrupt {
    fn from(err: LimiterError) -> Self {
        match err {
            LimiterError::Cancelled => Interrupt::Cancelled,
            LimiterError::ExceedsBurst { .. } | LimiterError::WouldExceedDeadline => {
                Interrupt::DeadlineExceeded
            }
        }
    }
}

/// Outcome of a failed [`Runtime::run`](crate::Runtime::run).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RunError {
    /// A step threw
    #[error(transparent)]
    Exception(#[from] JsError),
    /// The run was interrupted between steps
    #[error("execution interrupted: {0}")]
    Interrupted(#[from] Interrupt),
}

impl RunError {
    /// True for interrupts, false for script exceptions.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, RunError::Interrupted(_))
    }
}

/// Invalid runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed
    #[error("invalid runtime configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// Rate limit with a negative or NaN rate, or a zero burst
    #[error("invalid rate limit: rate {rate_per_sec}, burst {burst}")]
    InvalidRateLimit {
        /// Configured tokens per second
        rate_per_sec: f64,
        /// Configured burst
        burst: usize,
    },
}
