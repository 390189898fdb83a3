//! Embedding runtime for the JavaScript value core
//!
//! This crate provides:
//! - [`Runtime`]: global object and scope, value stack, object factories
//!   and host interop (`set`/`get`/`to_value`/`export`)
//! - A step driver ([`Runtime::run`]) with a per-step tick hook
//!   ([`Runtime::wait_one_tick`]) that throttles execution against a
//!   [`RateLimiter`]
//! - Cooperative cancellation through [`CancellationToken`]
//! - Memory accounting of the whole runtime through the `memory_manager`
//!   estimator
//!
//! Interrupts ([`Interrupt`]) end a run abruptly and are reported apart from
//! script exceptions, see [`RunError`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use core_types::Value;
//! use interpreter::{Interrupt, RunError, Runtime, Step, TokenBucket};
//!
//! let mut rt = Runtime::new();
//! rt.set_rate_limiter(Some(Arc::new(TokenBucket::new(1_000_000.0, 1000))));
//!
//! let token = rt.cancellation_token();
//! let err = rt
//!     .run(|rt| {
//!         if rt.ticks() == 500 {
//!             token.cancel();
//!         }
//!         Ok(Step::Continue)
//!     })
//!     .unwrap_err();
//! assert_eq!(err, RunError::Interrupted(Interrupt::Cancelled));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod cancel;
mod config;
mod error;
mod intrinsics;
mod limiter;
mod runtime;

pub use cancel::CancellationToken;
pub use config::{RateLimitConfig, RuntimeConfig};
pub use error::{ConfigError, Interrupt, LimiterError, RunError};
pub use intrinsics::Intrinsics;
pub use limiter::{RateLimiter, TokenBucket};
pub use runtime::{Runtime, Step};
