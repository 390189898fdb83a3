//! Memory Manager - memory usage estimation for the value graph
//!
//! This component provides:
//! - [`MemUsageReporter`], implemented for values, strings, symbols, objects,
//!   property slots, scope frames and host values
//! - [`MemUsageContext`], the per-pass state (visited sets, depth, byte
//!   budget, sampling parameters)
//! - Sampling of large arrays, objects and collections
//! - [`estimate_memory_usage`], the one-call entry point
//!
//! Every estimate reports two totals, see [`MemUsage`].
//!
//! # Examples
//!
//! ```
//! use core_types::{Object, Value};
//! use memory_manager::{estimate_memory_usage, MemUsageConfig, NoopChecker};
//! use memory_manager::sizes::{SIZE_EMPTY_STRUCT, SIZE_STRING};
//!
//! let arr = Object::array(vec![Value::from("hello")], None);
//! let usage = estimate_memory_usage(&Value::Object(arr), &MemUsageConfig::default(), &NoopChecker)
//!     .unwrap();
//! assert_eq!(usage.legacy, SIZE_EMPTY_STRUCT + 5);
//! assert_eq!(usage.refined, SIZE_EMPTY_STRUCT + 5 + SIZE_STRING);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod config;
mod context;
mod error;
mod reporter;
mod sampling;
pub mod sizes;
mod usage;

pub use config::MemUsageConfig;
pub use context::{DepthTracker, MemUsageContext, NativeMemUsageChecker, NoopChecker, VisitTracker};
pub use error::MemUsageError;
pub use reporter::MemUsageReporter;
pub use sampling::{compute_mem_usage_estimate, compute_sample_step};
pub use usage::MemUsage;

/// Estimates the memory held by `root` and everything reachable from it.
///
/// # Errors
///
/// [`MemUsageError::MaxDepthExceeded`] if the graph nests deeper than
/// `config.max_depth`. Running over `config.mem_limit` is not an error; the
/// partial total is returned.
pub fn estimate_memory_usage<R>(
    root: &R,
    config: &MemUsageConfig,
    checker: &dyn NativeMemUsageChecker,
) -> Result<MemUsage, MemUsageError>
where
    R: MemUsageReporter + ?Sized,
{
    let mut ctx = MemUsageContext::new(config, checker);
    let usage = root.mem_usage(&mut ctx)?;
    tracing::trace!(legacy = usage.legacy, refined = usage.refined, "estimated memory usage");
    Ok(usage)
}
