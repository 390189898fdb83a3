//! Runtime configuration.

use memory_manager::MemUsageConfig;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, TokenBucket};

/// Token bucket parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Ticks granted per second
    pub rate_per_sec: f64,
    /// Bucket capacity; the tick hook takes a fifth of it at a time
    pub burst: usize,
}

impl RateLimitConfig {
    /// Checks the parameters and builds the bucket.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRateLimit`] for a negative or NaN rate or a
    /// zero burst.
    pub fn build(&self) -> Result<TokenBucket, ConfigError> {
        if self.rate_per_sec.is_nan() || self.rate_per_sec < 0.0 || self.burst == 0 {
            return Err(ConfigError::InvalidRateLimit {
                rate_per_sec: self.rate_per_sec,
                burst: self.burst,
            });
        }
        Ok(TokenBucket::new(self.rate_per_sec, self.burst))
    }
}

/// Settings a [`Runtime`](crate::Runtime) is created with.
///
/// # Examples
///
/// ```
/// use interpreter::RuntimeConfig;
///
/// let config = RuntimeConfig::from_json(
///     r#"{"rate_limit": {"rate_per_sec": 5000.0, "burst": 500}, "mem_usage": {"max_depth": 16}}"#,
/// )
/// .unwrap();
/// assert_eq!(config.rate_limit.unwrap().burst, 500);
/// assert_eq!(config.mem_usage.max_depth, 16);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Limits for [`Runtime::estimate_memory_usage`](crate::Runtime::estimate_memory_usage)
    pub mem_usage: MemUsageConfig,
    /// Installed at creation when present; no throttling otherwise
    pub rate_limit: Option<RateLimitConfig>,
}

impl RuntimeConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] on malformed input and
    /// [`ConfigError::InvalidRateLimit`] on unusable rate limit values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        if let Some(rate_limit) = &config.rate_limit {
            rate_limit.build()?;
        }
        Ok(config)
    }
}
