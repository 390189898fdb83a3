//! Estimator configuration.

use serde::{Deserialize, Serialize};

/// Limits and sampling parameters of an estimation pass.
///
/// Missing fields take their [`Default`] values when deserializing.
///
/// # Examples
///
/// ```
/// use memory_manager::MemUsageConfig;
///
/// let config: MemUsageConfig = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
/// assert_eq!(config.max_depth, 8);
/// assert_eq!(config.sample_rate, MemUsageConfig::default().sample_rate);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemUsageConfig {
    /// Deepest object nesting the pass will follow
    pub max_depth: usize,
    /// Byte budget (refined) after which containers stop being walked
    pub mem_limit: u64,
    /// Arrays and slices longer than this are sampled
    pub array_len_threshold: usize,
    /// Objects, maps and sets with more entries than this are sampled
    pub obj_props_len_threshold: usize,
    /// Fraction of elements measured when sampling (at most one half)
    pub sample_rate: f64,
}

impl Default for MemUsageConfig {
    fn default() -> Self {
        MemUsageConfig {
            max_depth: 100,
            mem_limit: u64::MAX,
            array_len_threshold: 1000,
            obj_props_len_threshold: 1000,
            sample_rate: 0.1,
        }
    }
}

impl MemUsageConfig {
    /// Tight limits for checks that run often: shallow graphs, a 64 MiB
    /// budget and aggressive sampling.
    pub fn strict() -> Self {
        MemUsageConfig {
            max_depth: 32,
            mem_limit: 64 * 1024 * 1024,
            array_len_threshold: 100,
            obj_props_len_threshold: 100,
            sample_rate: 0.05,
        }
    }
}
