//! Sampling of large containers.
//!
//! Containers above a size threshold are not walked in full. Every `step`-th
//! element (1-based) is measured and the average is scaled up to the full
//! length. The result is an approximation: containers with uneven element
//! sizes are estimated from the sampled positions only.

use crate::{MemUsage, MemUsageContext, MemUsageError};

/// Distance between sampled elements.
///
/// Returns 1 (sample everything) for a non-positive rate or an empty
/// container. Rates above one half are clamped to one half.
///
/// # Examples
///
/// ```
/// use memory_manager::compute_sample_step;
///
/// assert_eq!(compute_sample_step(100, 0.2), 5);
/// assert_eq!(compute_sample_step(100, 0.9), 2);
/// assert_eq!(compute_sample_step(100, 0.0), 1);
/// ```
pub fn compute_sample_step(total: usize, sample_rate: f64) -> usize {
    if sample_rate <= 0.0 || sample_rate.is_nan() || total == 0 {
        return 1;
    }
    let rate = sample_rate.min(0.5);
    let samples = total as f64 * rate;
    let step = (total as f64 / samples).floor();
    (step as usize).clamp(1, total)
}

/// Scales `sum` measured over `samples` elements up to `total` elements.
/// Zero when nothing was sampled.
pub fn compute_mem_usage_estimate(sum: u64, samples: u64, total: usize) -> u64 {
    if samples == 0 {
        return 0;
    }
    (sum as f64 / samples as f64 * total as f64) as u64
}

/// Measures the elements of a container.
///
/// When `sampled` is set only every `step`-th element is measured and the
/// result is extrapolated. The walk stops after the element that pushes the
/// context over its byte budget; the partial total (extrapolated from the
/// samples taken so far when sampling) is returned.
pub(crate) fn walk_elements<T, F>(
    ctx: &mut MemUsageContext<'_>,
    items: &[T],
    sampled: bool,
    mut cost: F,
) -> Result<MemUsage, MemUsageError>
where
    F: FnMut(&T, &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError>,
{
    let total = items.len();
    let step = if sampled {
        ctx.sample_step(total)
    } else {
        1
    };
    let mut sum = MemUsage::ZERO;
    let mut samples = 0u64;
    for (index, item) in items.iter().enumerate() {
        if (index + 1) % step != 0 {
            continue;
        }
        sum += cost(item, ctx)?;
        samples += 1;
        if ctx.limit_exceeded() {
            break;
        }
    }
    if !sampled {
        return Ok(sum);
    }
    tracing::trace!(total, step, samples, "sampled container");
    Ok(MemUsage {
        legacy: compute_mem_usage_estimate(sum.legacy, samples, total),
        refined: compute_mem_usage_estimate(sum.refined, samples, total),
    })
}
