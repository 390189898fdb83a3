//! The pair of totals every estimate reports.

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::sizes::SIZE_STRING;

/// Estimated bytes under two accounting schemes.
///
/// `legacy` counts string payload only; `refined` also counts a string
/// header for every string, property name and map key. Both are reported so
/// a change of scheme can be evaluated against the old numbers.
///
/// # Examples
///
/// ```
/// use memory_manager::MemUsage;
///
/// let total: MemUsage = [MemUsage::uniform(8), MemUsage::string(3)].into_iter().sum();
/// assert_eq!(total.legacy, 11);
/// assert_eq!(total.refined, 27);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemUsage {
    /// Payload-only total
    pub legacy: u64,
    /// Total including string headers
    pub refined: u64,
}

impl MemUsage {
    /// Nothing.
    pub const ZERO: MemUsage = MemUsage {
        legacy: 0,
        refined: 0,
    };

    /// Same amount under both schemes.
    pub const fn uniform(bytes: u64) -> Self {
        MemUsage {
            legacy: bytes,
            refined: bytes,
        }
    }

    /// Cost of a string-like payload of `payload` bytes.
    pub const fn string(payload: u64) -> Self {
        MemUsage {
            legacy: payload,
            refined: payload + SIZE_STRING,
        }
    }
}

impl Add for MemUsage {
    type Output = MemUsage;

    fn add(self, rhs: MemUsage) -> MemUsage {
        MemUsage {
            legacy: self.legacy.saturating_add(rhs.legacy),
            refined: self.refined.saturating_add(rhs.refined),
        }
    }
}

impl AddAssign for MemUsage {
    fn add_assign(&mut self, rhs: MemUsage) {
        *self = *self + rhs;
    }
}

impl Sum for MemUsage {
    fn sum<I: Iterator<Item = MemUsage>>(iter: I) -> MemUsage {
        iter.fold(MemUsage::ZERO, Add::add)
    }
}
