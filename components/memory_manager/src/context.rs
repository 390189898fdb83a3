//! Per-pass estimator state.

use std::any::Any;
use std::collections::HashSet;

use tracing::debug;

use crate::sampling::compute_sample_step;
use crate::{MemUsage, MemUsageConfig, MemUsageError};

/// Reports the size of host data the estimator cannot see into.
pub trait NativeMemUsageChecker {
    /// Size of `value` in bytes, or `None` if this checker does not know
    /// the type. Unknown values count as zero.
    fn native_mem_usage(&self, value: &dyn Any) -> Option<u64>;
}

/// Checker that knows no types.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopChecker;

impl NativeMemUsageChecker for NoopChecker {
    fn native_mem_usage(&self, _value: &dyn Any) -> Option<u64> {
        None
    }
}

/// Identities already counted in this pass.
#[derive(Debug, Default)]
pub struct VisitTracker {
    objects: HashSet<usize>,
    scopes: HashSet<usize>,
}

impl VisitTracker {
    /// Records an object (or shared host allocation). Returns false if it
    /// was already recorded.
    pub fn visit_object(&mut self, id: usize) -> bool {
        self.objects.insert(id)
    }

    /// True if the object was recorded.
    pub fn is_object_visited(&self, id: usize) -> bool {
        self.objects.contains(&id)
    }

    /// Records a scope frame. Returns false if it was already recorded.
    pub fn visit_scope(&mut self, id: usize) -> bool {
        self.scopes.insert(id)
    }

    /// True if the scope frame was recorded.
    pub fn is_scope_visited(&self, id: usize) -> bool {
        self.scopes.contains(&id)
    }
}

/// Current and maximum nesting depth.
#[derive(Debug, Clone, Copy)]
pub struct DepthTracker {
    cur: usize,
    max: usize,
}

impl DepthTracker {
    /// Starts at depth zero.
    pub fn new(max: usize) -> Self {
        DepthTracker { cur: 0, max }
    }

    /// Current depth.
    pub fn depth(&self) -> usize {
        self.cur
    }

    /// Enters one level.
    pub fn descend(&mut self) -> Result<(), MemUsageError> {
        if self.cur == self.max {
            return Err(MemUsageError::MaxDepthExceeded { max_depth: self.max });
        }
        self.cur += 1;
        Ok(())
    }

    /// Leaves one level.
    pub fn ascend(&mut self) {
        debug_assert!(self.cur > 0, "ascend at depth 0");
        self.cur = self.cur.saturating_sub(1);
    }
}

/// State threaded through one estimation pass.
///
/// A context is created per pass and dropped afterwards. It holds the
/// visited sets, the depth counter and the running total of refined bytes
/// charged so far, which is what the byte budget is checked against.
pub struct MemUsageContext<'a> {
    visits: VisitTracker,
    depth: DepthTracker,
    mem_limit: u64,
    array_len_threshold: usize,
    obj_props_len_threshold: usize,
    sample_rate: f64,
    checker: &'a dyn NativeMemUsageChecker,
    spent: u64,
    limit_logged: bool,
}

impl<'a> MemUsageContext<'a> {
    /// Creates a fresh context.
    pub fn new(config: &MemUsageConfig, checker: &'a dyn NativeMemUsageChecker) -> Self {
        MemUsageContext {
            visits: VisitTracker::default(),
            depth: DepthTracker::new(config.max_depth),
            mem_limit: config.mem_limit,
            array_len_threshold: config.array_len_threshold,
            obj_props_len_threshold: config.obj_props_len_threshold,
            sample_rate: config.sample_rate,
            checker,
            spent: 0,
            limit_logged: false,
        }
    }

    /// Visited sets.
    pub fn visits(&mut self) -> &mut VisitTracker {
        &mut self.visits
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.depth.depth()
    }

    /// Enters one nesting level.
    pub fn descend(&mut self) -> Result<(), MemUsageError> {
        self.depth.descend().inspect_err(|err| {
            debug!(%err, "memory estimation aborted");
        })
    }

    /// Leaves one nesting level.
    pub fn ascend(&mut self) {
        self.depth.ascend();
    }

    /// Runs `f` one level deeper. The level is left again whether `f`
    /// succeeds or fails.
    pub fn nested<T, F>(&mut self, f: F) -> Result<T, MemUsageError>
    where
        F: FnOnce(&mut Self) -> Result<T, MemUsageError>,
    {
        self.descend()?;
        let result = f(self);
        self.ascend();
        result
    }

    /// Adds a leaf cost to the running total and returns it.
    pub fn charge(&mut self, usage: MemUsage) -> MemUsage {
        self.spent = self.spent.saturating_add(usage.refined);
        usage
    }

    /// Refined bytes charged so far.
    pub fn spent(&self) -> u64 {
        self.spent
    }

    /// True once the running total is over the byte budget.
    pub fn limit_exceeded(&mut self) -> bool {
        let exceeded = self.mem_usage_limit_exceeded(self.spent);
        if exceeded && !self.limit_logged {
            self.limit_logged = true;
            debug!(spent = self.spent, limit = self.mem_limit, "memory budget exceeded");
        }
        exceeded
    }

    /// True if `usage` bytes are over the byte budget.
    pub fn mem_usage_limit_exceeded(&self, usage: u64) -> bool {
        usage > self.mem_limit
    }

    /// True if an array of `len` elements should be sampled.
    pub fn array_len_exceeds_threshold(&self, len: usize) -> bool {
        len > self.array_len_threshold
    }

    /// True if an object or collection with `len` entries should be sampled.
    pub fn object_props_len_exceeds_threshold(&self, len: usize) -> bool {
        len > self.obj_props_len_threshold
    }

    /// Sampling step for a container of `total` elements.
    pub fn sample_step(&self, total: usize) -> usize {
        compute_sample_step(total, self.sample_rate)
    }

    /// Asks the native checker about opaque host data.
    pub fn native_mem_usage(&self, value: &dyn Any) -> Option<u64> {
        self.checker.native_mem_usage(value)
    }
}
