//! The embedding runtime.
//!
//! A [`Runtime`] owns a global object, a global scope, a value stack and the
//! tick state of its rate limiter. Execution is driven one step at a time by
//! [`Runtime::run`]; every step is preceded by [`Runtime::wait_one_tick`].

use std::sync::Arc;

use core_types::{
    export_value, wrap_host_value, ExportError, ExportKind, HostValue, JsError, Object, ObjectData,
    Scope, Value,
};
use memory_manager::{
    MemUsage, MemUsageContext, MemUsageError, MemUsageReporter, NativeMemUsageChecker, NoopChecker,
};
use tracing::{debug, trace};

use crate::{
    CancellationToken, ConfigError, Interrupt, Intrinsics, RateLimiter, RunError, RuntimeConfig,
};

/// Ticks taken from the limiter per refill, as a divisor of its burst.
const BURST_DIVISOR: usize = 5;

/// Result of one execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// More steps follow
    Continue,
    /// The run is complete with this value
    Done(Value),
}

/// A single-threaded execution environment.
///
/// # Examples
///
/// ```
/// use core_types::{HostValue, Value};
/// use interpreter::{Runtime, Step};
///
/// let mut rt = Runtime::new();
/// rt.set("limit", HostValue::Int(3)).unwrap();
///
/// let mut count = 0;
/// let result = rt
///     .run(|rt| {
///         count += 1;
///         let limit = rt.get("limit").map_or(0, |v| v.to_int64());
///         Ok(if count < limit { Step::Continue } else { Step::Done(Value::Smi(count)) })
///     })
///     .unwrap();
/// assert_eq!(result, Value::Smi(3));
/// assert_eq!(rt.ticks(), 3);
/// ```
pub struct Runtime {
    config: RuntimeConfig,
    intrinsics: Intrinsics,
    global_object: Object,
    global_scope: Scope,
    stack: Vec<Value>,
    limiter: Option<Arc<dyn RateLimiter>>,
    ticks: u64,
    ticks_left: usize,
    cancel: CancellationToken,
    checker: Box<dyn NativeMemUsageChecker>,
}

impl Runtime {
    /// Runtime with the default configuration and no rate limiter.
    pub fn new() -> Self {
        Self::build(RuntimeConfig::default())
    }

    /// Runtime with `config`, installing its rate limiter if one is set.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidRateLimit`] if the rate limit cannot be built.
    pub fn with_config(config: RuntimeConfig) -> Result<Self, ConfigError> {
        let limiter = match &config.rate_limit {
            Some(rate_limit) => Some(Arc::new(rate_limit.build()?) as Arc<dyn RateLimiter>),
            None => None,
        };
        let mut runtime = Self::build(config);
        if limiter.is_some() {
            runtime.set_rate_limiter(limiter);
        }
        Ok(runtime)
    }

    fn build(config: RuntimeConfig) -> Self {
        let intrinsics = Intrinsics::new();
        let global_object = Object::plain(Some(intrinsics.object_prototype.clone()));
        Runtime {
            config,
            intrinsics,
            global_object,
            global_scope: Scope::new(None),
            stack: Vec::with_capacity(64),
            limiter: None,
            ticks: 0,
            ticks_left: 0,
            cancel: CancellationToken::new(),
            checker: Box::new(NoopChecker),
        }
    }

    /// The configuration this runtime was created with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Built-in prototypes.
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    /// The global object.
    pub fn global_object(&self) -> &Object {
        &self.global_object
    }

    /// The global lexical scope.
    pub fn global_scope(&self) -> &Scope {
        &self.global_scope
    }

    // ---- Host interop ----

    /// Assigns a host value to a global property, wrapping it as needed.
    ///
    /// # Errors
    ///
    /// A `TypeError` if the property is read-only, or whatever a setter on
    /// the global object's prototype chain throws.
    pub fn set(&self, name: &str, value: impl Into<HostValue>) -> Result<(), JsError> {
        let value = self.to_value(&value.into());
        if self.global_object.try_set(name, value)? {
            Ok(())
        } else {
            Err(JsError::type_error(format!(
                "Cannot assign to read only property '{name}'"
            )))
        }
    }

    /// Reads a global property; `None` if it does not exist. Getters that
    /// throw read as `undefined`.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.global_object
            .has_property(name)
            .then(|| self.global_object.get(name))
    }

    /// Converts a host value. Maps, slices, functions, errors and opaque
    /// data become objects sharing the host allocation.
    pub fn to_value(&self, value: &HostValue) -> Value {
        wrap_host_value(value, &self.intrinsics.host)
    }

    /// Converts a value to its natural host form. Graphs that cannot be
    /// exported deeply (cycles, very deep nesting) come back as
    /// [`HostValue::Js`].
    pub fn export(&self, value: &Value) -> HostValue {
        export_value(value, ExportKind::Any).unwrap_or_else(|err| {
            trace!(%err, "falling back to shallow export");
            HostValue::Js(value.clone())
        })
    }

    /// Converts a value to a specific host shape.
    ///
    /// # Errors
    ///
    /// See [`export_value`].
    pub fn export_to(&self, value: &Value, kind: ExportKind) -> Result<HostValue, ExportError> {
        export_value(value, kind)
    }

    // ---- Object factories ----

    /// Empty ordinary object.
    pub fn new_object(&self) -> Object {
        Object::plain(Some(self.intrinsics.object_prototype.clone()))
    }

    /// Array holding `elements`.
    pub fn new_array(&self, elements: Vec<Value>) -> Object {
        Object::array(elements, Some(self.intrinsics.array_prototype.clone()))
    }

    /// Empty Map.
    pub fn new_map(&self) -> Object {
        Object::new_map(Some(self.intrinsics.map_prototype.clone()))
    }

    /// Empty Set.
    pub fn new_set(&self) -> Object {
        Object::new_set(Some(self.intrinsics.set_prototype.clone()))
    }

    /// Function with a native body.
    pub fn new_function<F>(&self, name: &str, body: F) -> Object
    where
        F: Fn(&Value, &[Value]) -> Result<Value, JsError> + 'static,
    {
        Object::native_function(name, body, Some(self.intrinsics.function_prototype.clone()))
    }

    /// Object whose contents are built by `init` on first access.
    pub fn new_lazy_object<F>(&self, init: F) -> Object
    where
        F: FnOnce() -> ObjectData + 'static,
    {
        Object::lazy(init)
    }

    /// Proxy forwarding to `target`.
    pub fn new_proxy(&self, target: Object, handler: Object) -> Object {
        Object::proxy(target, handler)
    }

    /// Date with a time value in milliseconds since the epoch.
    pub fn new_date(&self, time_value: f64) -> Object {
        Object::date(time_value, Some(self.intrinsics.object_prototype.clone()))
    }

    /// Boxed primitive. Objects are returned unchanged.
    pub fn new_primitive_object(&self, value: Value) -> Object {
        match value {
            Value::Object(object) => object,
            primitive => Object::primitive_wrapper(
                primitive,
                Some(self.intrinsics.object_prototype.clone()),
            ),
        }
    }

    // ---- Value stack ----

    /// Pushes onto the value stack.
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pops from the value stack.
    pub fn pop(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    /// Values currently on the stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    // ---- Rate limiting and interrupts ----

    /// Installs a rate limiter, or removes throttling with `None`.
    pub fn set_rate_limiter(&mut self, limiter: Option<Arc<dyn RateLimiter>>) {
        match &limiter {
            Some(limiter) => {
                self.ticks_left = refill_amount(limiter.burst());
                debug!(burst = limiter.burst(), ticks_left = self.ticks_left, "rate limiter installed");
            }
            None => {
                self.ticks_left = 0;
                debug!("rate limiter removed");
            }
        }
        self.limiter = limiter;
    }

    /// The installed rate limiter.
    pub fn rate_limiter(&self) -> Option<&Arc<dyn RateLimiter>> {
        self.limiter.as_ref()
    }

    /// Number of ticks taken so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Ticks left before the next limiter wait.
    pub fn ticks_left(&self) -> usize {
        self.ticks_left
    }

    /// Cancels the current and any future run until a new token is set.
    /// Safe to call from another thread through
    /// [`Runtime::cancellation_token`].
    pub fn interrupt(&self) {
        self.cancel.cancel();
    }

    /// A handle that cancels this runtime when triggered.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Replaces the cancellation token, e.g. with one carrying a deadline.
    pub fn set_cancellation_token(&mut self, token: CancellationToken) {
        self.cancel = token;
    }

    /// Called once per execution step.
    ///
    /// Without a limiter only the cancellation flag is checked. With one, a
    /// local allowance of ticks is spent first; when it runs out a fifth of
    /// the limiter's burst is requested and the caller blocks until it is
    /// granted. The allowance is only replenished once the limiter grants it.
    ///
    /// # Errors
    ///
    /// [`Interrupt::Cancelled`] if the token was cancelled, and
    /// [`Interrupt::DeadlineExceeded`] if the limiter cannot grant the ticks
    /// (request above its burst, or not before the token's deadline).
    #[inline]
    pub fn wait_one_tick(&mut self) -> Result<(), Interrupt> {
        self.ticks += 1;
        let Some(limiter) = &self.limiter else {
            return if self.cancel.is_cancelled() {
                Err(Interrupt::Cancelled)
            } else {
                Ok(())
            };
        };
        if self.ticks_left > 0 {
            self.ticks_left -= 1;
            return Ok(());
        }
        let refill = refill_amount(limiter.burst());
        trace!(ticks = self.ticks, n = refill, "refilling ticks");
        // A refused request grants nothing; the next tick asks again.
        limiter
            .wait_n(refill, &self.cancel)
            .map_err(Interrupt::from)?;
        self.ticks_left = refill;
        Ok(())
    }

    /// Drives `step` until it reports [`Step::Done`].
    ///
    /// The tick hook runs before every step. On failure the value stack is
    /// unwound to its height at entry.
    ///
    /// # Errors
    ///
    /// [`RunError::Exception`] when a step throws and
    /// [`RunError::Interrupted`] when the tick hook stops the run. Interrupts
    /// never reach `step`.
    pub fn run<F>(&mut self, mut step: F) -> Result<Value, RunError>
    where
        F: FnMut(&mut Runtime) -> Result<Step, JsError>,
    {
        let base = self.stack.len();
        let result = loop {
            if let Err(interrupt) = self.wait_one_tick() {
                debug!(%interrupt, ticks = self.ticks, "run interrupted");
                break Err(RunError::Interrupted(interrupt));
            }
            match step(self) {
                Ok(Step::Continue) => {}
                Ok(Step::Done(value)) => break Ok(value),
                Err(err) => break Err(RunError::Exception(err)),
            }
        };
        if result.is_err() {
            self.stack.truncate(base);
        }
        result
    }

    // ---- Memory accounting ----

    /// Sets the checker consulted for opaque host data.
    pub fn set_native_mem_usage_checker(&mut self, checker: Box<dyn NativeMemUsageChecker>) {
        self.checker = checker;
    }

    /// Adds up the global object, the global scope and the value stack.
    ///
    /// # Errors
    ///
    /// [`MemUsageError::MaxDepthExceeded`] if any of them nests too deeply.
    pub fn mem_usage(&self, ctx: &mut MemUsageContext<'_>) -> Result<MemUsage, MemUsageError> {
        let mut total = self.global_object.mem_usage(ctx)?;
        total += self.global_scope.mem_usage(ctx)?;
        total += self.stack.as_slice().mem_usage(ctx)?;
        Ok(total)
    }

    /// Estimates the memory held by the whole runtime, using the
    /// configured limits.
    ///
    /// # Errors
    ///
    /// See [`Runtime::mem_usage`].
    pub fn memory_usage(&self) -> Result<MemUsage, MemUsageError> {
        let mut ctx = MemUsageContext::new(&self.config.mem_usage, self.checker.as_ref());
        self.mem_usage(&mut ctx)
    }

    /// Estimates the memory held by `root` with the configured limits and
    /// native checker.
    ///
    /// # Errors
    ///
    /// See [`memory_manager::estimate_memory_usage`].
    pub fn estimate_memory_usage<R>(&self, root: &R) -> Result<MemUsage, MemUsageError>
    where
        R: MemUsageReporter + ?Sized,
    {
        memory_manager::estimate_memory_usage(root, &self.config.mem_usage, self.checker.as_ref())
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("stack_depth", &self.stack.len())
            .field("limiter", &self.limiter)
            .field("ticks", &self.ticks)
            .field("ticks_left", &self.ticks_left)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

fn refill_amount(burst: usize) -> usize {
    (burst / BURST_DIVISOR).max(1)
}
