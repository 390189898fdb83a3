//! Contract tests verifying the interpreter API matches its documented contract.
//! These tests ensure all exported types and functions exist with correct signatures.

use std::sync::Arc;

use core_types::{ExportError, ExportKind, HostValue, JsError, Object, Value};
use interpreter::{
    CancellationToken, ConfigError, Interrupt, Intrinsics, LimiterError, RateLimitConfig,
    RateLimiter, RunError, Runtime, RuntimeConfig, Step, TokenBucket,
};
use memory_manager::{MemUsage, MemUsageConfig, MemUsageContext, MemUsageError, NoopChecker};

/// Test Runtime::new() and Runtime::with_config(RuntimeConfig) -> Result<Runtime, ConfigError>
#[test]
fn contract_runtime_construction() {
    let _: Runtime = Runtime::new();
    let _: Runtime = Runtime::default();
    let result: Result<Runtime, ConfigError> = Runtime::with_config(RuntimeConfig::default());
    assert!(result.is_ok());
}

/// Test wait_one_tick(&mut self) -> Result<(), Interrupt>
#[test]
fn contract_wait_one_tick() {
    let mut rt = Runtime::new();
    let result: Result<(), Interrupt> = rt.wait_one_tick();
    assert!(result.is_ok());
    let _: u64 = rt.ticks();
}

/// Test run(step) -> Result<Value, RunError>
#[test]
fn contract_run() {
    let mut rt = Runtime::new();
    let result: Result<Value, RunError> = rt.run(|_| Ok(Step::Done(Value::Undefined)));
    assert_eq!(result, Ok(Value::Undefined));
}

/// Test set_rate_limiter(Option<Arc<dyn RateLimiter>>)
#[test]
fn contract_set_rate_limiter() {
    let mut rt = Runtime::new();
    let limiter: Arc<dyn RateLimiter> = Arc::new(TokenBucket::new(10.0, 10));
    rt.set_rate_limiter(Some(limiter));
    rt.set_rate_limiter(None);
    assert!(rt.rate_limiter().is_none());
}

/// Test RateLimiter::wait_n(n, &CancellationToken) -> Result<(), LimiterError>
#[test]
fn contract_rate_limiter_trait() {
    let bucket = TokenBucket::new(10.0, 10);
    let _: usize = bucket.burst();
    let result: Result<(), LimiterError> = bucket.wait_n(1, &CancellationToken::new());
    assert!(result.is_ok());
}

/// Test interrupt(&self) and the token handle
#[test]
fn contract_interrupt() {
    let rt = Runtime::new();
    let token: CancellationToken = rt.cancellation_token();
    rt.interrupt();
    assert!(token.is_cancelled());
}

/// Test the error enums have the documented variants
#[test]
fn contract_error_variants() {
    let interrupts = [Interrupt::Cancelled, Interrupt::DeadlineExceeded];
    assert_eq!(interrupts.len(), 2);
    let _ = LimiterError::ExceedsBurst {
        requested: 1,
        burst: 0,
    };
    let _ = LimiterError::WouldExceedDeadline;
    let _ = RunError::Exception(JsError::type_error("x"));
    let _ = RunError::Interrupted(Interrupt::Cancelled);
}

/// Test host embedding API signatures
#[test]
fn contract_embedding_api() {
    let mut rt = Runtime::new();
    let set: Result<(), JsError> = rt.set("x", HostValue::Int(1));
    assert!(set.is_ok());
    let _: Option<Value> = rt.get("x");
    let _: Value = rt.to_value(&HostValue::Nil);
    let _: HostValue = rt.export(&Value::Null);
    let _: Result<HostValue, ExportError> = rt.export_to(&Value::Null, ExportKind::Any);

    let _: Object = rt.new_object();
    let _: Object = rt.new_array(Vec::new());
    let _: Object = rt.new_map();
    let _: Object = rt.new_set();
    let _: Object = rt.new_function("f", |_, _| Ok(Value::Undefined));
    let _: Object = rt.new_lazy_object(|| {
        core_types::ObjectData::new(core_types::ObjectKind::Plain, None)
    });
    let _: Object = rt.new_proxy(rt.new_object(), rt.new_object());
    let _: Object = rt.new_date(0.0);
    let _: Object = rt.new_primitive_object(Value::Boolean(true));

    rt.push(Value::Null);
    let _: Option<Value> = rt.pop();
    let _: &Intrinsics = rt.intrinsics();
}

/// Test memory accounting signatures
#[test]
fn contract_memory_accounting() {
    let rt = Runtime::new();
    let config = MemUsageConfig::default();
    let mut ctx = MemUsageContext::new(&config, &NoopChecker);
    let _: Result<MemUsage, MemUsageError> = rt.mem_usage(&mut ctx);
    let _: Result<MemUsage, MemUsageError> = rt.memory_usage();
    let _: Result<MemUsage, MemUsageError> = rt.estimate_memory_usage(&Value::Null);
}

/// Test RuntimeConfig::from_json(&str) -> Result<RuntimeConfig, ConfigError>
#[test]
fn contract_runtime_config() {
    let config: RuntimeConfig = RuntimeConfig::from_json("{}").unwrap();
    assert_eq!(config, RuntimeConfig::default());
    let rate = RateLimitConfig {
        rate_per_sec: 1.0,
        burst: 5,
    };
    let _: Result<TokenBucket, ConfigError> = rate.build();
    let json = serde_json::to_string(&RuntimeConfig {
        rate_limit: Some(rate),
        ..RuntimeConfig::default()
    })
    .unwrap();
    assert_eq!(RuntimeConfig::from_json(&json).unwrap().rate_limit, Some(rate));
}
