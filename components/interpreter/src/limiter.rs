//! Rate limiters consulted by the tick hook.

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::trace;

use crate::{CancellationToken, LimiterError};

/// Grants execution ticks at a bounded rate.
///
/// Implementations are shared with host threads, hence `Send + Sync`.
pub trait RateLimiter: Send + Sync + fmt::Debug {
    /// Most tokens a single wait may request.
    fn burst(&self) -> usize;

    /// Blocks until `n` tokens are available and takes them.
    ///
    /// # Errors
    ///
    /// [`LimiterError::Cancelled`] if `token` is cancelled before or during
    /// the wait; [`LimiterError::ExceedsBurst`] if `n` can never be granted;
    /// [`LimiterError::WouldExceedDeadline`] if the tokens would not arrive
    /// before the token's deadline. Nothing is taken on failure.
    fn wait_n(&self, n: usize, token: &CancellationToken) -> Result<(), LimiterError>;
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last: Instant,
}

/// Token bucket refilled continuously at `rate` tokens per second up to
/// `burst` tokens. Starts full.
///
/// # Examples
///
/// ```
/// use interpreter::{CancellationToken, RateLimiter, TokenBucket};
///
/// let bucket = TokenBucket::new(1000.0, 50);
/// let token = CancellationToken::new();
/// bucket.wait_n(50, &token).unwrap();
/// assert!(bucket.wait_n(51, &token).is_err());
/// ```
#[derive(Debug)]
pub struct TokenBucket {
    rate: f64,
    burst: usize,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Bucket with the given refill rate and capacity. Negative or NaN rates
    /// are treated as zero.
    pub fn new(rate_per_sec: f64, burst: usize) -> Self {
        TokenBucket {
            rate: rate_per_sec.max(0.0),
            burst,
            state: Mutex::new(BucketState {
                tokens: burst as f64,
                last: Instant::now(),
            }),
        }
    }

    /// Bucket that never makes anyone wait.
    pub fn unlimited(burst: usize) -> Self {
        Self::new(f64::INFINITY, burst)
    }

    /// Refill rate in tokens per second.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// Tokens that could be taken right now without waiting.
    pub fn available(&self) -> f64 {
        let mut state = self.state.lock();
        self.advance(&mut state, Instant::now());
        state.tokens
    }

    fn advance(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last).as_secs_f64();
        if elapsed > 0.0 {
            state.tokens = (state.tokens + elapsed * self.rate).min(self.burst as f64);
            state.last = now;
        }
    }

    // Takes `n` tokens, possibly driving the balance negative, and returns
    // how long the caller must wait for the debt to clear.
    fn reserve(&self, n: usize, now: Instant, deadline: Option<Instant>) -> Result<Instant, LimiterError> {
        let mut state = self.state.lock();
        self.advance(&mut state, now);
        let remaining = state.tokens - n as f64;
        let ready_at = if remaining >= 0.0 {
            now
        } else {
            Duration::try_from_secs_f64(-remaining / self.rate)
                .ok()
                .and_then(|wait| now.checked_add(wait))
                .ok_or(LimiterError::WouldExceedDeadline)?
        };
        if deadline.is_some_and(|deadline| ready_at > deadline) {
            return Err(LimiterError::WouldExceedDeadline);
        }
        state.tokens = remaining;
        Ok(ready_at)
    }
}

impl RateLimiter for TokenBucket {
    fn burst(&self) -> usize {
        self.burst
    }

    fn wait_n(&self, n: usize, token: &CancellationToken) -> Result<(), LimiterError> {
        if token.is_cancelled() {
            return Err(LimiterError::Cancelled);
        }
        if self.rate.is_infinite() {
            return Ok(());
        }
        if n > self.burst {
            return Err(LimiterError::ExceedsBurst {
                requested: n,
                burst: self.burst,
            });
        }
        let now = Instant::now();
        let ready_at = self.reserve(n, now, token.deadline())?;
        if ready_at <= now {
            return Ok(());
        }
        trace!(n, wait = ?(ready_at - now), "waiting for rate limiter");
        if token.wait_until(ready_at) {
            let mut state = self.state.lock();
            state.tokens = (state.tokens + n as f64).min(self.burst as f64);
            return Err(LimiterError::Cancelled);
        }
        Ok(())
    }
}
