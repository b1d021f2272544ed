//! # retry
//!
//! Bounded connection retry with exponential backoff and cancellation

use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

use remotefs::RemoteError;

/// Retry policy applied when connecting to the share.
///
/// The delay before retry `n` (0-based) is `initial_delay * multiplier^n`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub(crate) max_attempts: Option<u32>,
    pub(crate) initial_delay: Duration,
    pub(crate) max_delay: Duration,
    pub(crate) multiplier: f64,
    pub(crate) attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: Some(5),
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(60),
            multiplier: 2.0,
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Retry until connected or cancelled. Pair it with a [`CancelToken`].
    pub fn forever() -> Self {
        Self {
            max_attempts: None,
            ..Default::default()
        }
    }

    /// Construct RetryPolicy with the provided attempt budget (at least 1)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts.max(1));
        self
    }

    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Construct RetryPolicy with the provided backoff multiplier; values below 1 are clamped to 1
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = if multiplier.is_finite() {
            multiplier.max(1.0)
        } else {
            1.0
        };
        self
    }

    /// Timeout of a single connection attempt
    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.attempt_timeout
    }

    /// Delay to wait after the failed attempt `attempt` (0-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.multiplier.powi(exp);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}

/// Cancels a pending connection from any thread.
///
/// Cloned tokens share the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        *self.inner.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleep for `timeout` or until cancelled. Returns whether the token has been cancelled.
    pub fn wait(&self, timeout: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = lock.lock().unwrap_or_else(PoisonError::into_inner);
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            cancelled = cvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        *cancelled
    }
}

/// Why the retry loop gave up
#[derive(Debug)]
pub(crate) enum RetryError {
    Cancelled,
    Exhausted { attempts: u32, last: RemoteError },
}

/// Call `attempt_fn` until it succeeds, the policy runs out of attempts or `cancel` fires.
///
/// `attempt_fn` receives the 1-based attempt number.
pub(crate) fn retry<T, F>(
    policy: &RetryPolicy,
    cancel: Option<&CancelToken>,
    mut attempt_fn: F,
) -> Result<T, RetryError>
where
    F: FnMut(u32) -> Result<T, RemoteError>,
{
    let mut attempts: u32 = 0;
    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            debug!("connection cancelled before attempt {}", attempts + 1);
            return Err(RetryError::Cancelled);
        }
        attempts = attempts.saturating_add(1);
        let err = match attempt_fn(attempts) {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if policy.exhausted(attempts) {
            error!("giving up after {} attempt(s): {}", attempts, err);
            return Err(RetryError::Exhausted {
                attempts,
                last: err,
            });
        }
        let delay = policy.delay_for(attempts - 1);
        warn!("attempt {} failed: {}. Retry in {:?}", attempts, err, delay);
        let cancelled = match cancel {
            Some(token) => token.wait(delay),
            None => {
                std::thread::sleep(delay);
                false
            }
        };
        if cancelled {
            debug!("connection cancelled while waiting for attempt {}", attempts + 1);
            return Err(RetryError::Cancelled);
        }
    }
}
