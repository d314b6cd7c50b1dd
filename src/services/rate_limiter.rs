//! Fixed-window rate limiter
//!
//! One counter per client key. The first hit in a window sets the counter's
//! expiry, so the window restarts when the key expires. A burst straddling
//! a boundary can admit up to twice the limit.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::AtomicCounter;
use crate::config::RateLimitConfig;
use crate::errors::Result;

const KEY_PREFIX: &str = "ratelimit:";

pub struct RateLimiter {
    counter: Arc<dyn AtomicCounter>,
    limit: i64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(counter: Arc<dyn AtomicCounter>, limit: i64, window: Duration) -> Self {
        Self {
            counter,
            limit,
            window,
        }
    }

    pub fn from_config(counter: Arc<dyn AtomicCounter>, config: &RateLimitConfig) -> Self {
        Self::new(counter, config.limit, Duration::from_secs(config.window_secs))
    }

    /// Non-positive limits disable throttling entirely
    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub async fn check(&self, client: &str) -> Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let key = format!("{}{}", KEY_PREFIX, client);
        self.counter.allow(&key, self.limit, self.window).await
    }
}
