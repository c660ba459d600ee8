//! Request limiter shared by every attempt of one client

use governor::{DefaultDirectRateLimiter, Quota};
use std::num::NonZeroU32;
use std::time::Duration;
use tracing::debug;

pub struct RateLimiter {
    limiter: DefaultDirectRateLimiter,
    max_requests: u32,
}

impl RateLimiter {
    /// `max_requests` per `window`, bursting up to `max_requests`. Zero disables.
    pub fn new(max_requests: u32, window: Duration) -> Option<Self> {
        let burst = NonZeroU32::new(max_requests)?;
        let quota = Quota::with_period(window / max_requests)?.allow_burst(burst);
        Some(Self {
            limiter: DefaultDirectRateLimiter::direct(quota),
            max_requests,
        })
    }

    pub fn per_minute(max_requests: u32) -> Option<Self> {
        let burst = NonZeroU32::new(max_requests)?;
        Some(Self {
            limiter: DefaultDirectRateLimiter::direct(Quota::per_minute(burst)),
            max_requests,
        })
    }

    /// Wait until the quota admits one more request
    pub async fn acquire(&self) {
        if self.limiter.check().is_ok() {
            return;
        }
        debug!(limit = self.max_requests, "rate limit reached, waiting for a free slot");
        self.limiter.until_ready().await;
    }
}
