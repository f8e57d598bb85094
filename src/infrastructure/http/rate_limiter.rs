//! Token-bucket rate limiter shared by the service clients.

use std::time::{Duration, Instant};

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. When the bucket is
/// exhausted, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets.
#[derive(Debug)]
pub struct RateLimiter {
    /// Service name, for log events.
    service: &'static str,
    capacity: u32,
    tokens: u32,
    window: Duration,
    window_start: Instant,
}

impl RateLimiter {
    /// Allows `capacity` requests per `window` for `service`.
    pub fn new(service: &'static str, capacity: u32, window: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            service,
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// `requests_per_minute` tokens, refilled every 60 seconds.
    pub fn per_minute(service: &'static str, requests_per_minute: u32) -> Self {
        Self::new(service, requests_per_minute, Duration::from_secs(60))
    }

    /// Acquire a single token, sleeping if necessary.
    pub async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
        } else {
            let remaining = self.window.saturating_sub(elapsed);
            tracing::warn!(
                service = self.service,
                sleep_ms = u64::try_from(remaining.as_millis()).unwrap_or(u64::MAX),
                "rate limit reached, sleeping"
            );
            tokio::time::sleep(remaining).await;
            self.tokens = self.capacity - 1;
            self.window_start = Instant::now();
        }
    }

    /// Configured capacity per window.
    pub const fn available(&self) -> u32 {
        self.tokens
    }
}
