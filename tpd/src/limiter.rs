//! Token-bucket rate limiter for provider calls
//!
//! Every LLM request acquires a token before going on the wire. The bucket
//! refills continuously at `requests-per-second` and holds at most `burst`
//! tokens, so short spikes are absorbed while the sustained rate stays capped.

use std::sync::Mutex;
use tokio::time::{Duration, Instant, sleep};
use tracing::debug;

/// Rate limiter shared by all callers of one provider client
pub struct RateLimiter {
    inner: Mutex<Bucket>,
    rate: f64,
    burst: f64,
}

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a limiter refilling at `requests_per_second` with the given burst size
    pub fn new(requests_per_second: f64, burst: u32) -> Self {
        let rate = requests_per_second.max(0.001);
        let burst = f64::from(burst.max(1));
        Self {
            inner: Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            }),
            rate,
            burst,
        }
    }

    /// Wait until a token is available, then consume it
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut bucket = self.inner.lock().unwrap_or_else(|e| e.into_inner());
                self.refill(&mut bucket);

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }

                let deficit = 1.0 - bucket.tokens;
                Duration::from_secs_f64(deficit / self.rate)
            };

            // Sleep outside the lock so other tasks can refill and contend
            debug!(wait_ms = wait.as_millis() as u64, "RateLimiter::acquire: waiting for token");
            sleep(wait).await;
        }
    }

    /// Consume a token if one is available without waiting
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        self.refill(&mut bucket);

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate).min(self.burst);
        bucket.last_refill = now;
    }
}
