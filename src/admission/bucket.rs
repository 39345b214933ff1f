//! Token bucket admission arithmetic for a single client.

use std::time::Instant;

/// A token bucket with a fixed refill rate and burst capacity.
///
/// The bucket holds up to `burst` tokens, refills continuously at
/// `rate_per_second`, and each admitted request consumes exactly one token.
/// Pure arithmetic over `(state, now)`; callers are responsible for
/// serializing concurrent access (see [`crate::admission::ClientRegistry`]).
#[derive(Debug)]
pub struct TokenBucket {
    rate_per_second: f64,
    burst: u32,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket. Rate and burst are immutable afterwards.
    ///
    /// A non-positive rate or a zero burst degenerates to always-rejected;
    /// configuration validation rejects such values before they get here.
    pub fn new(rate_per_second: f64, burst: u32) -> Self {
        Self {
            rate_per_second,
            burst,
            tokens: burst as f64,
            last_refill: Instant::now(),
        }
    }

    /// Refill proportionally to the time elapsed since the last call, then
    /// try to consume one token. Returns `true` if the request is admitted.
    ///
    /// A `now` earlier than the last refill counts as zero elapsed time.
    pub fn allow(&mut self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate_per_second).min(self.burst as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}
