//! Reconnect policy with geometric backoff
//!
//! The first reconnect waits the base delay; repeated immediate failures
//! double the wait, capped at six times the base. Random jitter prevents
//! thundering herd when several adapters reconnect at once.

use std::time::Duration;

/// Backoff cap as a multiple of the base delay.
const MAX_BACKOFF_MULTIPLIER: u32 = 6;

/// Jitter range added to every delay (milliseconds).
const JITTER_RANGE_MS: u64 = 200;

/// Reconnect timing policy shared by all venue adapters.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    /// Base delay before the first reconnect attempt
    pub base_delay: Duration,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration) -> Self {
        Self { base_delay }
    }

    /// Delay before reconnect attempt `attempt` (0-based), without jitter.
    ///
    /// `min(base × 2^attempt, base × 6)`
    pub fn backoff(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let cap_ms = base_ms.saturating_mul(MAX_BACKOFF_MULTIPLIER as u64);
        let ms = base_ms
            .saturating_mul(1u64 << attempt.min(32))
            .min(cap_ms);
        Duration::from_millis(ms)
    }

    /// Backoff plus 0–199ms of random jitter.
    pub fn backoff_with_jitter(&self, attempt: u32) -> Duration {
        let jitter = rand::random::<u64>() % JITTER_RANGE_MS;
        self.backoff(attempt) + Duration::from_millis(jitter)
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}
