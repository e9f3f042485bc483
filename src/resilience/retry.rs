//! Probe retry policy.
//!
//! # Design Decisions
//! - Only network-level failures are retried; a received response is final
//! - Fixed pause between attempts with up to 10% jitter so probes of many
//!   services that failed together do not retry in lockstep

use std::time::Duration;
use rand::Rng;

use crate::config::CheckConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Base pause between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(retries: u32, delay: Duration) -> Self {
        Self { retries, delay }
    }

    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Whether another attempt is allowed after `attempts` have failed.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.max_attempts()
    }

    /// Pause before the next attempt.
    pub fn pause(&self) -> Duration {
        let base_ms = self.delay.as_millis() as u64;
        let jitter_range = base_ms / 10;
        let jitter = if jitter_range > 0 {
            rand::thread_rng().gen_range(0..jitter_range)
        } else {
            0
        };
        Duration::from_millis(base_ms + jitter)
    }
}

impl From<&CheckConfig> for RetryPolicy {
    fn from(config: &CheckConfig) -> Self {
        Self::new(config.retries, config.retry_delay())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_budget_is_three_attempts() {
        let policy = RetryPolicy::from(&CheckConfig::default());
        assert_eq!(policy.max_attempts(), 3);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(2));
        assert!(!policy.should_retry(3));
    }

    #[test]
    fn zero_retries_means_single_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        assert!(!policy.should_retry(1));
    }

    #[test]
    fn pause_stays_within_jitter_band() {
        let policy = RetryPolicy::new(2, Duration::from_millis(1000));
        for _ in 0..50 {
            let pause = policy.pause().as_millis();
            assert!((1000..1100).contains(&pause));
        }
        assert_eq!(RetryPolicy::new(1, Duration::from_millis(5)).pause(), Duration::from_millis(5));
    }
}
