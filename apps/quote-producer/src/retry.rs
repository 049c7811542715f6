//! Startup Retry Policy
//!
//! Fixed-backoff retry used while waiting for the Kafka broker to come up.
//! The bound is explicit configuration: `max_attempts = 0` retries forever
//! (the production default, since this is a startup dependency wait), while
//! tests run with a finite bound.

use std::time::Duration;

use crate::config::RetrySettings;

/// Fixed-backoff retry policy with an optional attempt bound.
#[derive(Debug)]
pub struct RetryPolicy {
    backoff: Duration,
    max_attempts: u32,
    attempt_count: u32,
}

impl RetryPolicy {
    /// Create a new policy.
    #[must_use]
    pub const fn new(backoff: Duration, max_attempts: u32) -> Self {
        Self {
            backoff,
            max_attempts,
            attempt_count: 0,
        }
    }

    /// Get the delay before the next attempt, counting the attempt.
    ///
    /// Returns `None` once the attempt bound is exhausted.
    #[must_use]
    pub const fn next_delay(&mut self) -> Option<Duration> {
        if self.max_attempts > 0 && self.attempt_count >= self.max_attempts {
            return None;
        }
        self.attempt_count += 1;
        Some(self.backoff)
    }

    /// Number of attempts made so far.
    #[must_use]
    pub const fn attempt_count(&self) -> u32 {
        self.attempt_count
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self::new(settings.backoff, settings.max_attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_policy_always_yields_fixed_delay() {
        let mut policy = RetryPolicy::new(Duration::from_secs(5), 0);
        for _ in 0..1000 {
            assert_eq!(policy.next_delay(), Some(Duration::from_secs(5)));
        }
    }

    #[test]
    fn bounded_policy_exhausts_after_max_attempts() {
        let mut policy = RetryPolicy::new(Duration::from_millis(10), 3);
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert_eq!(policy.attempt_count(), 3);
        assert!(policy.next_delay().is_none());
    }

    #[test]
    fn policy_from_settings() {
        let settings = RetrySettings {
            backoff: Duration::from_secs(2),
            max_attempts: 7,
        };
        let mut policy = RetryPolicy::from(&settings);
        assert_eq!(policy.next_delay(), Some(Duration::from_secs(2)));
    }
}
