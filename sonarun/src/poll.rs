//! Bounded polling policy shared by the readiness and task pollers.
//!
//! A [`PollPolicy`] fixes how many attempts a poller may make and how long it
//! waits between them. Waiting goes through the [`Sleeper`] trait so tests can
//! record the requested delays instead of spending wall-clock time.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How the delay grows between attempts
#[derive(Clone, Debug, PartialEq)]
pub enum Backoff {
    /// Same delay before every retry
    Fixed,
    /// Delay multiplied by `multiplier` after each retry, capped at `max_interval`
    Exponential {
        multiplier: f64,
        max_interval: Duration,
    },
}

/// Bounded retry policy for a polling loop
#[derive(Clone, Debug, PartialEq)]
pub struct PollPolicy {
    /// Total number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub interval: Duration,
    pub backoff: Backoff,
}

impl PollPolicy {
    /// Fixed-interval policy
    #[must_use]
    pub fn fixed(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
            backoff: Backoff::Fixed,
        }
    }

    /// Switch to exponential backoff.
    #[must_use]
    pub fn with_exponential_backoff(mut self, multiplier: f64, max_interval: Duration) -> Self {
        self.backoff = Backoff::Exponential {
            multiplier,
            max_interval,
        };
        self
    }

    /// Delay to wait after the given 1-based attempt failed.
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match &self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential {
                multiplier,
                max_interval,
            } => {
                let exponent = attempt.saturating_sub(1).min(32) as i32;
                let millis = self.interval.as_millis() as f64 * multiplier.powi(exponent);
                let delay = if millis.is_finite() && millis < max_interval.as_millis() as f64 {
                    Duration::from_millis(millis as u64)
                } else {
                    *max_interval
                };
                delay.min(*max_interval)
            }
        }
    }

    /// Check whether another attempt is allowed after `attempt` attempts.
    #[must_use]
    pub fn has_attempts_left(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

/// Readiness defaults: 30 attempts every 10 seconds
impl Default for PollPolicy {
    fn default() -> Self {
        Self::fixed(30, Duration::from_secs(10))
    }
}

/// Suspension point of the polling loops.
pub trait Sleeper {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records requested delays and returns immediately
#[derive(Debug, Clone, Default)]
pub struct RecordingSleeper {
    delays: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order
    #[must_use]
    pub fn delays(&self) -> Vec<Duration> {
        self.delays
            .lock()
            .map(|delays| delays.clone())
            .unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.interval, Duration::from_secs(10));
        assert_eq!(policy.backoff, Backoff::Fixed);
    }

    #[test]
    fn test_fixed_delay() {
        let policy = PollPolicy::fixed(5, Duration::from_secs(10));
        assert_eq!(policy.delay_after(1), Duration::from_secs(10));
        assert_eq!(policy.delay_after(4), Duration::from_secs(10));
    }

    #[test]
    fn test_exponential_delay_is_capped() {
        let policy = PollPolicy::fixed(10, Duration::from_secs(1))
            .with_exponential_backoff(2.0, Duration::from_secs(5));
        assert_eq!(policy.delay_after(1), Duration::from_secs(1));
        assert_eq!(policy.delay_after(2), Duration::from_secs(2));
        assert_eq!(policy.delay_after(3), Duration::from_secs(4));
        assert_eq!(policy.delay_after(4), Duration::from_secs(5));
        assert_eq!(policy.delay_after(40), Duration::from_secs(5));
    }

    #[test]
    fn test_attempt_budget() {
        let policy = PollPolicy::fixed(3, Duration::from_secs(1));
        assert!(policy.has_attempts_left(1));
        assert!(policy.has_attempts_left(2));
        assert!(!policy.has_attempts_left(3));
    }

    #[tokio::test]
    async fn test_recording_sleeper() {
        let sleeper = RecordingSleeper::new();
        sleeper.sleep(Duration::from_secs(3)).await;
        sleeper.sleep(Duration::from_secs(7)).await;
        assert_eq!(
            sleeper.delays(),
            vec![Duration::from_secs(3), Duration::from_secs(7)]
        );
    }
}
