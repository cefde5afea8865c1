//! Bounded polling with an injectable clock

use std::time::Duration;

use async_trait::async_trait;

use crate::config::PollPolicy;

/// Waits between poll attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real wall-clock sleeper
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Counts attempts against a [`PollPolicy`]
#[derive(Debug, Clone)]
pub struct Poller {
    policy: PollPolicy,
    attempts: u32,
}

impl Poller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
        }
    }

    /// Start the next attempt, returning its 1-based number
    pub fn next_attempt(&mut self) -> Option<u32> {
        if self.attempts < self.policy.max_attempts {
            self.attempts += 1;
            Some(self.attempts)
        } else {
            None
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.policy.max_attempts
    }

    /// True while at least one more attempt is allowed
    pub fn has_remaining(&self) -> bool {
        self.attempts < self.policy.max_attempts
    }

    pub fn interval(&self) -> Duration {
        self.policy.interval()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poller_counts() {
        let mut poller = Poller::new(PollPolicy {
            max_attempts: 3,
            interval_secs: 1,
        });

        assert_eq!(poller.next_attempt(), Some(1));
        assert!(poller.has_remaining());
        assert_eq!(poller.next_attempt(), Some(2));
        assert_eq!(poller.next_attempt(), Some(3));
        assert!(!poller.has_remaining());
        assert_eq!(poller.next_attempt(), None);
        assert_eq!(poller.attempts(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_advances_clock() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(5)).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}
