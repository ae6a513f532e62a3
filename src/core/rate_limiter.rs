// Rolling one-hour request window.
// Single caller: the limiter is owned by BreachChecker and mutated through
// `&mut self`, so purge, check and record never interleave.

use crate::core::Clock;
use crate::utils::error::Result;
use crate::utils::validation::validate_positive_number;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Length of the rolling window.
pub const WINDOW: Duration = Duration::from_secs(3600);

/// Longest single sleep while waiting for a slot.
pub const MAX_WAIT_CHUNK: Duration = Duration::from_secs(60);

pub struct RateLimiter {
    clock: Arc<dyn Clock>,
    hourly_limit: usize,
    inter_call_delay: Duration,
    history: VecDeque<DateTime<Utc>>,
}

impl RateLimiter {
    pub fn new(clock: Arc<dyn Clock>, hourly_limit: usize, inter_call_delay: Duration) -> Result<Self> {
        validate_positive_number("hourly_limit", hourly_limit, 1)?;

        tracing::info!(
            "Initialized with hourly limit: {} requests/hour, delay: {:?}",
            hourly_limit,
            inter_call_delay
        );

        Ok(Self {
            clock,
            hourly_limit,
            inter_call_delay,
            history: VecDeque::with_capacity(hourly_limit),
        })
    }

    pub fn hourly_limit(&self) -> usize {
        self.hourly_limit
    }

    pub fn inter_call_delay(&self) -> Duration {
        self.inter_call_delay
    }

    /// Number of recorded calls still inside the trailing hour.
    pub fn calls_in_window(&self) -> usize {
        let cutoff = self.cutoff(self.clock.now());
        self.history.iter().filter(|ts| **ts > cutoff).count()
    }

    /// Whether one more call right now stays within `hourly_limit`. Does not record anything.
    pub fn admit(&self) -> bool {
        self.calls_in_window() < self.hourly_limit
    }

    pub fn record_call(&mut self, timestamp: DateTime<Utc>) {
        self.history.push_back(timestamp);
    }

    /// Time until the oldest call in the window ages out. Zero or negative when
    /// a slot is already free.
    pub fn time_until_next_slot(&self) -> TimeDelta {
        let now = self.clock.now();
        let cutoff = self.cutoff(now);
        match self.history.iter().find(|ts| **ts > cutoff) {
            Some(oldest) if !self.admit() => *oldest + window() - now,
            _ => TimeDelta::zero(),
        }
    }

    /// Blocks until [`admit`](Self::admit) is true, sleeping at most
    /// [`MAX_WAIT_CHUNK`] at a time.
    pub async fn await_slot(&mut self) {
        loop {
            self.purge_expired();
            if self.admit() {
                return;
            }

            let wait = self.time_until_next_slot();
            if let Ok(wait) = wait.to_std() {
                if !wait.is_zero() {
                    tracing::warn!(
                        "⏳ Hourly rate limit ({}) reached. Waiting {} seconds...",
                        self.hourly_limit,
                        wait.as_secs()
                    );
                    self.clock.sleep(wait.min(MAX_WAIT_CHUNK)).await;
                }
            }
        }
    }

    fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - window()
    }

    fn purge_expired(&mut self) {
        let cutoff = self.cutoff(self.clock.now());
        // 時間戳依序寫入，最舊的永遠在前面
        while self.history.front().is_some_and(|ts| *ts <= cutoff) {
            self.history.pop_front();
        }
    }
}

fn window() -> TimeDelta {
    TimeDelta::seconds(WINDOW.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;

    fn limiter(limit: usize) -> (Arc<ManualClock>, RateLimiter) {
        let clock = Arc::new(ManualClock::default());
        let limiter = RateLimiter::new(clock.clone(), limit, Duration::ZERO).unwrap();
        (clock, limiter)
    }

    #[test]
    fn test_zero_limit_is_rejected() {
        let clock = Arc::new(ManualClock::default());
        assert!(RateLimiter::new(clock, 0, Duration::ZERO).is_err());
    }

    #[test]
    fn test_admit_is_false_once_limit_recorded() {
        let (clock, mut limiter) = limiter(3);

        for _ in 0..3 {
            assert!(limiter.admit());
            limiter.record_call(clock.now());
        }

        assert!(!limiter.admit());
        // admit 不會自行記錄
        assert_eq!(limiter.calls_in_window(), 3);
    }

    #[test]
    fn test_admit_reopens_exactly_at_one_hour() {
        let (clock, mut limiter) = limiter(2);
        limiter.record_call(clock.now());
        clock.advance(Duration::from_secs(10));
        limiter.record_call(clock.now());

        clock.advance(Duration::from_secs(3589));
        assert!(!limiter.admit());
        assert_eq!(limiter.time_until_next_slot(), TimeDelta::seconds(1));

        clock.advance(Duration::from_secs(1));
        assert!(limiter.admit());
        assert!(limiter.time_until_next_slot() <= TimeDelta::zero());
    }

    #[test]
    fn test_time_until_next_slot_is_zero_when_free() {
        let (clock, mut limiter) = limiter(2);
        assert_eq!(limiter.time_until_next_slot(), TimeDelta::zero());
        limiter.record_call(clock.now());
        assert_eq!(limiter.time_until_next_slot(), TimeDelta::zero());
    }

    #[tokio::test]
    async fn test_await_slot_returns_immediately_when_free() {
        let (clock, mut limiter) = limiter(5);
        limiter.record_call(clock.now());

        limiter.await_slot().await;

        assert!(clock.sleeps().is_empty());
    }

    #[tokio::test]
    async fn test_third_call_waits_one_hour_in_bounded_chunks() {
        let (clock, mut limiter) = limiter(2);
        let start = clock.now();

        limiter.await_slot().await;
        limiter.record_call(clock.now());
        limiter.await_slot().await;
        limiter.record_call(clock.now());

        limiter.await_slot().await;

        assert_eq!(clock.now() - start, TimeDelta::seconds(3600));
        let sleeps = clock.sleeps();
        assert_eq!(sleeps.len(), 60);
        assert!(sleeps.iter().all(|d| *d <= MAX_WAIT_CHUNK));
        assert!(limiter.admit());
        assert_eq!(limiter.calls_in_window(), 0);
    }

    #[tokio::test]
    async fn test_await_slot_waits_only_for_oldest_call() {
        let (clock, mut limiter) = limiter(2);
        let start = clock.now();
        limiter.record_call(clock.now());
        clock.advance(Duration::from_secs(1800));
        limiter.record_call(clock.now());

        limiter.await_slot().await;

        assert_eq!(clock.now() - start, TimeDelta::seconds(3600));
        assert_eq!(limiter.calls_in_window(), 1);
    }
}
