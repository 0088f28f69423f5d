//! Status polling schedule.

use std::time::Duration;

use crate::config::QuerySettings;

/// Capped exponential backoff bounded by a total wait budget.
///
/// Delays start at `initial`, double each poll up to `max`, and stop once
/// their sum reaches `wait_timeout`. The final delay is shortened so the last
/// poll lands exactly on the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    initial: Duration,
    max: Duration,
    wait_timeout: Duration,
}

impl PollPolicy {
    pub fn new(initial: Duration, max: Duration, wait_timeout: Duration) -> Self {
        let initial = initial.max(Duration::from_millis(1));
        Self {
            initial,
            max: max.max(initial),
            wait_timeout,
        }
    }

    pub fn from_settings(settings: &QuerySettings, wait_timeout: Duration) -> Self {
        Self::new(
            settings.initial_poll_interval(),
            settings.max_poll_interval(),
            wait_timeout,
        )
    }

    pub fn wait_timeout(&self) -> Duration {
        self.wait_timeout
    }

    /// Delay before each status poll, in order.
    ///
    /// Produced lazily, so a huge budget costs nothing until it is polled.
    pub fn schedule(&self) -> Schedule {
        Schedule {
            next: self.initial,
            max: self.max,
            remaining: self.wait_timeout,
        }
    }
}

/// Iterator over the delays of a [`PollPolicy`].
#[derive(Debug, Clone)]
pub struct Schedule {
    next: Duration,
    max: Duration,
    remaining: Duration,
}

impl Iterator for Schedule {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining.is_zero() {
            return None;
        }
        let delay = self.next.min(self.remaining);
        self.remaining -= delay;
        self.next = self.next.saturating_mul(2).min(self.max);
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_schedule_doubles_and_caps() {
        let policy = PollPolicy::new(ms(250), ms(1000), Duration::from_secs(4));
        assert_eq!(
            policy.schedule().collect::<Vec<_>>(),
            vec![ms(250), ms(500), ms(1000), ms(1000), ms(1000), ms(250)]
        );
    }

    #[test]
    fn test_schedule_never_exceeds_budget() {
        let policy = PollPolicy::new(ms(250), ms(5000), Duration::from_secs(50));
        let schedule: Vec<_> = policy.schedule().collect();
        let total: Duration = schedule.iter().sum();
        assert_eq!(total, Duration::from_secs(50));
        assert!(schedule.iter().all(|d| *d <= ms(5000)));
    }

    #[test]
    fn test_zero_budget_means_no_polls() {
        let policy = PollPolicy::new(ms(250), ms(5000), Duration::ZERO);
        assert_eq!(policy.schedule().next(), None);
    }

    #[test]
    fn test_degenerate_intervals_are_clamped() {
        let policy = PollPolicy::new(Duration::ZERO, Duration::ZERO, ms(3));
        assert_eq!(policy.schedule().collect::<Vec<_>>(), vec![ms(1), ms(1), ms(1)]);
    }

    #[test]
    fn test_unbounded_budget_is_lazy() {
        let policy = PollPolicy::new(ms(250), Duration::from_secs(5), Duration::MAX);
        let first: Vec<_> = policy.schedule().take(6).collect();
        assert_eq!(
            first,
            vec![ms(250), ms(500), ms(1000), ms(2000), ms(4000), ms(5000)]
        );
    }
}
