//! Frame pacing for blocking animation loops.

use std::thread;
use std::time::{Duration, Instant};

/// Caps a loop at a target iteration rate.
///
/// Call [`RateLimiter::rate`] once per iteration; it sleeps until one
/// period has passed since the previous call. The first call never sleeps.
/// If an iteration overruns, the schedule restarts from now instead of
/// bursting to catch up.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    period: Duration,
    next_deadline: Option<Instant>,
}

impl RateLimiter {
    /// Limiter for `hz` iterations per second. Non-positive rates, and rates
    /// too slow for their period to fit a [`Duration`], disable pacing.
    pub fn new(hz: f64) -> Self {
        let period = if hz.is_finite() && hz > 0.0 {
            Duration::try_from_secs_f64(1.0 / hz).unwrap_or_default()
        } else {
            Duration::ZERO
        };
        Self {
            period,
            next_deadline: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Block until the next iteration may start
    pub fn rate(&mut self) {
        let now = Instant::now();
        if let Some(deadline) = self.next_deadline {
            if deadline > now {
                thread::sleep(deadline - now);
                self.next_deadline = Some(deadline + self.period);
                return;
            }
        }
        self.next_deadline = Some(now + self.period);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_from_rate() {
        assert_eq!(RateLimiter::new(100.0).period(), Duration::from_millis(10));
        assert_eq!(RateLimiter::new(0.0).period(), Duration::ZERO);
    }

    #[test]
    fn test_unrepresentable_period_disables_pacing() {
        let mut limiter = RateLimiter::new(1e-300);
        assert_eq!(limiter.period(), Duration::ZERO);
        let start = Instant::now();
        limiter.rate();
        limiter.rate();
        assert!(start.elapsed() < Duration::from_millis(15));
    }

    #[test]
    fn test_first_call_does_not_block_and_second_waits() {
        let mut limiter = RateLimiter::new(50.0);
        let start = Instant::now();
        limiter.rate();
        assert!(start.elapsed() < Duration::from_millis(15));
        limiter.rate();
        assert!(start.elapsed() >= Duration::from_millis(19));
    }
}
