//! Log rate limiting for errors that can repeat on every poll.
//!
//! Works on fixed windows: up to `burst` messages pass per `interval`, the
//! rest are counted. When a new window opens, the number of messages dropped in
//! the previous one is handed back so the caller can log it once.

use std::time::{Duration, Instant};

/// Default window length.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Default number of messages allowed per window.
pub const DEFAULT_BURST: u32 = 10;

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimit {
    /// Emit the message. `suppressed` messages were dropped before this window opened.
    Allowed { suppressed: u32 },

    /// Drop the message.
    Suppressed,
}

impl RateLimit {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Fixed-window message limiter.
///
/// # Examples
///
/// ```
/// use std::time::{Duration, Instant};
/// use touchpoll_hardware::ratelimit::{RateLimit, RateLimiter};
///
/// let mut limiter = RateLimiter::new(Duration::from_secs(5), 2);
/// let start = Instant::now();
///
/// assert!(limiter.check_at(start).is_allowed());
/// assert!(limiter.check_at(start).is_allowed());
/// assert_eq!(limiter.check_at(start), RateLimit::Suppressed);
///
/// let later = start + Duration::from_secs(6);
/// assert_eq!(limiter.check_at(later), RateLimit::Allowed { suppressed: 1 });
/// ```
#[derive(Debug, Clone)]
pub struct RateLimiter {
    interval: Duration,
    burst: u32,
    window_start: Option<Instant>,
    printed: u32,
    missed: u32,
}

impl RateLimiter {
    pub fn new(interval: Duration, burst: u32) -> Self {
        Self {
            interval,
            burst,
            window_start: None,
            printed: 0,
            missed: 0,
        }
    }

    /// Check against the current time.
    pub fn check(&mut self) -> RateLimit {
        self.check_at(Instant::now())
    }

    /// Check against an explicit time.
    pub fn check_at(&mut self, now: Instant) -> RateLimit {
        let mut suppressed = 0;
        match self.window_start {
            None => self.window_start = Some(now),
            Some(start) if now.saturating_duration_since(start) > self.interval => {
                suppressed = std::mem::take(&mut self.missed);
                self.window_start = Some(now);
                self.printed = 0;
            }
            Some(_) => {}
        }

        if self.printed < self.burst {
            self.printed += 1;
            RateLimit::Allowed { suppressed }
        } else {
            self.missed = self.missed.saturating_add(1);
            RateLimit::Suppressed
        }
    }

    /// Messages dropped so far in the current window.
    pub fn missed(&self) -> u32 {
        self.missed
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL, DEFAULT_BURST)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_then_suppress() {
        let mut limiter = RateLimiter::default();
        let start = Instant::now();

        for _ in 0..DEFAULT_BURST {
            assert_eq!(
                limiter.check_at(start),
                RateLimit::Allowed { suppressed: 0 }
            );
        }
        for _ in 0..5 {
            assert_eq!(limiter.check_at(start), RateLimit::Suppressed);
        }
        assert_eq!(limiter.missed(), 5);
    }

    #[test]
    fn test_window_reopens_with_suppressed_count() {
        let mut limiter = RateLimiter::new(Duration::from_millis(100), 1);
        let start = Instant::now();

        assert!(limiter.check_at(start).is_allowed());
        assert_eq!(
            limiter.check_at(start + Duration::from_millis(50)),
            RateLimit::Suppressed
        );
        assert_eq!(
            limiter.check_at(start + Duration::from_millis(100)),
            RateLimit::Suppressed
        );

        let reopened = limiter.check_at(start + Duration::from_millis(101));
        assert_eq!(reopened, RateLimit::Allowed { suppressed: 2 });
        assert_eq!(limiter.missed(), 0);
    }

    #[test]
    fn test_quiet_window_reports_nothing() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1), 3);
        let start = Instant::now();

        assert!(limiter.check_at(start).is_allowed());
        assert_eq!(
            limiter.check_at(start + Duration::from_secs(2)),
            RateLimit::Allowed { suppressed: 0 }
        );
    }

    #[test]
    fn test_zero_burst_suppresses_everything() {
        let mut limiter = RateLimiter::new(Duration::from_secs(1), 0);
        assert_eq!(limiter.check(), RateLimit::Suppressed);
        assert_eq!(limiter.check(), RateLimit::Suppressed);
    }
}
