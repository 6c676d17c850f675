//! Seconds-remaining countdown for one resource.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Integer seconds remaining until the next refresh.
///
/// Decremented once per second by the scheduler loop; wraps back to the
/// configured interval when it reaches zero or when a refresh is triggered
/// out of band.
#[derive(Debug)]
pub struct Countdown {
    interval_secs: u64,
    remaining: AtomicU64,
}

impl Countdown {
    /// Sub-second intervals clamp to one second, the tick granularity.
    pub fn new(interval: Duration) -> Self {
        let interval_secs = interval.as_secs().max(1);
        Self {
            interval_secs,
            remaining: AtomicU64::new(interval_secs),
        }
    }

    /// Decrement by one second. Returns `true` when the countdown reached
    /// zero on this tick (the caller resets and fires the refresh).
    pub fn tick(&self) -> bool {
        let mut current = self.remaining.load(Ordering::Acquire);
        loop {
            let next = current.saturating_sub(1);
            match self.remaining.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next == 0,
                Err(observed) => current = observed,
            }
        }
    }

    /// Wrap back to the full interval.
    pub fn reset(&self) {
        self.remaining.store(self.interval_secs, Ordering::Release);
    }

    /// Seconds remaining, for display.
    pub fn remaining(&self) -> u64 {
        self.remaining.load(Ordering::Acquire)
    }

    /// Configured interval in whole seconds.
    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reaches_zero_at_interval_then_resets() {
        // intervalMs=5000: decremented once per second, reaches 0 at t=5s.
        let countdown = Countdown::new(Duration::from_millis(5000));
        assert_eq!(countdown.remaining(), 5);

        for t in 1..=4 {
            assert!(!countdown.tick());
            assert_eq!(countdown.remaining(), 5 - t);
        }
        assert!(countdown.tick());
        assert_eq!(countdown.remaining(), 0);

        countdown.reset();
        assert_eq!(countdown.remaining(), 5);
    }

    #[test]
    fn test_out_of_band_reset_restarts_interval() {
        let countdown = Countdown::new(Duration::from_secs(10));
        countdown.tick();
        countdown.tick();
        assert_eq!(countdown.remaining(), 8);

        // A push-triggered refresh resets mid-interval.
        countdown.reset();
        assert_eq!(countdown.remaining(), 10);
    }

    #[test]
    fn test_sub_second_interval_clamps() {
        let countdown = Countdown::new(Duration::from_millis(250));
        assert_eq!(countdown.interval_secs(), 1);
        assert!(countdown.tick());
    }
}
