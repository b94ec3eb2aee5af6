//! Tick sources for the scheduler.

use std::thread;
use std::time::{Duration, Instant};

use crate::constants::SAMPLE_PERIOD;

pub trait Timebase {
    /// Returns when the next tick is due.
    fn wait_for_tick(&mut self);
}

/// Wakes on a fixed schedule of `start + n * period`. A late tick is logged
/// and the schedule restarts from now instead of firing a burst to catch up.
pub struct FixedRateTimebase {
    period: Duration,
    next: Option<Instant>,
    overruns: u64,
}

impl FixedRateTimebase {
    pub fn new(period: Duration) -> Self {
        FixedRateTimebase {
            period,
            next: None,
            overruns: 0,
        }
    }

    pub fn overruns(&self) -> u64 {
        self.overruns
    }
}

impl Default for FixedRateTimebase {
    fn default() -> Self {
        Self::new(SAMPLE_PERIOD)
    }
}

impl Timebase for FixedRateTimebase {
    fn wait_for_tick(&mut self) {
        let now = Instant::now();
        let Some(deadline) = self.next else {
            // First tick fires immediately.
            self.next = Some(now + self.period);
            return;
        };

        if now < deadline {
            thread::sleep(deadline - now);
            self.next = Some(deadline + self.period);
        } else {
            self.overruns += 1;
            log::warn!(
                "Tick overran its period by {:?} ({} overruns)",
                now - deadline,
                self.overruns
            );
            self.next = Some(now + self.period);
        }
    }
}

/// Ticks as fast as the caller can go, for replays.
pub struct Unpaced;

impl Timebase for Unpaced {
    fn wait_for_tick(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paces_ticks() {
        let mut timebase = FixedRateTimebase::new(Duration::from_millis(10));
        let start = Instant::now();
        for _ in 0..5 {
            timebase.wait_for_tick();
        }
        // First tick is immediate, four more periods follow.
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[test]
    fn counts_overruns() {
        let mut timebase = FixedRateTimebase::new(Duration::from_millis(1));
        timebase.wait_for_tick();
        thread::sleep(Duration::from_millis(5));
        timebase.wait_for_tick();
        assert_eq!(timebase.overruns(), 1);
    }
}
