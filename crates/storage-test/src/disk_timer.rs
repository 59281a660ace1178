use core::sync::atomic::{AtomicU32, Ordering};

use crate::{TimerTick, TICK_PERIOD_MS};

/// Countdown timer a disk driver arms before polling its device. The tick
/// interrupt decrements it, so the driver can give up on a device that never
/// becomes ready without having a clock of its own.
#[derive(Debug)]
pub struct DiskTimer {
    remaining_ticks: AtomicU32,
}

/// The driver's timed out waiting on its device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedOut;

impl DiskTimer {
    pub const fn new() -> Self {
        Self {
            remaining_ticks: AtomicU32::new(0),
        }
    }

    /// Starts a countdown of at least `timeout_ms`, rounded up to whole ticks.
    pub fn arm(&self, timeout_ms: u32) {
        let ticks = timeout_ms.div_ceil(TICK_PERIOD_MS);
        self.remaining_ticks.store(ticks, Ordering::Release);
    }

    pub fn remaining_ticks(&self) -> u32 {
        self.remaining_ticks.load(Ordering::Acquire)
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_ticks() == 0
    }

    /// Decrements the countdown, stopping at zero.
    pub fn tick(&self) {
        // An `Err` just means the timer already ran out.
        let _ = self
            .remaining_ticks
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| t.checked_sub(1));
    }

    /// Spins until `ready` returns `true`, or until `timeout_ms` worth of
    /// ticks have gone by. `ready` is checked at least once.
    pub fn wait_until<F>(&self, timeout_ms: u32, mut ready: F) -> Result<(), TimedOut>
    where
        F: FnMut() -> bool,
    {
        self.arm(timeout_ms);
        loop {
            if ready() {
                return Ok(());
            }
            if self.is_expired() {
                return Err(TimedOut);
            }
            core::hint::spin_loop();
        }
    }
}

impl TimerTick for DiskTimer {
    fn timer_tick(&self) {
        self.tick();
    }
}

/// The two timers a disk driver keeps: one for waiting on the device to go
/// idle, one for waiting on a data transfer. Ticking this ticks both.
#[derive(Debug)]
pub struct DiskTimers {
    pub busy: DiskTimer,
    pub transfer: DiskTimer,
}

impl DiskTimers {
    pub const fn new() -> Self {
        Self {
            busy: DiskTimer::new(),
            transfer: DiskTimer::new(),
        }
    }
}

impl TimerTick for DiskTimers {
    fn timer_tick(&self) {
        self.busy.tick();
        self.transfer.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn unarmed_timer_is_expired() {
        let timer = DiskTimer::new();
        assert!(timer.is_expired());
        timer.tick();
        assert_eq!(timer.remaining_ticks(), 0);
    }

    #[test]
    fn expires_after_armed_ticks() {
        let timer = DiskTimer::new();
        timer.arm(50);
        assert_eq!(timer.remaining_ticks(), 5);

        for _ in 0..4 {
            timer.tick();
            assert!(!timer.is_expired());
        }
        timer.tick();
        assert!(timer.is_expired());
    }

    #[test]
    fn arming_rounds_up_to_whole_ticks() {
        let timer = DiskTimer::new();
        timer.arm(1);
        assert_eq!(timer.remaining_ticks(), 1);
        timer.arm(11);
        assert_eq!(timer.remaining_ticks(), 2);
    }

    #[test]
    fn wait_until_ready() {
        let timer = DiskTimer::new();
        let mut polls = 0;
        let result = timer.wait_until(1000, || {
            polls += 1;
            polls == 3
        });
        assert_eq!(result, Ok(()));
        assert_eq!(polls, 3);
    }

    #[test]
    fn wait_until_times_out() {
        let timer = DiskTimer::new();
        // Stand in for the interrupt by ticking from inside the poll.
        let result = timer.wait_until(30, || {
            timer.tick();
            false
        });
        assert_eq!(result, Err(TimedOut));
        assert!(timer.is_expired());
    }

    #[test]
    fn timers_tick_together() {
        let timers = DiskTimers::new();
        timers.busy.arm(20);
        timers.transfer.arm(10);
        timers.timer_tick();
        assert_eq!(timers.busy.remaining_ticks(), 1);
        assert!(timers.transfer.is_expired());
    }

    proptest! {
        #[test]
        fn countdown_never_underflows(timeout_ms in 0u32..10_000, ticks in 0u32..2_000) {
            let timer = DiskTimer::new();
            timer.arm(timeout_ms);
            let armed = timer.remaining_ticks();
            prop_assert_eq!(armed, timeout_ms.div_ceil(TICK_PERIOD_MS));

            for _ in 0..ticks {
                timer.tick();
            }
            prop_assert_eq!(timer.remaining_ticks(), armed.saturating_sub(ticks));
        }
    }
}
