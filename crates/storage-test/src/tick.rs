//! Periodic housekeeping tick for the filesystem driver.

/// Frequency of the housekeeping tick. Disk drivers count their timeouts in
/// these ticks.
pub const TICK_HZ: u32 = 100;

/// Milliseconds between two ticks.
pub const TICK_PERIOD_MS: u32 = 1000 / TICK_HZ;

const _: () = assert!(
    1000 % TICK_HZ == 0,
    "TICK_HZ must be a divisor of 1000 so we can evenly divide milliseconds into ticks"
);

/// Timer entry point of a filesystem or disk driver, called once per tick.
///
/// This is called in interrupt context, concurrently with whatever I/O the
/// driver is doing on the main thread. It must not block, allocate, take a
/// lock the main thread may hold, or call back into the filesystem or block
/// layer.
pub trait TimerTick {
    fn timer_tick(&self);
}

/// An output that shows the tick is alive, like an LED.
pub trait LivenessIndicator {
    /// Same interrupt-context rules as [`TimerTick::timer_tick`].
    fn toggle(&self);
}

impl<T: TimerTick + ?Sized> TimerTick for &T {
    fn timer_tick(&self) {
        (**self).timer_tick();
    }
}

impl<L: LivenessIndicator + ?Sized> LivenessIndicator for &L {
    fn toggle(&self) {
        (**self).toggle();
    }
}

/// Forwards each timer interrupt to the driver and toggles the liveness
/// indicator. Meant to live in a `static` that the interrupt handler calls
/// [`on_tick`] on `TICK_HZ` times per second.
///
/// The handler runs on the interrupt context, not the thread running the
/// storage test. The driver behind `T` has to tolerate ticks arriving in the
/// middle of its own I/O calls, and the timer interrupt must not be preempted
/// by anything that does storage I/O. Missed ticks only make the driver's
/// timeouts longer; nothing here detects them.
///
/// [`on_tick`]: TickService::on_tick
#[derive(Debug)]
pub struct TickService<T, L> {
    timer: T,
    indicator: L,
}

impl<T: TimerTick, L: LivenessIndicator> TickService<T, L> {
    pub const fn new(timer: T, indicator: L) -> Self {
        Self { timer, indicator }
    }

    pub fn on_tick(&self) {
        self.timer.timer_tick();
        self.indicator.toggle();
    }
}
