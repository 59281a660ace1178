//! Intel 8253/8254 Programmable Interval Timer. Channel 0 drives IRQ 0, which
//! is the tick interrupt. See <https://wiki.osdev.org/Programmable_Interval_Timer>.

use x86_64::instructions::port::{Port, PortWriteOnly};

/// Input clock of the PIT.
const PIT_BASE_FREQUENCY_HZ: u32 = 1_193_182;

const CHANNEL0_DATA_PORT: u16 = 0x40;
const COMMAND_PORT: u16 = 0x43;

/// Channel 0, lobyte/hibyte access, mode 3 (square wave), binary.
const CHANNEL0_SQUARE_WAVE: u8 = 0b0011_0110;

/// Reload value that gets channel 0 closest to `hz`.
const fn divisor_for(hz: u32) -> u16 {
    let divisor = (PIT_BASE_FREQUENCY_HZ + hz / 2) / hz;
    if divisor > u16::MAX as u32 {
        u16::MAX
    } else if divisor < 1 {
        1
    } else {
        divisor as u16
    }
}

/// Programs channel 0 to fire at `hz`. Must run with interrupts disabled.
pub(crate) fn init(hz: u32) {
    let divisor = divisor_for(hz);
    let [low, high] = divisor.to_le_bytes();

    let mut command = PortWriteOnly::<u8>::new(COMMAND_PORT);
    let mut channel0 = Port::<u8>::new(CHANNEL0_DATA_PORT);
    unsafe {
        command.write(CHANNEL0_SQUARE_WAVE);
        channel0.write(low);
        channel0.write(high);
    }

    log::info!(
        "PIT channel 0 running at {} Hz (divisor {divisor})",
        PIT_BASE_FREQUENCY_HZ / u32::from(divisor)
    );
}
