use core::fmt::{self, Write};

use lazy_static::lazy_static;
use spin::Mutex;
use storage_test::CrLf;
use uart_16550::SerialPort;
use x86_64::instructions::interrupts;

use crate::ansiterm::{AnsiEscapeSequence, CLEAR_FORMAT};

/// I/O base of COM1, wired to the host terminal by QEMU's `-serial stdio`.
const COM1_PORT: u16 = 0x3F8;

lazy_static! {
    /// Every line break goes out as `\r\n`, which raw serial terminals need.
    pub(crate) static ref SERIAL1: Mutex<CrLf<SerialPort>> = {
        let mut serial_port = unsafe { SerialPort::new(COM1_PORT) };
        serial_port.init();

        // Limine and the firmware before it leave formatting codes behind.
        // Reset colors and clear the screen so the test output starts clean.
        let _ = write!(
            serial_port,
            "{CLEAR_FORMAT}{}{}",
            AnsiEscapeSequence::MoveCursorTopLeft,
            AnsiEscapeSequence::ClearScreenFromCursorToEnd,
        );

        Mutex::new(CrLf::new(serial_port))
    };
}

/// Brings up the UART. Printing does this lazily too, but doing it first
/// thing means the port is ready before interrupts are enabled.
pub(crate) fn init() {
    lazy_static::initialize(&SERIAL1);
}

/// Releases the serial lock no matter who holds it.
///
/// # Safety
///
/// Only for the panic path, where the holder is never coming back.
pub(crate) unsafe fn force_unlock() {
    SERIAL1.force_unlock();
}

/// The console the storage test reports to.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Console;

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        // Disable interrupts while taking the lock so an interrupt handler
        // that prints can't deadlock against us.
        interrupts::without_interrupts(|| SERIAL1.lock().write_str(s))
    }

    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        interrupts::without_interrupts(|| SERIAL1.lock().write_fmt(args))
    }
}

#[doc(hidden)]
pub(crate) fn _print(args: fmt::Arguments) {
    // Nowhere left to report a broken serial port.
    let _ = Console.write_fmt(args);
}

/// Prints to the host through the serial interface.
#[macro_export]
macro_rules! serial_print {
    ($($arg:tt)*) => {
        $crate::serial::_print(format_args!($($arg)*))
    };
}

/// Prints to the host through the serial interface, appending a newline.
#[macro_export]
macro_rules! serial_println {
    () => ($crate::serial_print!("\n"));
    ($fmt:expr) => ($crate::serial_print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => ($crate::serial_print!(
        concat!($fmt, "\n"), $($arg)*));
}
