use crate::ansiterm::{AnsiEscapeSequence, Color, SelectGraphicRendition, CLEAR_FORMAT};
use crate::serial_println;

/// Sends `log` records to the serial console, one colored line per record.
struct SerialLogger;

static LOGGER: SerialLogger = SerialLogger;

#[cfg(feature = "verbose")]
const MAX_LEVEL: log::LevelFilter = log::LevelFilter::Debug;
#[cfg(not(feature = "verbose"))]
const MAX_LEVEL: log::LevelFilter = log::LevelFilter::Info;

const fn level_color(level: log::Level) -> Color {
    match level {
        log::Level::Error => Color::Red,
        log::Level::Warn => Color::Yellow,
        log::Level::Info => Color::Green,
        // Plain white renders as grey, which keeps debug output quiet.
        log::Level::Debug | log::Level::Trace => Color::White,
    }
}

impl log::Log for SerialLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let color = AnsiEscapeSequence::SelectGraphicRendition(
            SelectGraphicRendition::ForegroundColor(level_color(record.level())),
        );
        serial_println!(
            "{color}[{}]{CLEAR_FORMAT} {}",
            record.level(),
            record.args(),
            color = color,
            CLEAR_FORMAT = CLEAR_FORMAT
        );
    }

    fn flush(&self) {}
}

pub(crate) fn init() {
    // Only fails if a logger is already installed, and nothing else installs one.
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(MAX_LEVEL);
    }
    log::debug!("logging at {MAX_LEVEL}");
}
