use embedded_sdmmc::{TimeSource, Timestamp};

/// A clock that always reads the same time. The board has no RTC, so every
/// file we touch gets this modification time.
#[derive(Debug, Clone, Copy)]
pub struct FixedTimeSource {
    timestamp: Timestamp,
}

impl FixedTimeSource {
    /// 2018-02-01 00:00:00.
    pub const DEFAULT: Self = Self::new(Timestamp {
        year_since_1970: 48,
        zero_indexed_month: 1,
        zero_indexed_day: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    });

    pub const fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }
}

impl Default for FixedTimeSource {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TimeSource for FixedTimeSource {
    fn get_timestamp(&self) -> Timestamp {
        self.timestamp
    }
}
