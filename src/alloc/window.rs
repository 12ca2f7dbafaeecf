use chrono::{NaiveTime, Timelike};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Daily time-of-day window `[start, end)` with minute resolution.
///
/// Windows whose start is after their end wrap past midnight. A window
/// with `start == end` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Start minute of day (inclusive).
    start_min: u32,
    /// End minute of day (exclusive).
    end_min: u32,
}

impl TimeWindow {
    /// Only essential devices run inside this window.
    pub const NIGHT: Self = Self::from_minutes(23 * 60, 6 * 60);

    /// Creates a window from minutes since midnight.
    ///
    /// # Panics
    ///
    /// Panics if either bound is not below 1440.
    pub const fn from_minutes(start_min: u32, end_min: u32) -> Self {
        assert!(start_min < MINUTES_PER_DAY);
        assert!(end_min < MINUTES_PER_DAY);
        Self { start_min, end_min }
    }

    pub fn from_times(start: NaiveTime, end: NaiveTime) -> Self {
        Self::from_minutes(minute_of_day(start), minute_of_day(end))
    }

    /// Returns `true` when `time` falls inside the window.
    pub fn contains(&self, time: NaiveTime) -> bool {
        let m = minute_of_day(time);
        if self.start_min <= self.end_min {
            m >= self.start_min && m < self.end_min
        } else {
            m >= self.start_min || m < self.end_min
        }
    }
}

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}
