use chrono::{NaiveDateTime, TimeDelta};

/// One decision tick: its index and wall-clock timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub index: usize,
    pub time: NaiveDateTime,
}

/// A run clock that yields evenly spaced ticks from a start timestamp.
///
/// # Examples
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use smart_energy::sim::clock::Clock;
///
/// let start = NaiveDate::from_ymd_opt(2024, 10, 1)
///     .and_then(|d| d.and_hms_opt(0, 0, 0))
///     .unwrap();
/// let mut clock = Clock::new(start, TimeDelta::hours(1), 3);
/// let mut hours = Vec::new();
///
/// clock.run(|tick| hours.push(tick.index));
/// assert_eq!(hours, vec![0, 1, 2]);
/// ```
pub struct Clock {
    start: NaiveDateTime,
    step: TimeDelta,
    /// Index of the next tick
    current: usize,
    /// Total ticks to yield
    total: usize,
}

impl Clock {
    pub fn new(start: NaiveDateTime, step: TimeDelta, total: usize) -> Self {
        Self {
            start,
            step,
            current: 0,
            total,
        }
    }

    /// Advances the clock by one tick.
    ///
    /// Returns `None` once all ticks have been yielded.
    pub fn tick(&mut self) -> Option<Tick> {
        if self.current >= self.total {
            return None;
        }
        let index = self.current;
        self.current += 1;
        let offset = self.step * i32::try_from(index).ok()?;
        Some(Tick {
            index,
            time: self.start + offset,
        })
    }

    /// Runs a function for each remaining tick.
    pub fn run(&mut self, mut f: impl FnMut(Tick)) {
        while let Some(tick) = self.tick() {
            f(tick);
        }
    }
}

impl Iterator for Clock {
    type Item = Tick;

    fn next(&mut self) -> Option<Tick> {
        self.tick()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 10, 1)
            .and_then(|d| d.and_hms_opt(22, 0, 0))
            .unwrap()
    }

    #[test]
    fn tick_timestamps_advance_by_step() {
        let mut clock = Clock::new(start(), TimeDelta::minutes(30), 2);
        assert_eq!(clock.tick().map(|t| t.time), Some(start()));
        assert_eq!(
            clock.tick().map(|t| t.time),
            Some(start() + TimeDelta::minutes(30))
        );
        assert_eq!(clock.tick(), None);
    }

    #[test]
    fn ticks_cross_midnight() {
        let clock = Clock::new(start(), TimeDelta::hours(1), 4);
        let last = clock.last().map(|t| t.time);
        let expected = NaiveDate::from_ymd_opt(2024, 10, 2).and_then(|d| d.and_hms_opt(1, 0, 0));
        assert_eq!(last, expected);
    }

    #[test]
    fn empty_clock() {
        let mut clock = Clock::new(start(), TimeDelta::hours(1), 0);
        assert_eq!(clock.tick(), None);

        let mut was_called = false;
        clock.run(|_| was_called = true);
        assert!(!was_called);
    }
}
