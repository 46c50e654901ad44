// src/utils/clock.rs

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Utc};

/// Source of "now" and of calendar days for every engine that buckets by day.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// Calendar day of a stored timestamp in this clock's zone.
    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(self.now().offset()).date_naive()
    }
}

/// Wall clock in the server's local zone.
///
/// Past timestamps are converted with the offset in force at that instant,
/// so daylight-saving changes do not shift older attempts onto another day.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }

    fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&Local).date_naive()
    }
}

/// Pins both the instant and the zone.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
