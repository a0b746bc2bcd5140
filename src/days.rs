//! Calendar-day bucketing in the app's fixed timezone (Asia/Kolkata).

use std::fmt;

use serde::{Serialize, Serializer};
use time::{
    format_description::FormatItem,
    macros::{format_description, offset},
    Date, OffsetDateTime, UtcOffset,
};

/// Asia/Kolkata has no daylight saving, so a fixed offset is exact.
pub const KOLKATA: UtcOffset = offset!(+5:30);

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Local calendar date of a timestamp, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayKey(Date);

impl DayKey {
    pub fn date(self) -> Date {
        self.0
    }
}

/// Day key of `ts` in Asia/Kolkata.
pub fn day_key(ts: OffsetDateTime) -> DayKey {
    day_key_in(ts, KOLKATA)
}

pub fn day_key_in(ts: OffsetDateTime, offset: UtcOffset) -> DayKey {
    DayKey(ts.to_offset(offset).date())
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = self.0.format(ISO_DATE).map_err(|_| fmt::Error)?;
        f.write_str(&formatted)
    }
}

impl Serialize for DayKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
