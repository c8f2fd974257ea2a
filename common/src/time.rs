use chrono::{DateTime, Datelike, Timelike, Utc};

use crate::{Error, Result};

/// Calendar components of one event timestamp, shared by both pipelines so
/// the week/weekday conventions cannot drift between them.
///
/// `week` is the ISO-8601 week number; `weekday` counts from Monday = 0.
/// `year` is the calendar year, which near year boundaries can differ from
/// the ISO week-year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarParts {
    pub hour: u32,
    pub day: u32,
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: u32,
}

impl CalendarParts {
    pub fn from_epoch_ms(ts: i64) -> Result<Self> {
        let dt: DateTime<Utc> =
            DateTime::from_timestamp_millis(ts).ok_or(Error::InvalidTimestamp(ts))?;

        Ok(Self {
            hour: dt.hour(),
            day: dt.day(),
            week: dt.iso_week().week(),
            month: dt.month(),
            year: dt.year(),
            weekday: dt.weekday().num_days_from_monday(),
        })
    }
}
