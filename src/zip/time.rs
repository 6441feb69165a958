//! MS-DOS timestamp encoding.
//!
//! ZIP stores modification times as two packed 16-bit fields:
//!
//! - date: `year - 1980` (7 bits) | month (4 bits) | day of month (5 bits)
//! - time: hour (5 bits) | minute (6 bits) | second / 2 (5 bits)
//!
//! No timezone conversion is done; the calendar fields are taken as given.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use log::warn;

const MIN_YEAR: i32 = 1980;
const MAX_YEAR: i32 = 2107;

/// A timestamp in packed DOS format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDateTime {
    date: u16,
    time: u16,
}

impl DosDateTime {
    /// 1980-01-01 00:00:00, the earliest representable value.
    pub const MIN: DosDateTime = DosDateTime {
        date: (1 << 5) | 1,
        time: 0,
    };

    /// 2107-12-31 23:59:58, the latest representable value.
    pub const MAX: DosDateTime = DosDateTime {
        date: (127 << 9) | (12 << 5) | 31,
        time: (23 << 11) | (59 << 5) | 29,
    };

    /// Encode a calendar date/time, clamping into the DOS range.
    ///
    /// Odd seconds are truncated to the 2-second granularity of the format.
    pub fn from_naive(dt: &NaiveDateTime) -> Self {
        if dt.year() < MIN_YEAR {
            warn!("timestamp {dt} predates 1980, clamping");
            return Self::MIN;
        }
        if dt.year() > MAX_YEAR {
            warn!("timestamp {dt} is past 2107, clamping");
            return Self::MAX;
        }

        let date = (((dt.year() - MIN_YEAR) as u16) << 9)
            | ((dt.month() as u16) << 5)
            | dt.day() as u16;
        let time = ((dt.hour() as u16) << 11)
            | ((dt.minute() as u16) << 5)
            | (dt.second() as u16 / 2);

        Self { date, time }
    }

    /// Build from already packed fields.
    pub fn from_parts(date: u16, time: u16) -> Self {
        Self { date, time }
    }

    /// Packed date field
    pub fn date(&self) -> u16 {
        self.date
    }

    /// Packed time field
    pub fn time(&self) -> u16 {
        self.time
    }

    /// Decode to (year, month, day)
    pub fn ymd(&self) -> (u16, u8, u8) {
        let day = (self.date & 0x1F) as u8;
        let month = ((self.date >> 5) & 0x0F) as u8;
        let year = ((self.date >> 9) & 0x7F) + 1980;
        (year, month, day)
    }

    /// Decode to (hour, minute, second)
    pub fn hms(&self) -> (u8, u8, u8) {
        let second = ((self.time & 0x1F) * 2) as u8;
        let minute = ((self.time >> 5) & 0x3F) as u8;
        let hour = ((self.time >> 11) & 0x1F) as u8;
        (hour, minute, second)
    }

    /// Decode back to a calendar value, if the packed fields form a valid date.
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        let (year, month, day) = self.ymd();
        let (hour, minute, second) = self.hms();
        NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)?.and_hms_opt(
            hour as u32,
            minute as u32,
            second as u32,
        )
    }
}

impl From<NaiveDateTime> for DosDateTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self::from_naive(&dt)
    }
}
