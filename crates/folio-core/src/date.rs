//! Spreadsheet serial dates
//!
//! Dates are stored as a count of days since 1899-12-30. The format believes
//! 1900 was a leap year, so serials from 61 onward carry one extra day.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use lazy_regex::regex;

use crate::error::{Error, Result};
use crate::style::number_format::is_builtin_date_id;

const MS_PER_DAY: i64 = 86_400_000;

/// Serials beyond this are outside anything chrono can represent
const MAX_SERIAL: f64 = 2_958_466.0;

fn epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .unwrap_or_default()
        .and_time(chrono::NaiveTime::MIN)
}

/// Convert a calendar date to its serial day number
///
/// The time of day is dropped: the result is always a whole day count.
pub fn date_to_excel_number(date: NaiveDateTime) -> f64 {
    let millis = (date - epoch()).num_milliseconds();
    let mut days = millis.div_euclid(MS_PER_DAY);
    if days >= 61 {
        days += 1;
    }
    days as f64
}

/// Convert a serial day number back to a calendar date
///
/// Fractional serials keep their time of day to millisecond precision.
pub fn excel_number_to_date(serial: f64) -> Result<NaiveDateTime> {
    if !serial.is_finite() || serial.abs() > MAX_SERIAL {
        return Err(Error::InvalidDate(format!("serial {} out of range", serial)));
    }
    let adjusted = if serial >= 61.0 { serial - 1.0 } else { serial };
    let millis = (adjusted * MS_PER_DAY as f64).round() as i64;
    epoch()
        .checked_add_signed(Duration::milliseconds(millis))
        .ok_or_else(|| Error::InvalidDate(format!("serial {} out of range", serial)))
}

/// Whether a number format denotes a date or time
///
/// True for the built-in date ids, or when the format code (with bracketed
/// sections and quoted literals removed) contains a date/time token.
pub fn is_date_format(num_fmt_id: u32, format_code: Option<&str>) -> bool {
    if is_builtin_date_id(num_fmt_id) {
        return true;
    }
    let Some(code) = format_code else {
        return false;
    };
    let stripped = regex!(r#"\[[^\]]*\]|"[^"]*""#).replace_all(code, "");
    regex!(r"(?i)[ymd]|h:mm|mmm|am/pm").is_match(&stripped)
}
