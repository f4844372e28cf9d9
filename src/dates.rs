use chrono::{NaiveDate, NaiveDateTime};

use crate::error::{AnalyticsError, Result};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parse a calendar date using the first matching format.
pub fn parse_date(raw: &str, formats: &[&str]) -> Result<NaiveDate> {
    let value = raw.trim();

    for format in formats {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Ok(date);
        }
    }

    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(datetime.date());
        }
    }

    Err(AnalyticsError::InvalidDate(raw.to_string()))
}

/// Whole days from `target` up to `reference`. Negative when `target` is later.
pub fn days_between(reference: NaiveDate, target: Option<&str>, formats: &[&str]) -> Result<i64> {
    let raw = target.ok_or_else(|| AnalyticsError::InvalidDate(String::new()))?;
    let date = parse_date(raw, formats)?;
    Ok((reference - date).num_days())
}
