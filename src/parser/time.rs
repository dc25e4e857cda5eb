//! Time expression and day-label parsing helpers

use chrono::{NaiveDate, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ParseError;

lazy_static! {
    static ref TIME_RANGE: Regex = Regex::new(
        r"(?i)(\d{1,2}:\d{2}\s?(?:AM|PM))\s*[-\u{2013}\u{2014}]\s*(\d{1,2}:\d{2}\s?(?:AM|PM))"
    )
    .expect("Invalid time range pattern");
    static ref TIME_SINGLE: Regex =
        Regex::new(r"(?i)\d{1,2}:\d{2}\s?(?:AM|PM)").expect("Invalid time pattern");
}

/// Extract start and end times from a time cell.
///
/// Tries a full "H:MM AM/PM - H:MM AM/PM" range first (hyphen, en dash or
/// em dash), then falls back to a single "H:MM AM/PM" with no end time.
/// Returns `(None, None)` when neither pattern matches.
pub fn extract_time(text: &str) -> (Option<String>, Option<String>) {
    if let Some(caps) = TIME_RANGE.captures(text) {
        return (Some(caps[1].to_string()), Some(caps[2].to_string()));
    }
    if let Some(m) = TIME_SINGLE.find(text) {
        return (Some(m.as_str().to_string()), None);
    }
    (None, None)
}

/// Parse a clock string like "9:00 AM" into a time of day
pub fn parse_clock(text: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(text.trim(), "%I:%M %p")
        .map_err(|_| ParseError::InvalidTime(text.to_string()))
}

/// Format a time of day as "H:MM AM/PM" without a leading zero hour
pub fn format_clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Parse the calendar date embedded in a day label like "Monday, January 20".
///
/// The second comma-separated token must be a "Month Day" expression.
/// Month/day tokens need a year to become a date; an anchor leap year keeps
/// "February 29" parseable. Ordering is unaffected within one conference.
pub fn parse_day_date(label: &str) -> Result<NaiveDate, ParseError> {
    let token = label
        .split(", ")
        .nth(1)
        .ok_or_else(|| ParseError::InvalidDate(label.to_string()))?;
    NaiveDate::parse_from_str(&format!("{} 2000", token.trim()), "%B %d %Y")
        .map_err(|_| ParseError::InvalidDate(label.to_string()))
}
