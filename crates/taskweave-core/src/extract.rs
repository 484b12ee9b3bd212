//! Deadline phrase extraction from free-form task text.
//!
//! The scheduler consumes the result as an opaque optional timestamp; the
//! parser behind [`DeadlineParser`] is pluggable. The default implementation
//! scans ordered regex patterns for date phrases ("by March 15th",
//! "03/15/2024", "tomorrow", "next friday") and time phrases ("at 2:30 PM"),
//! assumes the current year when none is given, and rolls past dates
//! forward a year.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use regex::Regex;

/// Pulls an optional deadline out of task text.
pub trait DeadlineParser: Send + Sync {
    /// Returns the deadline (if any) and the text with the date and time
    /// phrases removed.
    fn extract(&self, text: &str, now: DateTime<Utc>) -> (Option<DateTime<Utc>>, String);
}

/// Regex-based deadline parser.
pub struct RegexDeadlineParser;

impl DeadlineParser for RegexDeadlineParser {
    fn extract(&self, text: &str, now: DateTime<Utc>) -> (Option<DateTime<Utc>>, String) {
        for pattern in date_patterns() {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };
            let Some(phrase) = caps.get(1) else {
                continue;
            };
            let Some(date) = parse_date_phrase(phrase.as_str(), now) else {
                // A pattern that matched but would not parse is skipped in
                // favor of the next, looser pattern.
                continue;
            };

            let time = time_patterns()
                .iter()
                .filter_map(|tp| tp.captures(text))
                .filter_map(|tc| tc.get(1).map(|m| m.as_str().to_string()))
                .find_map(|s| parse_time_phrase(&s))
                .unwrap_or(NaiveTime::MIN);

            let mut cleaned = pattern.replace_all(text, "").into_owned();
            for tp in time_patterns() {
                cleaned = tp.replace_all(&cleaned, "").into_owned();
            }

            let deadline = date.and_time(time).and_utc();
            return (Some(deadline), collapse_whitespace(&cleaned));
        }

        (None, text.to_string())
    }
}

/// Ordered from most to least specific; the first parseable match wins.
fn date_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)\b(?:by|due|before|on)\s+([a-z]+\s+\d{1,2}(?:st|nd|rd|th)?(?:,\s*\d{4})?)",
            r"\b(\d{1,2}/\d{1,2}/\d{4})\b",
            r"\b(\d{1,2}-\d{1,2}-\d{4})\b",
            r"(?i)\b(tomorrow|today)\b",
            r"(?i)\b((?:next|this)\s+[a-z]+)\b",
            r"(?i)\b([a-z]+\s+\d{1,2}(?:st|nd|rd|th)?(?:,\s*\d{4})?)\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("date pattern must compile"))
        .collect()
    })
}

fn time_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)\b(?:at|by)\s+(\d{1,2}:\d{2}\s*(?:am|pm)?)\b",
            r"(?i)\b(\d{1,2}:\d{2}\s*(?:am|pm))\b",
            r"(?i)\b(\d{1,2}\s*(?:am|pm))\b",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("time pattern must compile"))
        .collect()
    })
}

fn parse_date_phrase(phrase: &str, now: DateTime<Utc>) -> Option<NaiveDate> {
    let today = now.date_naive();
    let phrase = phrase.trim().to_lowercase();

    match phrase.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = phrase.strip_prefix("next ") {
        return parse_relative(rest, today, true);
    }
    if let Some(rest) = phrase.strip_prefix("this ") {
        return parse_relative(rest, today, false);
    }

    for format in ["%m/%d/%Y", "%m-%d-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&phrase, format) {
            return Some(roll_forward_if_past(date, today));
        }
    }

    parse_month_day(&phrase, today)
}

/// "next friday" / "this friday" / "next week". `strictly_ahead` makes the
/// same weekday mean a full week out rather than today.
fn parse_relative(rest: &str, today: NaiveDate, strictly_ahead: bool) -> Option<NaiveDate> {
    if rest == "week" {
        return Some(today + Duration::days(7));
    }
    let target = parse_weekday(rest)?;
    let mut ahead =
        (target.num_days_from_monday() as i64 - today.weekday().num_days_from_monday() as i64)
            .rem_euclid(7);
    if ahead == 0 && strictly_ahead {
        ahead = 7;
    }
    Some(today + Duration::days(ahead))
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    let day = match name.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

/// "march 15", "march 15th, 2024". A missing year defaults to the current
/// one; a resulting past date rolls forward to next year.
fn parse_month_day(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let mut tokens = phrase.split_whitespace();
    let month = parse_month(tokens.next()?)?;

    let day_token = tokens.next()?.trim_end_matches(',');
    let day: u32 = day_token
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .parse()
        .ok()?;

    let explicit_year: Option<i32> = tokens.next().and_then(|t| t.parse().ok());
    let year = explicit_year.unwrap_or_else(|| today.year());

    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(roll_forward_if_past(date, today))
}

fn parse_month(name: &str) -> Option<u32> {
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// A date that already passed is pushed to next year (a deadline in the
/// past is assumed to mean the upcoming occurrence).
fn roll_forward_if_past(date: NaiveDate, today: NaiveDate) -> NaiveDate {
    if date < today {
        date.with_year(today.year() + 1).unwrap_or(date)
    } else {
        date
    }
}

fn parse_time_phrase(phrase: &str) -> Option<NaiveTime> {
    let phrase = phrase.trim().to_lowercase();
    let (body, meridiem) = if let Some(b) = phrase.strip_suffix("pm") {
        (b.trim(), Some("pm"))
    } else if let Some(b) = phrase.strip_suffix("am") {
        (b.trim(), Some("am"))
    } else {
        (phrase.as_str(), None)
    };

    let (hour_str, minute_str) = match body.split_once(':') {
        Some((h, m)) => (h, m),
        None => (body, "0"),
    };
    let mut hour: u32 = hour_str.trim().parse().ok()?;
    let minute: u32 = minute_str.trim().parse().ok()?;

    match meridiem {
        Some("pm") if hour < 12 => hour += 12,
        Some("am") if hour == 12 => hour = 0,
        _ => {}
    }

    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
