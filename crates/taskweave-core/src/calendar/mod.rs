//! Busy-period view of the external calendar.
//!
//! [`BusyCalendar`] wraps a [`CalendarSource`] and normalizes its raw event
//! records into [`BusyInterval`]s. Malformed records are skipped with a
//! recorded diagnostic; a completely unavailable collaborator degrades to an
//! empty busy list, which downstream components read as a fully free
//! calendar.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Warning;
use crate::integrations::traits::CalendarSource;

/// A time range already occupied on the external calendar.
///
/// Immutable once read; `start < end` always holds. Overlapping or adjacent
/// intervals are kept as-is, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    /// Returns `None` unless `start < end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        if start < end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Half-open interval intersection test.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// A raw event record as returned by the calendar collaborator, before
/// normalization. Values are either RFC 3339 date-times or bare
/// `YYYY-MM-DD` dates (all-day events).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Normalized busy-period view over a [`CalendarSource`].
pub struct BusyCalendar {
    source: Box<dyn CalendarSource>,
    calendar_id: String,
}

impl BusyCalendar {
    pub fn new(source: Box<dyn CalendarSource>, calendar_id: impl Into<String>) -> Self {
        Self {
            source,
            calendar_id: calendar_id.into(),
        }
    }

    /// List busy intervals intersecting `[range_start, range_end)`.
    ///
    /// Partially overlapping intervals are included unclipped. Requires
    /// `range_start < range_end`; an inverted range yields an empty list.
    pub fn busy_periods(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
    ) -> (Vec<BusyInterval>, Vec<Warning>) {
        if range_start >= range_end {
            return (Vec::new(), Vec::new());
        }

        let events = match self.source.list_events(&self.calendar_id, range_start, range_end) {
            Ok(events) => events,
            Err(e) => {
                return (
                    Vec::new(),
                    vec![Warning::CalendarUnavailable {
                        detail: e.to_string(),
                    }],
                );
            }
        };

        let mut busy = Vec::new();
        let mut warnings = Vec::new();
        for event in &events {
            match normalize_event(event) {
                Some(interval) if interval.overlaps(range_start, range_end) => {
                    busy.push(interval);
                }
                Some(_) => {} // outside the requested range
                None => warnings.push(Warning::SkippedEvent {
                    detail: format!("{event:?}"),
                }),
            }
        }

        (busy, warnings)
    }
}

/// Turn one raw record into a busy interval, or `None` if it cannot be
/// normalized. Date-only values become all-day boundaries at midnight (the
/// collaborator's all-day end date is already exclusive).
fn normalize_event(event: &RawEvent) -> Option<BusyInterval> {
    let start = parse_event_time(event.start.as_deref()?)?;
    let end = parse_event_time(event.end.as_deref()?)?;
    // A date-only event with equal start and end still spans that day.
    let end = if end <= start && event.end.as_deref().map(is_date_only) == Some(true) {
        start + Duration::days(1)
    } else {
        end
    };
    BusyInterval::new(start, end)
}

fn is_date_only(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

fn parse_event_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}
