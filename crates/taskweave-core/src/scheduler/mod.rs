//! Scheduling pipeline: busy snapshot, slot discovery, start selection,
//! sequential placement, optional event creation.
//!
//! One [`TaskScheduler::schedule`] call is a single-threaded, request-scoped
//! run over its own snapshot of busy intervals. There is no fatal error path
//! inside the run; every degraded situation surfaces as a [`Warning`] next
//! to a best-effort schedule.

pub mod deadline;
pub mod placer;
pub mod slots;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::BusyCalendar;
use crate::error::Warning;
use crate::integrations::traits::{CalendarWriter, EventDraft};
use crate::task::WorkItem;

pub use deadline::{DeadlineScheduler, DEFAULT_SEARCH_DAYS};
pub use placer::{Placement, PlacerConfig, SequentialPlacer};
pub use slots::{FreeSlot, SlotFinder, SlotFinderConfig};

/// One scheduling request: an ordered item list, an optional deadline, and
/// the moment the search starts from (normally "now").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub items: Vec<WorkItem>,
    pub deadline: Option<DateTime<Utc>>,
    pub search_start: DateTime<Utc>,
}

/// A placement paired with its external calendar confirmation, when the
/// insert succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub placement: Placement,
    pub event_id: Option<String>,
    pub html_link: Option<String>,
}

/// Result of one scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// The chosen start time for the first item.
    pub start_time: DateTime<Utc>,
    pub events: Vec<ScheduledEvent>,
    pub warnings: Vec<Warning>,
}

/// Scheduler tuning knobs, aggregated from config.
#[derive(Debug, Clone)]
pub struct SchedulerParams {
    pub slots: SlotFinderConfig,
    pub placer: PlacerConfig,
    pub search_days: i64,
    /// IANA timezone name stamped on created events.
    pub time_zone: String,
}

impl Default for SchedulerParams {
    fn default() -> Self {
        Self {
            slots: SlotFinderConfig::default(),
            placer: PlacerConfig::default(),
            search_days: DEFAULT_SEARCH_DAYS,
            time_zone: "America/Los_Angeles".to_string(),
        }
    }
}

/// End-to-end scheduler over a busy calendar and an optional event writer.
pub struct TaskScheduler {
    params: SchedulerParams,
    /// `None` means no calendar collaborator is configured; the search
    /// range is treated as fully free.
    calendar: Option<BusyCalendar>,
    writer: Option<Box<dyn CalendarWriter>>,
    writer_calendar_id: String,
}

impl TaskScheduler {
    pub fn new(params: SchedulerParams) -> Self {
        Self {
            params,
            calendar: None,
            writer: None,
            writer_calendar_id: "primary".to_string(),
        }
    }

    /// Attach a busy-period source.
    pub fn with_calendar(mut self, calendar: BusyCalendar) -> Self {
        self.calendar = Some(calendar);
        self
    }

    /// Attach an event writer; created events go to `calendar_id`.
    pub fn with_writer(mut self, writer: Box<dyn CalendarWriter>, calendar_id: impl Into<String>) -> Self {
        self.writer = Some(writer);
        self.writer_calendar_id = calendar_id.into();
        self
    }

    /// Run the full pipeline for one request.
    ///
    /// The busy snapshot is read once, before the start time is chosen; the
    /// placer does not re-check it while walking forward. A long item
    /// sequence can therefore overlap busy periods later in the window --
    /// an accepted simplification shared with the deadline feasibility
    /// check.
    pub fn schedule(&self, request: &ScheduleRequest) -> ScheduleOutcome {
        let mut warnings = Vec::new();

        let finder = SlotFinder::with_config(self.params.slots);
        let chooser =
            DeadlineScheduler::new(finder).with_search_days(self.params.search_days);

        let anchor = chooser.anchor(request.search_start, request.deadline);
        let busy = match &self.calendar {
            Some(calendar) => {
                let (busy, calendar_warnings) =
                    calendar.busy_periods(anchor, chooser.search_end(anchor));
                warnings.extend(calendar_warnings);
                busy
            }
            None => Vec::new(),
        };

        let total_minutes: i64 = request.items.iter().map(|i| i.duration_minutes).sum();
        let (start_time, choose_warnings) = chooser.choose_start(
            request.search_start,
            request.deadline,
            total_minutes,
            &busy,
        );
        warnings.extend(choose_warnings);

        let placer = SequentialPlacer::with_config(self.params.placer);
        let (placements, place_warnings) = placer.place(&request.items, start_time);
        warnings.extend(place_warnings);

        let mut events = Vec::with_capacity(placements.len());
        for placement in placements {
            let mut event = ScheduledEvent {
                placement,
                event_id: None,
                html_link: None,
            };
            if let Some(writer) = &self.writer {
                let draft = self.event_draft(&event.placement, request.deadline);
                // An insert failure keeps the placement; later items are
                // not re-flowed into its slot.
                match writer.insert_event(&self.writer_calendar_id, &draft) {
                    Ok(created) => {
                        event.event_id = Some(created.id);
                        event.html_link = created.html_link;
                    }
                    Err(e) => warnings.push(Warning::InsertFailed {
                        title: event.placement.item.title.clone(),
                        detail: e.to_string(),
                    }),
                }
            }
            events.push(event);
        }

        ScheduleOutcome {
            start_time,
            events,
            warnings,
        }
    }

    fn event_draft(&self, placement: &Placement, deadline: Option<DateTime<Utc>>) -> EventDraft {
        let item = &placement.item;
        let mut description = format!(
            "{}\n\nPriority: {}\nEstimated Duration: {} minutes",
            item.description,
            item.priority.as_str(),
            item.duration_minutes,
        );
        if let Some(deadline) = deadline {
            description.push_str(&format!(
                "\nProject Deadline: {}",
                deadline.format("%Y-%m-%d %H:%M")
            ));
        }

        EventDraft {
            summary: item.title.clone(),
            description,
            start: placement.start,
            end: placement.end,
            time_zone: self.params.time_zone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::TimeZone;

    fn item(title: &str, minutes: i64) -> WorkItem {
        WorkItem {
            title: title.to_string(),
            description: "desc".to_string(),
            duration_minutes: minutes,
            priority: Priority::High,
            dependencies: Vec::new(),
        }
    }

    #[test]
    fn schedule_without_calendar_treats_window_as_free() {
        let scheduler = TaskScheduler::new(SchedulerParams::default());
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();
        let request = ScheduleRequest {
            items: vec![item("a", 60), item("b", 60)],
            deadline: Some(Utc.with_ymd_and_hms(2024, 3, 11, 17, 0, 0).unwrap()),
            search_start: now,
        };

        let outcome = scheduler.schedule(&request);

        assert_eq!(
            outcome.start_time,
            Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap()
        );
        assert_eq!(outcome.events.len(), 2);
        assert!(outcome.warnings.is_empty());
        assert!(outcome.events.iter().all(|e| e.event_id.is_none()));
    }

    #[test]
    fn outcome_round_trips_through_json() {
        let scheduler = TaskScheduler::new(SchedulerParams::default());
        let now = Utc.with_ymd_and_hms(2024, 3, 11, 8, 0, 0).unwrap();
        let request = ScheduleRequest {
            items: vec![item("a", 120), item("b", 90)],
            // Unreachable, so the outcome carries a warning to round-trip.
            deadline: Some(Utc.with_ymd_and_hms(2024, 3, 11, 10, 0, 0).unwrap()),
            search_start: now,
        };
        let outcome = scheduler.schedule(&request);
        assert!(!outcome.warnings.is_empty());

        let json = serde_json::to_string(&outcome).unwrap();
        let decoded: ScheduleOutcome = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.start_time, outcome.start_time);
        assert_eq!(decoded.events.len(), outcome.events.len());
        assert_eq!(decoded.warnings, outcome.warnings);
    }

    #[test]
    fn event_draft_carries_priority_and_deadline() {
        let scheduler = TaskScheduler::new(SchedulerParams::default());
        let start = Utc.with_ymd_and_hms(2024, 3, 11, 9, 0, 0).unwrap();
        let (placements, _) = SequentialPlacer::new().place(&[item("Draft", 60)], start);
        let deadline = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

        let draft = scheduler.event_draft(&placements[0], Some(deadline));

        assert_eq!(draft.summary, "Draft");
        assert!(draft.description.contains("Priority: high"));
        assert!(draft.description.contains("Estimated Duration: 60 minutes"));
        assert!(draft.description.contains("Project Deadline: 2024-03-15 12:00"));
        assert_eq!(draft.time_zone, "America/Los_Angeles");
    }
}
