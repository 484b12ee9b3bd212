//! Deadline-aware start-time selection.
//!
//! Given the free slots in a bounded search window, picks the start time
//! that lets the total estimated work finish on or before the deadline, or
//! the earliest slot overall when there is no deadline or it cannot be met.
//! Never fails: an empty window falls back to the next business day.

use chrono::{DateTime, Duration, Utc};

use crate::calendar::BusyInterval;
use crate::error::Warning;
use crate::scheduler::slots::{at_hour, is_weekend, truncate_to_hour, SlotFinder};

/// Days covered by the candidate-slot search window.
pub const DEFAULT_SEARCH_DAYS: i64 = 14;

/// Chooses a schedule start time from calendar availability.
pub struct DeadlineScheduler {
    finder: SlotFinder,
    search_days: i64,
}

impl DeadlineScheduler {
    pub fn new(finder: SlotFinder) -> Self {
        Self {
            finder,
            search_days: DEFAULT_SEARCH_DAYS,
        }
    }

    pub fn with_search_days(mut self, days: i64) -> Self {
        self.search_days = days;
        self
    }

    /// Where the candidate search begins.
    ///
    /// Without a deadline there is no urgency, so the search starts at the
    /// next business day's first working hour. With a deadline it starts as
    /// soon as possible: one hour from now, truncated to the hour so the
    /// anchor lands on the slot grid.
    pub fn anchor(&self, now: DateTime<Utc>, deadline: Option<DateTime<Utc>>) -> DateTime<Utc> {
        match deadline {
            None => self.next_business_day(now),
            Some(_) => truncate_to_hour(now + Duration::hours(1)),
        }
    }

    /// End of the candidate search window.
    pub fn search_end(&self, anchor: DateTime<Utc>) -> DateTime<Utc> {
        anchor + Duration::days(self.search_days)
    }

    /// Select the start time for `total_minutes` of work.
    ///
    /// The deadline feasibility check uses the total duration against each
    /// candidate's start, not per-slot verification; it is a necessary but
    /// not sufficient heuristic.
    pub fn choose_start(
        &self,
        now: DateTime<Utc>,
        deadline: Option<DateTime<Utc>>,
        total_minutes: i64,
        busy: &[BusyInterval],
    ) -> (DateTime<Utc>, Vec<Warning>) {
        let anchor = self.anchor(now, deadline);
        let candidates = self
            .finder
            .find_slots(anchor, self.search_end(anchor), busy);

        if candidates.is_empty() {
            // Terminal fallback; this branch never fails.
            return (self.next_business_day(now), vec![Warning::NoSlotsInWindow]);
        }

        let mut warnings = Vec::new();
        if let Some(deadline) = deadline {
            let feasible = candidates
                .iter()
                .find(|slot| slot.start + Duration::minutes(total_minutes) <= deadline);
            if let Some(slot) = feasible {
                return (slot.start, warnings);
            }
            warnings.push(Warning::DeadlineUnreachable { deadline });
        }

        (candidates[0].start, warnings)
    }

    /// Next calendar day at the first working hour, rolled forward over
    /// weekends.
    fn next_business_day(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let mut day = now.date_naive() + Duration::days(1);
        while is_weekend(day) {
            day += Duration::days(1);
        }
        at_hour(day, self.finder.config().work_start_hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn scheduler() -> DeadlineScheduler {
        DeadlineScheduler::new(SlotFinder::new())
    }

    // Monday.
    fn mar11(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, h, m, 0).unwrap()
    }

    #[test]
    fn no_deadline_anchors_at_next_business_day() {
        let s = scheduler();
        // Friday afternoon rolls over the weekend to Monday 09:00.
        let friday = Utc.with_ymd_and_hms(2024, 3, 8, 15, 30, 0).unwrap();
        assert_eq!(s.anchor(friday, None), mar11(9, 0));
    }

    #[test]
    fn deadline_anchors_one_hour_out_on_the_hour() {
        let s = scheduler();
        let now = mar11(9, 40);
        assert_eq!(s.anchor(now, Some(mar11(17, 0))), mar11(10, 0));
    }

    #[test]
    fn reachable_deadline_picks_earliest_qualifying_slot() {
        let s = scheduler();
        let now = mar11(8, 0);
        let deadline = mar11(14, 0);
        // 09:00-11:00 busy, so the first candidate is 11:00; 180 minutes
        // from 11:00 lands exactly on the deadline.
        let busy = vec![BusyInterval::new(mar11(9, 0), mar11(11, 0)).unwrap()];

        let (start, warnings) = s.choose_start(now, Some(deadline), 180, &busy);
        assert_eq!(start, mar11(11, 0));
        assert!(warnings.is_empty());
    }

    #[test]
    fn unreachable_deadline_returns_earliest_slot_with_warning() {
        let s = scheduler();
        let now = mar11(8, 0);
        let deadline = mar11(12, 0);
        // With 09:00 busy the earliest candidate is 10:00, and 180 minutes
        // cannot finish by noon from 10:00 or any later slot.
        let busy = vec![BusyInterval::new(mar11(9, 0), mar11(10, 0)).unwrap()];

        let (start, warnings) = s.choose_start(now, Some(deadline), 180, &busy);
        assert_eq!(start, mar11(10, 0));
        assert_eq!(warnings, vec![Warning::DeadlineUnreachable { deadline }]);
    }

    #[test]
    fn fully_busy_window_falls_back_to_next_business_day() {
        let s = scheduler();
        let now = mar11(8, 0);
        let busy = vec![BusyInterval::new(
            mar11(0, 0),
            Utc.with_ymd_and_hms(2024, 3, 26, 0, 0, 0).unwrap(),
        )
        .unwrap()];

        let (start, warnings) = s.choose_start(now, Some(mar11(17, 0)), 60, &busy);
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 3, 12, 9, 0, 0).unwrap());
        assert_eq!(warnings, vec![Warning::NoSlotsInWindow]);
    }

    #[test]
    fn no_deadline_returns_earliest_slot() {
        let s = scheduler();
        let friday = Utc.with_ymd_and_hms(2024, 3, 8, 15, 30, 0).unwrap();
        let (start, warnings) = s.choose_start(friday, None, 120, &[]);
        assert_eq!(start, mar11(9, 0));
        assert!(warnings.is_empty());
    }
}
