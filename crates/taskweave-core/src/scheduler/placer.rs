//! Sequential back-to-back placement of work items.
//!
//! A single-pass greedy walk: each item is placed at the cursor, then the
//! cursor advances by the item's duration plus a fixed buffer, rolling over
//! to the next working day when it lands outside working hours and skipping
//! weekends. Placement is strictly input-order and deterministic; earlier
//! placements are never revisited.

use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Warning;
use crate::scheduler::slots::{at_hour, is_weekend};
use crate::task::{WorkItem, MIN_ITEM_MINUTES};

/// Placement parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlacerConfig {
    /// Idle minutes inserted between consecutive placements.
    pub buffer_minutes: i64,
    /// First working hour of the day (inclusive).
    pub work_start_hour: u32,
    /// Last working hour of the day (exclusive).
    pub work_end_hour: u32,
}

impl Default for PlacerConfig {
    fn default() -> Self {
        Self {
            buffer_minutes: 30,
            work_start_hour: 9,
            work_end_hour: 18,
        }
    }
}

/// One work item pinned to a concrete time range. Terminal: never
/// rescheduled within the same run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub item: WorkItem,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Placement {
    fn new(item: WorkItem, start: DateTime<Utc>) -> Self {
        let end = start + Duration::minutes(item.duration_minutes);
        Self {
            id: Uuid::new_v4().to_string(),
            item,
            start,
            end,
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// Places an ordered item list starting from a chosen time.
pub struct SequentialPlacer {
    config: PlacerConfig,
}

impl SequentialPlacer {
    pub fn new() -> Self {
        Self {
            config: PlacerConfig::default(),
        }
    }

    pub fn with_config(config: PlacerConfig) -> Self {
        Self { config }
    }

    /// Place every item back-to-back from `start_time`.
    ///
    /// Items under the minimum duration should have been filtered upstream;
    /// one slipping through is a logic error and is skipped with a
    /// diagnostic rather than silently placed. The placer does not consult
    /// the busy calendar: the window from `start_time` on is assumed free
    /// apart from this run's own placements.
    pub fn place(
        &self,
        items: &[WorkItem],
        start_time: DateTime<Utc>,
    ) -> (Vec<Placement>, Vec<Warning>) {
        let mut placements = Vec::with_capacity(items.len());
        let mut warnings = Vec::new();
        let mut cursor = start_time;

        for item in items {
            if item.duration_minutes < MIN_ITEM_MINUTES {
                warnings.push(Warning::SkippedShortItem {
                    title: item.title.clone(),
                    minutes: item.duration_minutes,
                });
                continue;
            }

            let placement = Placement::new(item.clone(), cursor);
            cursor = placement.end + Duration::minutes(self.config.buffer_minutes);
            cursor = self.normalize_cursor(cursor);
            placements.push(placement);
        }

        (placements, warnings)
    }

    /// Pull a cursor that drifted outside working hours back to the first
    /// working hour: same day when it landed before `work_start_hour`, the
    /// next day when it overflowed past `work_end_hour`; weekends are
    /// skipped either way.
    fn normalize_cursor(&self, cursor: DateTime<Utc>) -> DateTime<Utc> {
        let hour = cursor.hour();
        let overflowed = hour >= self.config.work_end_hour;
        if !overflowed && hour >= self.config.work_start_hour {
            return cursor;
        }

        let mut day = cursor.date_naive();
        if overflowed {
            day += Duration::days(1);
        }
        while is_weekend(day) {
            day += Duration::days(1);
        }
        at_hour(day, self.config.work_start_hour)
    }
}

impl Default for SequentialPlacer {
    fn default() -> Self {
        Self::new()
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
            description: String::new(),
            duration_minutes: minutes,
            priority: Priority::Medium,
            dependencies: Vec::new(),
        }
    }

    // Monday.
    fn mar11(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, h, m, 0).unwrap()
    }

    fn mar12(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 12, h, m, 0).unwrap()
    }

    #[test]
    fn end_of_day_overflow_rolls_to_next_morning() {
        let placer = SequentialPlacer::new();
        let items = vec![item("a", 60), item("b", 90), item("c", 45)];

        let (placements, warnings) = placer.place(&items, mar11(17, 0));

        assert!(warnings.is_empty());
        assert_eq!(placements.len(), 3);
        // Item 1 fills 17:00-18:00; the advanced cursor 18:30 overflows and
        // rolls to Tuesday 09:00.
        assert_eq!(placements[0].start, mar11(17, 0));
        assert_eq!(placements[0].end, mar11(18, 0));
        assert_eq!(placements[1].start, mar12(9, 0));
        assert_eq!(placements[1].end, mar12(10, 30));
        assert_eq!(placements[2].start, mar12(11, 0));
        assert_eq!(placements[2].end, mar12(11, 45));
    }

    #[test]
    fn friday_overflow_skips_the_weekend() {
        let placer = SequentialPlacer::new();
        let friday = Utc.with_ymd_and_hms(2024, 3, 8, 17, 0, 0).unwrap();
        let items = vec![item("a", 60), item("b", 30)];

        let (placements, _) = placer.place(&items, friday);

        assert_eq!(placements[1].start, mar11(9, 0));
    }

    #[test]
    fn placements_are_disjoint_and_input_ordered() {
        let placer = SequentialPlacer::new();
        let items = vec![
            item("first", 90),
            item("second", 240),
            item("third", 60),
            item("fourth", 480),
            item("fifth", 30),
        ];

        let (placements, _) = placer.place(&items, mar11(9, 0));

        assert_eq!(placements.len(), items.len());
        for (placement, item) in placements.iter().zip(&items) {
            assert_eq!(placement.item.title, item.title);
            assert_eq!(placement.duration_minutes(), item.duration_minutes);
        }
        for pair in placements.windows(2) {
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn short_item_is_skipped_with_diagnostic() {
        let placer = SequentialPlacer::new();
        let items = vec![item("a", 60), item("quick call", 15), item("b", 60)];

        let (placements, warnings) = placer.place(&items, mar11(9, 0));

        assert_eq!(placements.len(), 2);
        assert_eq!(
            warnings,
            vec![Warning::SkippedShortItem {
                title: "quick call".to_string(),
                minutes: 15,
            }]
        );
        // The skipped item consumes no time.
        assert_eq!(placements[1].start, mar11(10, 30));
    }

    #[test]
    fn pre_work_cursor_resets_to_same_day_morning() {
        let placer = SequentialPlacer::new();
        // A long item running past midnight leaves the cursor before
        // work_start_hour on the next day; it resets to that day's 09:00.
        let items = vec![item("overnight push", 480), item("followup", 60)];

        let (placements, _) = placer.place(&items, mar11(17, 0));

        assert_eq!(placements[0].end, mar12(1, 0));
        assert_eq!(placements[1].start, mar12(9, 0));
    }

    #[test]
    fn empty_input_places_nothing() {
        let placer = SequentialPlacer::new();
        let (placements, warnings) = placer.place(&[], mar11(9, 0));
        assert!(placements.is_empty());
        assert!(warnings.is_empty());
    }
}
