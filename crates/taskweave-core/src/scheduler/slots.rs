//! Free-slot discovery over a busy-period calendar.
//!
//! Walks a date range day by day within working hours, Monday through
//! Friday, and emits fixed-length slots that do not intersect any busy
//! interval. Output is chronological, deterministic for an unchanged busy
//! snapshot, and capped at `max_slots` (truncation, not an error).

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::BusyInterval;

/// A fixed-length free time range within working hours on a weekday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Slot discovery parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SlotFinderConfig {
    /// First working hour of the day (inclusive).
    pub work_start_hour: u32,
    /// Last working hour of the day (exclusive).
    pub work_end_hour: u32,
    /// Slot length in minutes.
    pub slot_minutes: i64,
    /// Hard cap on the number of emitted slots.
    pub max_slots: usize,
}

impl Default for SlotFinderConfig {
    fn default() -> Self {
        Self {
            work_start_hour: 9,
            work_end_hour: 18,
            slot_minutes: 60,
            max_slots: 20,
        }
    }
}

/// Finds free slots between busy intervals.
pub struct SlotFinder {
    config: SlotFinderConfig,
}

impl SlotFinder {
    pub fn new() -> Self {
        Self {
            config: SlotFinderConfig::default(),
        }
    }

    pub fn with_config(config: SlotFinderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SlotFinderConfig {
        &self.config
    }

    /// Emit free slots over `[range_start, range_end)`, skipping weekends
    /// and any slot that overlaps a busy interval under the half-open
    /// intersection test.
    ///
    /// The slot grid is anchored at `work_start_hour` on every day; the
    /// range bounds only clip which grid slots are emitted, they never
    /// shift the grid.
    pub fn find_slots(
        &self,
        range_start: DateTime<Utc>,
        range_end: DateTime<Utc>,
        busy: &[BusyInterval],
    ) -> Vec<FreeSlot> {
        let mut slots = Vec::new();
        if self.config.slot_minutes <= 0 || self.config.max_slots == 0 {
            return slots;
        }

        let mut day = range_start.date_naive();
        let last_day = range_end.date_naive();

        'days: while day <= last_day {
            if is_weekend(day) {
                day += Duration::days(1);
                continue;
            }

            let work_start = at_hour(day, self.config.work_start_hour);
            let day_cap = at_hour(day, self.config.work_end_hour).min(range_end);

            let mut slot_start = work_start;
            loop {
                let slot_end = slot_start + Duration::minutes(self.config.slot_minutes);
                if slot_end > day_cap {
                    break;
                }
                if slot_start >= range_start {
                    let conflicts = busy.iter().any(|b| b.overlaps(slot_start, slot_end));
                    if !conflicts {
                        slots.push(FreeSlot {
                            start: slot_start,
                            end: slot_end,
                        });
                        if slots.len() >= self.config.max_slots {
                            break 'days;
                        }
                    }
                }
                slot_start = slot_end;
            }

            day += Duration::days(1);
        }

        slots
    }
}

impl Default for SlotFinder {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether the day falls on a weekend.
pub(crate) fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The given day at `hour:00:00` UTC. An out-of-range hour (validated away
/// at config load) degrades to midnight rather than panicking.
pub(crate) fn at_hour(day: NaiveDate, hour: u32) -> DateTime<Utc> {
    day.and_hms_opt(hour, 0, 0)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN))
        .and_utc()
}

/// Truncate to the top of the hour.
pub(crate) fn truncate_to_hour(dt: DateTime<Utc>) -> DateTime<Utc> {
    at_hour(dt.date_naive(), dt.hour())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn busy(start: DateTime<Utc>, end: DateTime<Utc>) -> BusyInterval {
        BusyInterval::new(start, end).unwrap()
    }

    // Monday.
    fn mar11(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 11, h, m, 0).unwrap()
    }

    #[test]
    fn busy_morning_leaves_later_slots() {
        let finder = SlotFinder::new();
        let slots = finder.find_slots(
            mar11(9, 0),
            mar11(12, 0),
            &[busy(mar11(9, 0), mar11(10, 0))],
        );

        // 09:00 conflicts; 10:00 and 11:00 remain inside the range.
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].start, mar11(10, 0));
        assert_eq!(slots[0].end, mar11(11, 0));
        assert_eq!(slots[1].start, mar11(11, 0));
        assert_eq!(slots[1].end, mar11(12, 0));
    }

    #[test]
    fn slots_before_range_start_are_clipped_on_the_grid() {
        let finder = SlotFinder::new();
        let slots = finder.find_slots(mar11(14, 0), mar11(18, 0), &[]);
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[0].start, mar11(14, 0));
    }

    #[test]
    fn weekends_are_skipped() {
        let finder = SlotFinder::new();
        // Friday 2024-03-15 through Monday 2024-03-18.
        let start = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 18, 18, 0, 0).unwrap();

        let slots = finder.find_slots(start, end, &[]);

        assert!(!slots.is_empty());
        for slot in &slots {
            let weekday = slot.start.weekday();
            assert!(weekday != Weekday::Sat && weekday != Weekday::Sun);
            assert!(slot.start.hour() >= 9 && slot.start.hour() < 18);
        }
        // 9 slots on Friday plus 9 on Monday; Saturday and Sunday contribute
        // nothing.
        assert_eq!(slots.len(), 18);
    }

    #[test]
    fn uneven_slot_length_never_spills_past_working_hours() {
        let config = SlotFinderConfig {
            slot_minutes: 50,
            ..SlotFinderConfig::default()
        };
        let finder = SlotFinder::with_config(config);
        let slots = finder.find_slots(mar11(9, 0), mar11(18, 0), &[]);

        // 540 working minutes fit ten 50-minute slots; the eleventh would
        // end at 18:10 and is not emitted.
        assert_eq!(slots.len(), 10);
        assert_eq!(slots[9].start, mar11(16, 30));
        assert_eq!(slots[9].end, mar11(17, 20));
        for slot in &slots {
            assert!(slot.end <= mar11(18, 0));
        }
    }

    #[test]
    fn max_slots_truncates() {
        let config = SlotFinderConfig {
            max_slots: 3,
            ..SlotFinderConfig::default()
        };
        let finder = SlotFinder::with_config(config);
        let slots = finder.find_slots(mar11(9, 0), mar11(18, 0), &[]);
        assert_eq!(slots.len(), 3);
        assert_eq!(slots[2].start, mar11(11, 0));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let finder = SlotFinder::new();
        let busy = vec![
            busy(mar11(10, 0), mar11(11, 30)),
            busy(mar11(14, 0), mar11(15, 0)),
        ];
        let a = finder.find_slots(mar11(9, 0), mar11(18, 0), &busy);
        let b = finder.find_slots(mar11(9, 0), mar11(18, 0), &busy);
        assert_eq!(a, b);
    }

    #[test]
    fn all_day_busy_blocks_the_whole_day() {
        let finder = SlotFinder::new();
        let slots = finder.find_slots(
            mar11(9, 0),
            mar11(18, 0),
            &[busy(mar11(0, 0), Utc.with_ymd_and_hms(2024, 3, 12, 0, 0, 0).unwrap())],
        );
        assert!(slots.is_empty());
    }

    #[test]
    fn partial_overlap_blocks_both_adjacent_slots() {
        let finder = SlotFinder::new();
        // 10:30-11:30 straddles the 10:00 and 11:00 slots.
        let slots = finder.find_slots(
            mar11(9, 0),
            mar11(13, 0),
            &[busy(mar11(10, 30), mar11(11, 30))],
        );
        let starts: Vec<u32> = slots.iter().map(|s| s.start.hour()).collect();
        assert!(starts.contains(&9));
        assert!(!starts.contains(&10));
        assert!(!starts.contains(&11));
        assert!(starts.contains(&12));
    }

    proptest! {
        // Across arbitrary busy snapshots, emitted slots never overlap any
        // busy interval and always sit inside working hours on weekdays.
        #[test]
        fn slots_respect_busy_and_working_hours(
            intervals in proptest::collection::vec((0i64..14 * 24 * 60, 1i64..600), 0..12)
        ) {
            let origin = Utc.with_ymd_and_hms(2024, 3, 11, 0, 0, 0).unwrap();
            let busy: Vec<BusyInterval> = intervals
                .iter()
                .filter_map(|(offset, len)| {
                    BusyInterval::new(
                        origin + Duration::minutes(*offset),
                        origin + Duration::minutes(offset + len),
                    )
                })
                .collect();

            let finder = SlotFinder::new();
            let slots = finder.find_slots(origin, origin + Duration::days(14), &busy);

            prop_assert!(slots.len() <= 20);
            for slot in &slots {
                prop_assert!(!is_weekend(slot.start.date_naive()));
                prop_assert!(slot.start.hour() >= 9 && slot.start.hour() < 18);
                for b in &busy {
                    prop_assert!(!b.overlaps(slot.start, slot.end));
                }
            }
            for pair in slots.windows(2) {
                prop_assert!(pair[0].start < pair[1].start);
            }
        }
    }
}
