//! Free time detection within working hours.
//!
//! A single forward sweep over busy intervals sorted by start. Intervals do
//! not need to be merged first: an overlapping interval can only push the
//! cursor further, never back.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::event::Event;
use crate::utils::date::at_hour;
use crate::utils::grid::round_up;

/// A period that is already taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

impl From<&Event> for BusyInterval {
    fn from(event: &Event) -> Self {
        Self::new(event.start, event.end)
    }
}

/// An open window found by the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl FreeWindow {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }

    /// Check if this window can fit a block of the given length
    pub fn can_fit(&self, minutes: i64) -> bool {
        self.duration_minutes() >= minutes
    }
}

/// Next free window today, in local time, starting from now.
pub fn next_free_window(
    busy: &[BusyInterval],
    step_minutes: u32,
    day_start_hour: u32,
    day_end_hour: u32,
) -> Option<FreeWindow> {
    next_free_window_at(busy, step_minutes, day_start_hour, day_end_hour, &Local::now())
}

/// Next free window on the day of `now`, with working hours read in `now`'s zone.
///
/// Returns `None` when the rest of the working day is booked or already over.
pub fn next_free_window_at<Tz: TimeZone>(
    busy: &[BusyInterval],
    step_minutes: u32,
    day_start_hour: u32,
    day_end_hour: u32,
    now: &DateTime<Tz>,
) -> Option<FreeWindow> {
    sweep(busy, step_minutes, day_start_hour, day_end_hour, now, Duration::zero())
}

/// Like [`next_free_window_at`] but skips gaps shorter than `minutes`.
pub fn next_free_window_for<Tz: TimeZone>(
    busy: &[BusyInterval],
    minutes: u32,
    step_minutes: u32,
    day_start_hour: u32,
    day_end_hour: u32,
    now: &DateTime<Tz>,
) -> Option<FreeWindow> {
    sweep(
        busy,
        step_minutes,
        day_start_hour,
        day_end_hour,
        now,
        Duration::minutes(minutes as i64),
    )
}

fn sweep<Tz: TimeZone>(
    busy: &[BusyInterval],
    step_minutes: u32,
    day_start_hour: u32,
    day_end_hour: u32,
    now: &DateTime<Tz>,
    required: Duration,
) -> Option<FreeWindow> {
    let tz = now.timezone();
    let snap = |t: DateTime<Utc>| round_up(&t.with_timezone(&tz), step_minutes).with_timezone(&Utc);
    let fits = |from: DateTime<Utc>, to: DateTime<Utc>| {
        let length = to - from;
        if required.is_zero() {
            length > Duration::zero()
        } else {
            length >= required
        }
    };

    let day_start = at_hour(now, day_start_hour).with_timezone(&Utc);
    let day_end = at_hour(now, day_end_hour).with_timezone(&Utc);
    let now = now.with_timezone(&Utc);

    let mut cursor = snap(now.max(day_start));
    if cursor >= day_end {
        log::debug!("Working day already over at {}", now);
        return None;
    }

    let mut sorted: Vec<&BusyInterval> = busy.iter().collect();
    sorted.sort_by_key(|interval| interval.start);

    for interval in sorted {
        if interval.start > cursor {
            let gap_end = interval.start.min(day_end);
            if fits(cursor, gap_end) {
                return Some(FreeWindow {
                    start: cursor,
                    end: gap_end,
                });
            }
        }
        cursor = snap(cursor.max(interval.end));
        if cursor >= day_end {
            return None;
        }
    }

    fits(cursor, day_end).then_some(FreeWindow {
        start: cursor,
        end: day_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, 0).unwrap()
    }

    fn busy(from: (u32, u32), to: (u32, u32)) -> BusyInterval {
        BusyInterval::new(at(from.0, from.1), at(to.0, to.1))
    }

    #[test]
    fn test_empty_day_rounds_now_up() {
        let window = next_free_window_at(&[], 15, 9, 18, &at(10, 7)).unwrap();
        assert_eq!(window.start, at(10, 15));
        assert_eq!(window.end, at(18, 0));
    }

    #[test]
    fn test_fully_booked_day() {
        let intervals = [busy((9, 0), (18, 0))];
        assert_eq!(next_free_window_at(&intervals, 15, 9, 18, &at(10, 7)), None);
    }

    #[test]
    fn test_before_working_hours_clips_to_day_start() {
        let window = next_free_window_at(&[], 30, 9, 18, &at(6, 40)).unwrap();
        assert_eq!(window.start, at(9, 0));
    }

    #[test]
    fn test_after_working_hours() {
        assert_eq!(next_free_window_at(&[], 15, 9, 18, &at(18, 0)), None);
        assert_eq!(next_free_window_at(&[], 15, 9, 18, &at(17, 50)), None);
    }

    #[test]
    fn test_gap_before_first_busy_interval() {
        let intervals = [busy((11, 0), (12, 0))];
        let window = next_free_window_at(&intervals, 15, 9, 18, &at(10, 7)).unwrap();
        assert_eq!(window.start, at(10, 15));
        assert_eq!(window.end, at(11, 0));
    }

    #[test]
    fn test_unsorted_overlapping_intervals() {
        let intervals = [
            busy((11, 0), (13, 10)),
            busy((10, 0), (11, 30)),
            busy((12, 0), (12, 30)),
        ];
        let window = next_free_window_at(&intervals, 15, 9, 18, &at(10, 7)).unwrap();
        // 13:10 rounds up to the next grid line
        assert_eq!(window.start, at(13, 15));
        assert_eq!(window.end, at(18, 0));
    }

    #[test]
    fn test_busy_interval_ending_before_now_is_skipped() {
        let intervals = [busy((9, 0), (9, 45))];
        let window = next_free_window_at(&intervals, 15, 9, 18, &at(10, 7)).unwrap();
        assert_eq!(window.start, at(10, 15));
    }

    #[test]
    fn test_gap_clipped_to_day_end() {
        let intervals = [busy((9, 0), (17, 0)), busy((19, 0), (20, 0))];
        let window = next_free_window_at(&intervals, 15, 9, 18, &at(10, 7)).unwrap();
        assert_eq!(window.start, at(17, 0));
        assert_eq!(window.end, at(18, 0));
    }

    #[test]
    fn test_minimum_length() {
        let intervals = [busy((10, 30), (11, 0)), busy((12, 0), (13, 0))];
        let window = next_free_window_for(&intervals, 45, 15, 9, 18, &at(10, 7)).unwrap();
        assert_eq!(window.start, at(11, 0));
        assert_eq!(window.end, at(12, 0));
        assert!(window.can_fit(45));
        assert_eq!(window.duration_minutes(), 60);
    }

    #[test]
    fn test_working_hours_follow_caller_zone() {
        // 10:07 in UTC+2 is 08:07 UTC; working day starts 07:00 UTC
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 3, 14, 10, 7, 0).unwrap();
        let window = next_free_window_at(&[], 15, 9, 18, &now).unwrap();
        assert_eq!(window.start, at(8, 15));
        assert_eq!(window.end, at(16, 0));
    }
}
