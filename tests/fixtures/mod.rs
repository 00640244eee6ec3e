// Test fixtures - reusable test data
// Provides consistent dates, clocks and events across the integration tests

#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_planner::models::event::{Event, EventDraft};
use rust_planner::utils::clock::FixedClock;
use rust_planner::utils::grid::GridColumn;

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Friday Mar 14, 2025 at 10:07 UTC, deliberately off the grid
    pub fn friday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 10, 7, 0).unwrap()
    }

    /// Mar 14, 2025 at 09:00 UTC, the start of the default working day
    pub fn friday_start_of_work() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap()
    }

    pub fn friday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    /// An instant on Mar `day`, 2025 (UTC)
    pub fn march(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, minute, 0).unwrap()
    }
}

/// Clocks for driving the store
pub mod clocks {
    use super::*;

    pub fn fixed_at(now: DateTime<Utc>) -> FixedClock {
        FixedClock::new(now)
    }
}

/// Grid geometry for interaction tests
pub mod grid {
    use super::*;

    /// One pixel per minute, starting at the top of the viewport
    pub fn minute_column() -> GridColumn {
        GridColumn::new(0.0, 1440.0)
    }

    pub fn y(hour: u32, minute: u32) -> f32 {
        (hour * 60 + minute) as f32
    }
}

/// Sample events for testing
pub mod events {
    use super::*;

    pub fn standup(start: DateTime<Utc>) -> EventDraft {
        Event::builder()
            .title("Standup")
            .start(start)
            .end(start + Duration::minutes(15))
            .tag("team")
            .build()
    }

    pub fn lunch(start: DateTime<Utc>) -> EventDraft {
        Event::builder()
            .title("Lunch")
            .start(start)
            .end(start + Duration::hours(1))
            .build()
    }
}
