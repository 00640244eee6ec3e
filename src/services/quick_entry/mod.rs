//! Natural-language quick entry.
//!
//! Pulls a schedule, a due time, durations, reminders and estimates out of a
//! line of free text such as `"write draft tomorrow 9am for 45m"`. Recognized
//! fragments are cut from the text in matcher order; what is left, with
//! whitespace collapsed, becomes the title.
//!
//! Nothing here fails. A fragment that cannot be read stays in the title and
//! the matching field stays `None`, leaving the default to the caller.

mod clock;
mod matchers;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::models::task::TaskPriority;
use matchers::{apply, marker_matchers, time_matchers, ParseState};

/// Floor for a duration derived from an explicit start/end pair.
pub const MIN_DERIVED_DURATION: i64 = 5;

/// Structured result of a quick entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickEntry {
    pub clean_title: String,
    pub scheduled: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub duration_minutes: Option<u32>,
    /// Set when only a day was named.
    pub all_day: bool,
    pub reminder_minutes: Option<u32>,
    pub estimate_minutes: Option<u32>,
    pub tags: Vec<String>,
    pub links: Vec<String>,
    pub priority: Option<TaskPriority>,
}

impl QuickEntry {
    /// End of the entry's time block, if it has a schedule.
    pub fn block_end(&self) -> Option<DateTime<Utc>> {
        let start = self.scheduled?;
        if let Some(due) = self.due_date.filter(|due| *due > start) {
            return Some(due);
        }
        self.duration_minutes
            .map(|minutes| start + Duration::minutes(minutes as i64))
    }
}

/// Parse against the local clock.
pub fn parse_quick_entry(text: &str, grid_step_minutes: u32) -> QuickEntry {
    parse_quick_entry_at(text, grid_step_minutes, &Local::now())
}

/// Parse with tags, links and priority markers, against the local clock.
pub fn parse_rich_entry(text: &str, grid_step_minutes: u32) -> QuickEntry {
    parse_rich_entry_at(text, grid_step_minutes, &Local::now())
}

/// Parse schedule, due, duration, reminder and estimate fragments.
///
/// Calendar days and wall-clock times are read in `now`'s time zone.
pub fn parse_quick_entry_at<Tz: TimeZone>(
    text: &str,
    grid_step_minutes: u32,
    now: &DateTime<Tz>,
) -> QuickEntry {
    run(text, grid_step_minutes, now, false)
}

/// [`parse_quick_entry_at`] plus `#tag`, `[[link]]` and `!priority` markers.
pub fn parse_rich_entry_at<Tz: TimeZone>(
    text: &str,
    grid_step_minutes: u32,
    now: &DateTime<Tz>,
) -> QuickEntry {
    run(text, grid_step_minutes, now, true)
}

fn run<Tz: TimeZone>(text: &str, step: u32, now: &DateTime<Tz>, rich: bool) -> QuickEntry {
    let mut working = text.to_string();
    let mut state = ParseState::new(now.clone(), step);

    if rich {
        for matcher in marker_matchers::<Tz>() {
            apply(&matcher, &mut working, &mut state);
        }
    }
    for matcher in time_matchers::<Tz>() {
        apply(&matcher, &mut working, &mut state);
    }

    finish(working, state)
}

fn finish<Tz: TimeZone>(working: String, mut state: ParseState<Tz>) -> QuickEntry {
    let mut duration_minutes = state.in_minutes;

    if let Some(minutes) = state.for_minutes {
        let scheduled = match state.scheduled.clone() {
            Some(scheduled) => scheduled,
            None => state.now_on_grid(),
        };
        state.due = Some(scheduled.clone() + Duration::minutes(minutes as i64));
        state.scheduled = Some(scheduled);
        state.all_day = false;
        duration_minutes = Some(minutes);
    }

    if duration_minutes.is_none() {
        if let (Some(start), Some(due)) = (&state.scheduled, &state.due) {
            let minutes = (due.clone() - start.clone()).num_minutes().max(MIN_DERIVED_DURATION);
            duration_minutes = u32::try_from(minutes).ok();
        }
    }

    QuickEntry {
        clean_title: working.split_whitespace().collect::<Vec<_>>().join(" "),
        scheduled: state.scheduled.map(|t| t.with_timezone(&Utc)),
        due_date: state.due.map(|t| t.with_timezone(&Utc)),
        duration_minutes,
        all_day: state.all_day,
        reminder_minutes: state.reminder_minutes,
        estimate_minutes: state.estimate_minutes,
        tags: state.tags,
        links: state.links,
        priority: state.priority,
    }
}
