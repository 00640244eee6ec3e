//! Ordered matcher table for quick entry.
//!
//! Each matcher pairs a pattern with an extractor. Matchers run in table
//! order against a working copy of the text; whatever an extractor claims is
//! cut out before the next matcher runs.

use std::ops::Range;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Weekday};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::clock::{followed_by_unit, parse_clock, parse_clock_range, unit_minutes, ClockText};
use crate::models::task::TaskPriority;
use crate::utils::date::{at_local_time, next_weekday};
use crate::utils::grid::round_up;

// Clock value with an optional end anchor: `3pm`, `15:30`, `3-4pm`, `9am to 11:30am`.
const CLOCK: &str = r"(?P<h>\d{1,2})(?::(?P<m>\d{2}))?\s*(?P<ap>am|pm)?(?:\s*(?:-|to|until)\s*(?P<eh>\d{1,2})(?::(?P<em>\d{2}))?\s*(?P<eap>am|pm)?)?\b";
const UNIT: &str = r"m|mins?|minutes?|h|hrs?|hours?";

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").expect("valid link regex"));
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)#([\w\-/]+)").expect("valid tag regex"));
static PRIORITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|\s)!(urgent|high|medium|med|low)\b").expect("valid priority regex")
});
static NOW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bnow\b").expect("valid now regex"));
static IN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\bin\s+(\d+)\s*({UNIT})\b")).expect("valid in regex")
});
static FOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\bfor\s+(\d+)\s*({UNIT})\b")).expect("valid for regex")
});
static DAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(?P<day>today|tmr|tomorrow)\b(?:\s+(?:at\s+)?{CLOCK})?"))
        .expect("valid day regex")
});
static WEEKDAY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<day>mon(?:day)?|tue(?:s(?:day)?)?|wed(?:nesday)?|thu(?:r(?:s(?:day)?)?)?|fri(?:day)?|sat(?:urday)?|sun(?:day)?)\b(?:\s+(?:at\s+)?{CLOCK})?"
    ))
    .expect("valid weekday regex")
});
static AT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!(r"(?i)\bat\s+{CLOCK}")).expect("valid at regex"));
static MERIDIEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?P<h>\d{1,2})(?::(?P<m>\d{2}))?\s*(?P<ap>am|pm)(?:\s*(?:-|to|until)\s*(?P<eh>\d{1,2})(?::(?P<em>\d{2}))?\s*(?P<eap>am|pm)?)?\b")
        .expect("valid clock regex")
});
static REMIND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bremind(?:er)?(?:\s+me)?\s+(\d+)\s*(m|mins?|minutes?|h|hrs?|hours?|d|days?)\b(?:\s+before)?")
        .expect("valid remind regex")
});
static ESTIMATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:est(?:imate)?:?\s*)?(\d+)\s*(mins?|minutes?|h|hrs?|hours?)\b")
        .expect("valid estimate regex")
});

/// Values collected while the matchers run.
pub(super) struct ParseState<Tz: TimeZone> {
    pub now: DateTime<Tz>,
    pub step_minutes: u32,
    pub scheduled: Option<DateTime<Tz>>,
    pub due: Option<DateTime<Tz>>,
    pub all_day: bool,
    pub in_minutes: Option<u32>,
    pub for_minutes: Option<u32>,
    pub reminder_minutes: Option<u32>,
    pub estimate_minutes: Option<u32>,
    pub tags: Vec<String>,
    pub links: Vec<String>,
    pub priority: Option<TaskPriority>,
}

impl<Tz: TimeZone> ParseState<Tz> {
    pub fn new(now: DateTime<Tz>, step_minutes: u32) -> Self {
        Self {
            now,
            step_minutes,
            scheduled: None,
            due: None,
            all_day: false,
            in_minutes: None,
            for_minutes: None,
            reminder_minutes: None,
            estimate_minutes: None,
            tags: Vec::new(),
            links: Vec::new(),
            priority: None,
        }
    }

    pub fn now_on_grid(&self) -> DateTime<Tz> {
        round_up(&self.now, self.step_minutes)
    }

    fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    fn on_grid(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Tz> {
        round_up(&at_local_time(&self.now.timezone(), date, time), self.step_minutes)
    }
}

/// Extractor result: the byte range of the working text to cut, or `None`
/// to leave the match in place.
type Extract<Tz> = fn(&Captures<'_>, &str, &mut ParseState<Tz>) -> Option<Range<usize>>;

pub(super) struct Matcher<Tz: TimeZone> {
    pub name: &'static str,
    pub pattern: &'static Lazy<Regex>,
    /// Keep matching after the first hit (tags, links).
    pub repeat: bool,
    pub extract: Extract<Tz>,
}

/// Markers only the rich variant understands.
pub(super) fn marker_matchers<Tz: TimeZone>() -> Vec<Matcher<Tz>> {
    vec![
        Matcher { name: "link", pattern: &LINK_RE, repeat: true, extract: extract_link::<Tz> },
        Matcher { name: "tag", pattern: &TAG_RE, repeat: true, extract: extract_tag::<Tz> },
        Matcher { name: "priority", pattern: &PRIORITY_RE, repeat: false, extract: extract_priority::<Tz> },
    ]
}

/// Time matchers in priority order: durations before clock numbers, the
/// literal `today`/`tomorrow` before weekday names, weekday names before a
/// bare time of day.
pub(super) fn time_matchers<Tz: TimeZone>() -> Vec<Matcher<Tz>> {
    vec![
        Matcher { name: "now", pattern: &NOW_RE, repeat: false, extract: extract_now::<Tz> },
        Matcher { name: "in", pattern: &IN_RE, repeat: false, extract: extract_in::<Tz> },
        Matcher { name: "for", pattern: &FOR_RE, repeat: false, extract: extract_for::<Tz> },
        Matcher { name: "day", pattern: &DAY_RE, repeat: false, extract: extract_day::<Tz> },
        Matcher { name: "weekday", pattern: &WEEKDAY_RE, repeat: false, extract: extract_weekday::<Tz> },
        Matcher { name: "at", pattern: &AT_RE, repeat: false, extract: extract_at::<Tz> },
        Matcher { name: "clock", pattern: &MERIDIEM_RE, repeat: false, extract: extract_at::<Tz> },
        Matcher { name: "remind", pattern: &REMIND_RE, repeat: false, extract: extract_remind::<Tz> },
        Matcher { name: "estimate", pattern: &ESTIMATE_RE, repeat: false, extract: extract_estimate::<Tz> },
    ]
}

/// Run one matcher over the working text, cutting what it claims.
pub(super) fn apply<Tz: TimeZone>(matcher: &Matcher<Tz>, text: &mut String, state: &mut ParseState<Tz>) {
    let mut from = 0;
    while from <= text.len() {
        let (matched, claimed) = {
            let Some(caps) = matcher.pattern.captures_at(text.as_str(), from) else {
                break;
            };
            let matched = caps.get(0).map(|m| m.range()).unwrap_or(from..from);
            (matched, (matcher.extract)(&caps, text.as_str(), state))
        };

        match claimed {
            Some(cut) => {
                log::trace!("quick entry: {} claimed {:?}", matcher.name, &text[cut.clone()]);
                text.replace_range(cut.clone(), " ");
                if !matcher.repeat {
                    break;
                }
                from = cut.start + 1;
            }
            // Rejected: resume the search one character further on
            None => from = next_char_boundary(text, matched.start + 1),
        }
    }
}

fn next_char_boundary(text: &str, mut index: usize) -> usize {
    while index < text.len() && !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

fn whole(caps: &Captures<'_>) -> Option<Range<usize>> {
    caps.get(0).map(|m| m.range())
}

fn extract_link<Tz: TimeZone>(caps: &Captures<'_>, _: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    let name = caps.get(1)?.as_str().trim();
    if name.is_empty() {
        return None;
    }
    if !state.links.iter().any(|l| l == name) {
        state.links.push(name.to_string());
    }
    whole(caps)
}

fn extract_tag<Tz: TimeZone>(caps: &Captures<'_>, _: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    let tag = caps.get(1)?.as_str();
    if !state.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
        state.tags.push(tag.to_string());
    }
    whole(caps)
}

fn extract_priority<Tz: TimeZone>(caps: &Captures<'_>, _: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    state.priority = TaskPriority::parse(&caps.get(1)?.as_str().to_ascii_lowercase());
    whole(caps)
}

fn extract_now<Tz: TimeZone>(caps: &Captures<'_>, _: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    state.scheduled = Some(state.now_on_grid());
    whole(caps)
}

fn extract_in<Tz: TimeZone>(caps: &Captures<'_>, _: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    let minutes = unit_minutes(caps.get(1)?.as_str(), caps.get(2)?.as_str())?;
    let scheduled = state.now_on_grid();
    state.due = Some(scheduled.clone() + Duration::minutes(minutes as i64));
    state.scheduled = Some(scheduled);
    state.in_minutes = Some(minutes);
    whole(caps)
}

fn extract_for<Tz: TimeZone>(caps: &Captures<'_>, _: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    // Resolved after all matchers ran, so a later day/time still wins the schedule
    state.for_minutes = Some(unit_minutes(caps.get(1)?.as_str(), caps.get(2)?.as_str())?);
    whole(caps)
}

fn extract_day<Tz: TimeZone>(caps: &Captures<'_>, text: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    if state.scheduled.is_some() {
        return None;
    }
    let word = caps.name("day")?;
    let date = match word.as_str().to_ascii_lowercase().as_str() {
        "today" => state.today(),
        _ => state.today().succ_opt()?,
    };
    Some(schedule_on(date, caps, text, word.range(), state))
}

fn extract_weekday<Tz: TimeZone>(caps: &Captures<'_>, text: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    if state.scheduled.is_some() {
        return None;
    }
    let word = caps.name("day")?;
    let weekday = parse_weekday(word.as_str())?;
    // A weekday naming today means next week's
    let date = next_weekday(state.today(), weekday);
    Some(schedule_on(date, caps, text, word.range(), state))
}

fn extract_at<Tz: TimeZone>(caps: &Captures<'_>, text: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    if state.scheduled.is_some() {
        return None;
    }
    let cut = whole(caps)?;
    if followed_by_unit(&text[cut.end..]) {
        return None;
    }
    let (start, end) = clock_span(caps)?;
    let date = state.today();
    set_schedule(date, start, end, state);
    Some(cut)
}

fn extract_remind<Tz: TimeZone>(caps: &Captures<'_>, _: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    state.reminder_minutes = Some(unit_minutes(caps.get(1)?.as_str(), caps.get(2)?.as_str())?);
    whole(caps)
}

fn extract_estimate<Tz: TimeZone>(caps: &Captures<'_>, _: &str, state: &mut ParseState<Tz>) -> Option<Range<usize>> {
    state.estimate_minutes = Some(unit_minutes(caps.get(1)?.as_str(), caps.get(2)?.as_str())?);
    whole(caps)
}

/// Schedule on `date`, using the clock part of the match when it is valid.
/// Without a usable clock only the day word is cut and the entry is all-day.
fn schedule_on<Tz: TimeZone>(
    date: NaiveDate,
    caps: &Captures<'_>,
    text: &str,
    day_word: Range<usize>,
    state: &mut ParseState<Tz>,
) -> Range<usize> {
    let cut = caps.get(0).map(|m| m.range()).unwrap_or(day_word.clone());
    let has_clock = caps.name("h").is_some();

    if has_clock && !followed_by_unit(&text[cut.end..]) {
        if let Some((start, end)) = clock_span(caps) {
            set_schedule(date, start, end, state);
            return cut;
        }
    }

    state.scheduled = Some(at_local_time(&state.now.timezone(), date, NaiveTime::MIN));
    state.all_day = true;
    day_word
}

fn set_schedule<Tz: TimeZone>(date: NaiveDate, start: NaiveTime, end: Option<NaiveTime>, state: &mut ParseState<Tz>) {
    let scheduled = state.on_grid(date, start);
    if let Some(end) = end {
        let mut due = state.on_grid(date, end);
        if due <= scheduled {
            due = due + Duration::days(1);
        }
        state.due = Some(due);
    }
    state.scheduled = Some(scheduled);
}

/// Start time and optional end time from the clock groups of a match.
fn clock_span(caps: &Captures<'_>) -> Option<(NaiveTime, Option<NaiveTime>)> {
    let start = ClockText {
        hour: caps.name("h")?.as_str(),
        minute: caps.name("m").map(|m| m.as_str()),
        meridiem: caps.name("ap").map(|m| m.as_str()),
    };
    match caps.name("eh") {
        Some(end_hour) => {
            let end = ClockText {
                hour: end_hour.as_str(),
                minute: caps.name("em").map(|m| m.as_str()),
                meridiem: caps.name("eap").map(|m| m.as_str()),
            };
            let (start, end) = parse_clock_range(&start, &end)?;
            Some((start, Some(end)))
        }
        None => Some((parse_clock(&start)?, None)),
    }
}

fn parse_weekday(word: &str) -> Option<Weekday> {
    let word = word.to_ascii_lowercase();
    let weekday = match word.get(..3)? {
        "mon" => Weekday::Mon,
        "tue" => Weekday::Tue,
        "wed" => Weekday::Wed,
        "thu" => Weekday::Thu,
        "fri" => Weekday::Fri,
        "sat" => Weekday::Sat,
        "sun" => Weekday::Sun,
        _ => return None,
    };
    Some(weekday)
}
