use crate::models::event::{Event, EventDraft, EventSource};
use chrono::{DateTime, Utc};

use super::utils::{parse_date_token, unescape_text, unfold_lines, DateToken};

/// Fields collected between `BEGIN:VEVENT` and `END:VEVENT`.
#[derive(Debug, Default)]
struct PendingEvent {
    uid: Option<String>,
    title: Option<String>,
    description: Option<String>,
    start: Option<DateToken>,
    end: Option<DateToken>,
    /// Depth of nested components such as VALARM, whose properties are skipped.
    nested: usize,
}

impl PendingEvent {
    fn into_event(self, now: DateTime<Utc>) -> Option<Event> {
        let (title, start, end) = match (self.title, self.start, self.end) {
            (Some(title), Some(start), Some(end)) => (title, start, end),
            _ => return None,
        };

        let mut draft = EventDraft::new(start.instant, end.instant);
        draft.id = self.uid;
        draft.title = Some(title);
        draft.description = self.description.filter(|d| !d.is_empty());
        draft.all_day = start.all_day;
        draft.source = EventSource::ImportedIcs;
        Some(draft.into_event(now))
    }
}

/// Decode every well-formed VEVENT in `content`.
pub(super) fn events(content: &str, now: DateTime<Utc>) -> Vec<Event> {
    let mut events = Vec::new();
    let mut current: Option<PendingEvent> = None;
    let mut dropped = 0usize;

    for line in unfold_lines(content) {
        let Some((key_part, value)) = line.split_once(':') else {
            continue;
        };
        let mut params = key_part.split(';');
        let key = params.next().unwrap_or_default().trim().to_ascii_uppercase();
        let value_upper = value.trim().to_ascii_uppercase();

        match (key.as_str(), current.as_mut()) {
            ("BEGIN", None) if value_upper == "VEVENT" => {
                current = Some(PendingEvent::default());
            }
            // A block that never saw its END is discarded in favour of the new one
            ("BEGIN", Some(_)) if value_upper == "VEVENT" => {
                dropped += 1;
                current = Some(PendingEvent::default());
            }
            ("BEGIN", Some(pending)) => {
                pending.nested += 1;
            }
            ("END", Some(pending)) if pending.nested > 0 => {
                pending.nested -= 1;
            }
            ("END", Some(_)) if value_upper == "VEVENT" => {
                if let Some(pending) = current.take() {
                    match pending.into_event(now) {
                        Some(event) => events.push(event),
                        None => dropped += 1,
                    }
                }
            }
            (_, Some(pending)) if pending.nested == 0 => {
                let tzid = params.find_map(|param| {
                    let (name, value) = param.split_once('=')?;
                    name.trim().eq_ignore_ascii_case("TZID").then_some(value.trim())
                });
                parse_event_property(&key, tzid, value, pending);
            }
            _ => {}
        }
    }

    if dropped > 0 {
        log::debug!("Dropped {} incomplete VEVENT block(s)", dropped);
    }
    events
}

fn parse_event_property(key: &str, tzid: Option<&str>, value: &str, event: &mut PendingEvent) {
    match key {
        "UID" => {
            let uid = value.trim();
            if !uid.is_empty() {
                event.uid = Some(uid.to_string());
            }
        }
        "SUMMARY" => {
            event.title = Some(unescape_text(value));
        }
        "DESCRIPTION" => {
            event.description = Some(unescape_text(value));
        }
        "DTSTART" => {
            event.start = parse_date_token(value, tzid);
        }
        "DTEND" => {
            event.end = parse_date_token(value, tzid);
        }
        _ => {}
    }
}
