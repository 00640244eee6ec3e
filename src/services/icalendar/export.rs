use crate::models::event::Event;
use chrono::{DateTime, NaiveTime, Utc};

use super::utils::{escape_text, format_date, format_datetime, push_line};

pub const PRODUCT_ID: &str = "-//Rust Planner//EN";

/// Serialize events as one VCALENDAR, stamping `DTSTAMP` with `stamp`.
pub(super) fn calendar(events: &[Event], calendar_name: &str, stamp: DateTime<Utc>) -> String {
    let mut ics = calendar_header(calendar_name);
    for event in events {
        append_event(&mut ics, event, stamp);
    }
    push_line(&mut ics, "END:VCALENDAR");
    ics
}

fn calendar_header(calendar_name: &str) -> String {
    let mut ics = String::new();
    push_line(&mut ics, "BEGIN:VCALENDAR");
    push_line(&mut ics, "VERSION:2.0");
    push_line(&mut ics, &format!("PRODID:{}", PRODUCT_ID));
    push_line(&mut ics, "CALSCALE:GREGORIAN");
    if !calendar_name.trim().is_empty() {
        push_line(
            &mut ics,
            &format!("X-WR-CALNAME:{}", escape_text(calendar_name.trim())),
        );
    }
    ics
}

fn append_event(buffer: &mut String, event: &Event, stamp: DateTime<Utc>) {
    push_line(buffer, "BEGIN:VEVENT");
    push_line(buffer, &format!("UID:{}", event.id));
    push_line(buffer, &format!("DTSTAMP:{}", format_datetime(&stamp)));

    if exports_as_date(event) {
        push_line(buffer, &format!("DTSTART;VALUE=DATE:{}", format_date(&event.start)));
        push_line(buffer, &format!("DTEND;VALUE=DATE:{}", format_date(&event.end)));
    } else {
        push_line(buffer, &format!("DTSTART:{}", format_datetime(&event.start)));
        push_line(buffer, &format!("DTEND:{}", format_datetime(&event.end)));
    }

    push_line(buffer, &format!("SUMMARY:{}", escape_text(&event.title)));

    if let Some(desc) = event.description.as_deref().filter(|d| !d.is_empty()) {
        push_line(buffer, &format!("DESCRIPTION:{}", escape_text(desc)));
    }

    push_line(buffer, "END:VEVENT");
}

/// Date-only form is used when it loses nothing.
fn exports_as_date(event: &Event) -> bool {
    event.all_day && event.start.time() == NaiveTime::MIN && event.end.time() == NaiveTime::MIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn event(start: DateTime<Utc>, end: DateTime<Utc>, all_day: bool) -> Event {
        Event::builder()
            .id("evt-1")
            .title("Standup")
            .start(start)
            .end(end)
            .all_day(all_day)
            .build()
            .into_event(stamp())
    }

    #[test]
    fn test_all_day_at_midnight_uses_date_form() {
        let start = Utc.with_ymd_and_hms(2025, 11, 7, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 11, 8, 0, 0, 0).unwrap();
        let ics = calendar(&[event(start, end, true)], "Work", stamp());

        assert!(ics.contains("DTSTART;VALUE=DATE:20251107\r\n"));
        assert!(ics.contains("DTEND;VALUE=DATE:20251108\r\n"));
    }

    #[test]
    fn test_all_day_off_midnight_keeps_datetime_form() {
        let start = Utc.with_ymd_and_hms(2025, 11, 6, 23, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 11, 7, 23, 0, 0).unwrap();
        let ics = calendar(&[event(start, end, true)], "Work", stamp());

        assert!(ics.contains("DTSTART:20251106T230000Z\r\n"));
        assert!(!ics.contains("VALUE=DATE"));
    }

    #[test]
    fn test_header_and_empty_name() {
        let ics = calendar(&[], "  ", stamp());
        assert!(ics.starts_with("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Rust Planner//EN\r\n"));
        assert!(!ics.contains("X-WR-CALNAME"));
        assert!(ics.ends_with("END:VCALENDAR\r\n"));
    }
}
