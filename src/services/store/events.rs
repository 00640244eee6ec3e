use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use super::Store;
use crate::models::event::{new_id, Event, EventDraft, EventPatch};
use crate::services::availability::BusyInterval;
use crate::utils::date::at_local_time;

impl Store {
    /// Create an event. A draft id that is empty or already taken is replaced.
    pub fn create_event(&mut self, mut draft: EventDraft) -> Event {
        if let Some(id) = draft.id.as_deref() {
            if self.get_event(id).is_some() {
                log::debug!("Event id {} already taken, assigning a fresh one", id);
                draft.id = Some(new_id());
            }
        }

        let event = draft.into_event(self.now());
        self.events.push(event.clone());
        event
    }

    pub fn get_event(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// Apply a partial update. Returns the updated copy, `None` for unknown ids.
    pub fn update_event(&mut self, id: &str, patch: EventPatch) -> Option<Event> {
        let now = self.now();
        let event = self.event_mut(id)?;
        event.apply(patch, now);
        Some(event.clone())
    }

    /// Move or resize an event.
    pub fn reschedule_event(
        &mut self,
        id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Option<Event> {
        self.update_event(id, EventPatch::reschedule(start, end))
    }

    /// Remove an event. Linked tasks are left alone.
    pub fn delete_event(&mut self, id: &str) -> Option<Event> {
        let index = self.events.iter().position(|event| event.id == id);
        match index {
            Some(index) => Some(self.events.remove(index)),
            None => {
                log::debug!("Ignoring delete of unknown event {}", id);
                None
            }
        }
    }

    /// Events intersecting the half-open range `[start, end)`, ordered by start.
    pub fn events_overlapping(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Event> {
        let mut found: Vec<&Event> = self
            .events
            .iter()
            .filter(|event| event.overlaps(start, end))
            .collect();
        found.sort_by_key(|event| (event.start, event.end));
        found
    }

    /// Events touching the calendar day `date` as seen in `tz`.
    pub fn events_on_day<Tz: TimeZone>(&self, date: NaiveDate, tz: &Tz) -> Vec<&Event> {
        let day_start = at_local_time(tz, date, NaiveTime::MIN);
        let next_day = date.succ_opt().map(|next| at_local_time(tz, next, NaiveTime::MIN));
        let day_end = next_day.unwrap_or_else(|| day_start.clone() + Duration::days(1));
        self.events_overlapping(day_start.with_timezone(&Utc), day_end.with_timezone(&Utc))
    }

    /// Events carrying `tag`, compared case-insensitively.
    pub fn events_tagged(&self, tag: &str) -> Vec<&Event> {
        let mut found: Vec<&Event> = self.events.iter().filter(|event| event.has_tag(tag)).collect();
        found.sort_by_key(|event| event.start);
        found
    }

    /// Scheduled blocks for a task.
    pub fn events_for_task(&self, task_id: &str) -> Vec<&Event> {
        let mut found: Vec<&Event> = self
            .events
            .iter()
            .filter(|event| event.linked_task_id.as_deref() == Some(task_id))
            .collect();
        found.sort_by_key(|event| event.start);
        found
    }

    /// Busy time in `[start, end)` for the free-window finder.
    ///
    /// All-day events mark a day rather than block it, so they are left out.
    pub fn busy_intervals(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<BusyInterval> {
        self.events_overlapping(start, end)
            .into_iter()
            .filter(|event| !event.all_day)
            .map(BusyInterval::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::EventSource;
    use crate::utils::clock::FixedClock;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::rc::Rc;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    fn store() -> Store {
        Store::with_clock(FixedClock::new(at(8, 0)))
    }

    fn titled(title: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> EventDraft {
        Event::builder().title(title).start(start).end(end).build()
    }

    #[test]
    fn test_create_event_defaults() {
        let mut store = store();
        let event = store.create_event(EventDraft::new(at(10, 0), at(11, 0)));

        assert_eq!(event.title, "Untitled Event");
        assert_eq!(event.source, EventSource::Manual);
        assert_eq!(store.get_event(&event.id), Some(&event));
        assert_eq!(store.events().len(), 1);
    }

    #[test]
    fn test_create_event_with_taken_id_gets_fresh_one() {
        let mut store = store();
        let first = store.create_event(Event::builder().id("fixed").start(at(9, 0)).end(at(10, 0)).build());
        let second = store.create_event(Event::builder().id("fixed").start(at(9, 0)).end(at(10, 0)).build());

        assert_eq!(first.id, "fixed");
        assert_ne!(second.id, "fixed");
        assert_eq!(store.events().len(), 2);
    }

    #[test]
    fn test_update_event_stamps_and_repairs() {
        let clock = Rc::new(FixedClock::new(at(8, 0)));
        let mut store = Store::with_clock(Rc::clone(&clock));
        let event = store.create_event(titled("Review", at(10, 0), at(11, 0)));

        clock.advance(Duration::minutes(5));
        let updated = store
            .update_event(
                &event.id,
                EventPatch {
                    title: Some("Design review".into()),
                    end: Some(at(9, 0)),
                    ..EventPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Design review");
        assert_eq!(updated.end, at(11, 0));
        assert_eq!(updated.created_at, at(8, 0));
        assert_eq!(updated.updated_at, at(8, 5));
        assert_eq!(store.get_event(&event.id), Some(&updated));
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut store = store();
        store.create_event(titled("Keep", at(10, 0), at(11, 0)));
        let before = store.events().to_vec();

        assert_eq!(store.update_event("missing", EventPatch::default()), None);
        assert_eq!(store.reschedule_event("missing", at(1, 0), at(2, 0)), None);
        assert_eq!(store.delete_event("missing"), None);
        assert_eq!(store.events(), before.as_slice());
    }

    #[test]
    fn test_delete_event_returns_record() {
        let mut store = store();
        let event = store.create_event(titled("Gone", at(10, 0), at(11, 0)));

        assert_eq!(store.delete_event(&event.id), Some(event.clone()));
        assert_eq!(store.get_event(&event.id), None);
    }

    #[test]
    fn test_events_overlapping_half_open_and_sorted() {
        let mut store = store();
        let late = store.create_event(titled("late", at(13, 0), at(14, 0)));
        let early = store.create_event(titled("early", at(9, 0), at(10, 0)));
        store.create_event(titled("before", at(8, 0), at(9, 0)));
        store.create_event(titled("after", at(14, 0), at(15, 0)));

        let found: Vec<&str> = store
            .events_overlapping(at(9, 0), at(14, 0))
            .iter()
            .map(|event| event.id.as_str())
            .collect();
        assert_eq!(found, vec![early.id.as_str(), late.id.as_str()]);
    }

    #[test]
    fn test_events_on_day_uses_zone() {
        let mut store = store();
        // 23:30 UTC on June 1st is already June 2nd in UTC+2
        let event = store.create_event(titled("late call", at(0, 0) - Duration::minutes(30), at(0, 15)));
        store.create_event(titled("next day", at(22, 30), at(23, 0)));

        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let day = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let found = store.events_on_day(day, &tz);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, event.id);
    }

    #[test]
    fn test_tag_and_task_queries() {
        let mut store = store();
        let tagged = store.create_event(
            Event::builder()
                .title("Write")
                .start(at(9, 0))
                .end(at(10, 0))
                .tag("#Focus")
                .linked_task("task-1")
                .build(),
        );
        store.create_event(titled("Other", at(11, 0), at(12, 0)));

        assert_eq!(store.events_tagged("focus")[0].id, tagged.id);
        assert_eq!(store.events_for_task("task-1")[0].id, tagged.id);
        assert!(store.events_for_task("task-2").is_empty());
    }

    #[test]
    fn test_busy_intervals_skip_all_day() {
        let mut store = store();
        store.create_event(
            Event::builder()
                .title("Holiday")
                .start(at(0, 0))
                .end(at(0, 0) + Duration::days(1))
                .all_day(true)
                .build(),
        );
        store.create_event(titled("Meeting", at(10, 0), at(11, 0)));

        let busy = store.busy_intervals(at(0, 0), at(0, 0) + Duration::days(1));
        assert_eq!(busy, vec![BusyInterval::new(at(10, 0), at(11, 0))]);
    }

    proptest! {
        #[test]
        fn prop_inverted_range_is_coerced(start_min in 0i64..100_000, back in 0i64..10_000) {
            let mut store = store();
            let start = at(0, 0) + Duration::minutes(start_min);
            let end = start - Duration::minutes(back);

            let created = store.create_event(EventDraft::new(start, end));
            prop_assert_eq!(created.start, start);
            prop_assert_eq!(created.end, start + Duration::hours(1));

            let updated = store.reschedule_event(&created.id, start, end).unwrap();
            prop_assert_eq!(updated.start, start);
            prop_assert_eq!(updated.end, start + Duration::hours(1));
        }

        #[test]
        fn prop_event_ending_at_range_start_is_excluded(offset in 1i64..600, len in 1i64..600) {
            let mut store = store();
            let range_start = at(12, 0);
            store.create_event(EventDraft::new(range_start - Duration::minutes(offset), range_start));

            let found = store.events_overlapping(range_start, range_start + Duration::minutes(len));
            prop_assert!(found.is_empty());
        }
    }
}
