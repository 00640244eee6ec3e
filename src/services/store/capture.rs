use chrono::{DateTime, Duration, Utc};

use super::Store;
use crate::models::event::{Event, EventDraft, EventPatch, EventSource};
use crate::models::task::{Task, TaskDraft, TaskPatch};
use crate::services::quick_entry::QuickEntry;

/// Longest title taken from a captured selection.
pub const SELECTION_TITLE_LIMIT: usize = 80;

/// `meta` key holding the id of the document a selection came from.
pub const DOCUMENT_ID_KEY: &str = "document_id";

impl Store {
    /// Quick-add a task from parsed text.
    pub fn create_task_from_entry(&mut self, entry: &QuickEntry) -> Task {
        let draft = TaskDraft {
            title: Some(entry.clean_title.clone()),
            priority: entry.priority.unwrap_or_default(),
            due_date: entry.due_date,
            scheduled: entry.scheduled,
            estimate_min: entry.estimate_minutes.or(entry.duration_minutes),
            tags: entry.tags.clone(),
            links: entry.links.clone(),
            ..TaskDraft::default()
        };
        self.create_task(draft)
    }

    /// Quick-add an event from parsed text. Needs a schedule.
    ///
    /// The end is the parsed due time, else the start plus the parsed
    /// duration, else one hour later.
    pub fn create_event_from_entry(&mut self, entry: &QuickEntry) -> Option<Event> {
        let Some(start) = entry.scheduled else {
            log::debug!("Quick entry {:?} has no schedule", entry.clean_title);
            return None;
        };
        let end = match entry.block_end() {
            Some(end) => end,
            None if entry.all_day => start + Duration::days(1),
            None => start + Duration::hours(1),
        };

        let mut draft = EventDraft::new(start, end);
        draft.title = Some(entry.clean_title.clone());
        draft.all_day = entry.all_day;
        draft.tags = entry.tags.clone();
        Some(self.create_event(draft))
    }

    /// Put a block for a task on the calendar and mark the task scheduled.
    pub fn schedule_task_block(
        &mut self,
        task_id: &str,
        start: DateTime<Utc>,
        minutes: u32,
    ) -> Option<Event> {
        let task = self.get_task(task_id)?;
        let mut draft = EventDraft::new(start, start + Duration::minutes(minutes as i64));
        draft.title = Some(task.title.clone());
        draft.tags = task.tags.clone();
        draft.source = EventSource::TaskBlock;
        draft.linked_task_id = Some(task.id.clone());

        let event = self.create_event(draft);
        self.update_task(
            task_id,
            TaskPatch {
                scheduled: Some(Some(start)),
                ..TaskPatch::default()
            },
        );
        Some(event)
    }

    /// Turn a text selection from a document into an event.
    ///
    /// The first non-empty line, cut to 80 characters, is the title and the
    /// whole selection is kept as description.
    pub fn create_event_from_selection(
        &mut self,
        text: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        document_id: &str,
    ) -> Event {
        let title: Option<String> = text
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|line| line.chars().take(SELECTION_TITLE_LIMIT).collect());

        let mut draft = EventDraft::new(start, end);
        draft.title = title;
        draft.description = Some(text.trim().to_string()).filter(|d| !d.is_empty());
        draft.source = EventSource::FromSelection;
        if !document_id.trim().is_empty() {
            draft
                .meta
                .insert(DOCUMENT_ID_KEY.to_string(), document_id.trim().to_string());
        }
        self.create_event(draft)
    }

    /// Merge decoded ICS events, updating records with a matching id in place.
    ///
    /// Returns how many events were inserted or updated.
    pub fn import_events(&mut self, events: Vec<Event>) -> usize {
        let mut touched = 0;
        for incoming in events {
            if self.get_event(&incoming.id).is_some() {
                let patch = EventPatch {
                    title: Some(incoming.title),
                    description: Some(incoming.description),
                    start: Some(incoming.start),
                    end: Some(incoming.end),
                    all_day: Some(incoming.all_day),
                    ..EventPatch::default()
                };
                if let Some(event) = self.update_event(&incoming.id, patch) {
                    if let Some(stored) = self.event_mut(&event.id) {
                        stored.source = EventSource::ImportedIcs;
                    }
                    touched += 1;
                }
            } else {
                let mut draft = EventDraft::new(incoming.start, incoming.end);
                draft.id = Some(incoming.id);
                draft.title = Some(incoming.title);
                draft.description = incoming.description;
                draft.all_day = incoming.all_day;
                draft.source = EventSource::ImportedIcs;
                draft.tags = incoming.tags;
                draft.meta = incoming.meta;
                self.create_event(draft);
                touched += 1;
            }
        }
        log::info!("Imported {} event(s) into the store", touched);
        touched
    }
}
