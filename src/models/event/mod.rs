// Event module
// Calendar event model with provenance tracking and range repair

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Title given to events created without one.
pub const DEFAULT_EVENT_TITLE: &str = "Untitled Event";

/// Where an event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    Manual,
    /// Scheduled block for a task.
    TaskBlock,
    ImportedIcs,
    /// Captured from text selected in a document.
    FromSelection,
}

impl EventSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventSource::Manual => "manual",
            EventSource::TaskBlock => "task_block",
            EventSource::ImportedIcs => "imported_ics",
            EventSource::FromSelection => "from_selection",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "manual" => Some(EventSource::Manual),
            "task_block" => Some(EventSource::TaskBlock),
            "imported_ics" => Some(EventSource::ImportedIcs),
            "from_selection" => Some(EventSource::FromSelection),
            _ => None,
        }
    }
}

/// Calendar event.
///
/// `start < end` always holds for events handed out by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub source: EventSource,
    pub linked_task_id: Option<String>,
    pub tags: Vec<String>,
    pub meta: BTreeMap<String, String>,
    pub recurrence_rule: Option<String>, // RRULE string, stored verbatim
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Create a builder for constructing event drafts
    pub fn builder() -> EventBuilder {
        EventBuilder::new()
    }

    /// Get the duration of the event
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Tag match, ignoring case and tag order
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = normalize_tag(tag);
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(&wanted))
    }

    /// Half-open overlap test against `[start, end)`
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    /// Apply a patch and repair the time range.
    pub(crate) fn apply(&mut self, patch: EventPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = normalize_title(Some(title));
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(start) = patch.start {
            self.start = start;
        }
        if let Some(end) = patch.end {
            self.end = end;
        }
        if let Some(all_day) = patch.all_day {
            self.all_day = all_day;
        }
        if let Some(linked) = patch.linked_task_id {
            self.linked_task_id = linked;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(meta) = patch.meta {
            self.meta = meta;
        }
        if let Some(rule) = patch.recurrence_rule {
            self.recurrence_rule = rule;
        }
        self.end = repair_end(self.start, self.end);
        self.updated_at = now;
    }
}

/// Input for creating an event. Everything but the times is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub all_day: bool,
    pub source: EventSource,
    pub linked_task_id: Option<String>,
    pub tags: Vec<String>,
    pub meta: BTreeMap<String, String>,
    pub recurrence_rule: Option<String>,
}

impl EventDraft {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: None,
            title: None,
            description: None,
            start,
            end,
            all_day: false,
            source: EventSource::Manual,
            linked_task_id: None,
            tags: Vec::new(),
            meta: BTreeMap::new(),
            recurrence_rule: None,
        }
    }

    /// Materialize the draft, assigning an id and repairing the range.
    pub(crate) fn into_event(self, now: DateTime<Utc>) -> Event {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(new_id);

        Event {
            id,
            title: normalize_title(self.title),
            description: self.description,
            start: self.start,
            end: repair_end(self.start, self.end),
            all_day: self.all_day,
            source: self.source,
            linked_task_id: self.linked_task_id,
            tags: normalize_tags(self.tags),
            meta: self.meta,
            recurrence_rule: self.recurrence_rule,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update for an event. `None` leaves a field untouched; for
/// clearable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub all_day: Option<bool>,
    pub linked_task_id: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub meta: Option<BTreeMap<String, String>>,
    pub recurrence_rule: Option<Option<String>>,
}

impl EventPatch {
    /// Patch that only moves the event.
    pub fn reschedule(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }
}

/// Builder for creating event drafts with optional fields
pub struct EventBuilder {
    draft: EventDraft,
}

impl EventBuilder {
    /// Create a new event builder spanning the current hour
    pub fn new() -> Self {
        let start = Utc::now();
        Self {
            draft: EventDraft::new(start, start + Duration::hours(1)),
        }
    }

    /// Use a caller-supplied id (e.g. an ICS UID)
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.draft.id = Some(id.into());
        self
    }

    /// Set the event title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.draft.title = Some(title.into());
        self
    }

    /// Set the event description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.draft.description = Some(description.into());
        self
    }

    /// Set the start time
    pub fn start(mut self, start: DateTime<Utc>) -> Self {
        self.draft.start = start;
        self
    }

    /// Set the end time
    pub fn end(mut self, end: DateTime<Utc>) -> Self {
        self.draft.end = end;
        self
    }

    /// Set as all-day event
    pub fn all_day(mut self, all_day: bool) -> Self {
        self.draft.all_day = all_day;
        self
    }

    /// Set the provenance tag
    pub fn source(mut self, source: EventSource) -> Self {
        self.draft.source = source;
        self
    }

    /// Link the event to a task
    pub fn linked_task(mut self, task_id: impl Into<String>) -> Self {
        self.draft.linked_task_id = Some(task_id.into());
        self
    }

    /// Add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.draft.tags.push(tag.into());
        self
    }

    /// Record a provenance entry
    pub fn meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.draft.meta.insert(key.into(), value.into());
        self
    }

    /// Set the recurrence rule (RRULE format)
    pub fn recurrence_rule(mut self, rule: impl Into<String>) -> Self {
        self.draft.recurrence_rule = Some(rule.into());
        self
    }

    /// Finish the draft
    pub fn build(self) -> EventDraft {
        self.draft
    }
}

impl Default for EventBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Push an empty or inverted range out to one hour.
pub fn repair_end(start: DateTime<Utc>, end: DateTime<Utc>) -> DateTime<Utc> {
    if end <= start {
        start + Duration::hours(1)
    } else {
        end
    }
}

fn normalize_title(title: Option<String>) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => DEFAULT_EVENT_TITLE.to_string(),
    }
}

pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_start_matches('#').trim().to_string()
}

/// Trim tags, strip `#`, drop empties and case-insensitive duplicates.
pub(crate) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = normalize_tag(&tag);
        if tag.is_empty() || out.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
            continue;
        }
        out.push(tag);
    }
    out
}
