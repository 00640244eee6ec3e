//! Task model.
//!
//! Tasks carry a loose status lifecycle (any transition is allowed), an
//! optional calendar placement and a single time-tracking session marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::event::{new_id, normalize_tags};

/// Title given to tasks created without one.
pub const DEFAULT_TASK_TITLE: &str = "Untitled Task";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    Blocked,
    Done,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Done => "done",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "blocked" => Some(TaskStatus::Blocked),
            "done" => Some(TaskStatus::Done),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }

    /// `done` and `cancelled` end the lifecycle, though a user may reopen them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Med,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Med => "med",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(TaskPriority::Low),
            "med" | "medium" => Some(TaskPriority::Med),
            "high" => Some(TaskPriority::High),
            "urgent" => Some(TaskPriority::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    /// Placement on the calendar.
    pub scheduled: Option<DateTime<Utc>>,
    pub estimate_min: Option<u32>,
    pub spent_min: u32,
    pub tags: Vec<String>,
    /// Ids of related entities, including the document a task was captured from.
    pub links: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub archived: bool,
    /// Start of the running time-tracking session, if any.
    pub timer_start_time: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_timer_running(&self) -> bool {
        self.timer_start_time.is_some()
    }

    /// Whole minutes of the running session at `now` (0 when idle).
    pub fn running_minutes(&self, now: DateTime<Utc>) -> u32 {
        match self.timer_start_time {
            Some(started) if now > started => {
                u32::try_from((now - started).num_minutes()).unwrap_or(u32::MAX)
            }
            _ => 0,
        }
    }

    /// Tracked time including the running session, for periodic display refresh.
    pub fn live_spent_minutes(&self, now: DateTime<Utc>) -> u32 {
        self.spent_min.saturating_add(self.running_minutes(now))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().trim_start_matches('#');
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(wanted))
    }

    /// Change status, keeping `completed_at` in step with `done`.
    pub(crate) fn set_status(&mut self, status: TaskStatus, now: DateTime<Utc>) {
        if status == TaskStatus::Done && self.status != TaskStatus::Done {
            self.completed_at = Some(now);
        } else if status != TaskStatus::Done {
            self.completed_at = None;
        }
        self.status = status;
    }

    /// Fold the running session into `spent_min` and clear the marker.
    pub(crate) fn stop_timer(&mut self, now: DateTime<Utc>) -> u32 {
        let elapsed = self.running_minutes(now);
        self.spent_min = self.spent_min.saturating_add(elapsed);
        self.timer_start_time = None;
        elapsed
    }

    pub(crate) fn apply(&mut self, patch: TaskPatch, now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = normalize_title(Some(title));
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(due) = patch.due_date {
            self.due_date = due;
        }
        if let Some(scheduled) = patch.scheduled {
            self.scheduled = scheduled;
        }
        if let Some(estimate) = patch.estimate_min {
            self.estimate_min = estimate;
        }
        if let Some(spent) = patch.spent_min {
            self.spent_min = spent;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(links) = patch.links {
            self.links = normalize_links(links);
        }
        if let Some(archived) = patch.archived {
            self.archived = archived;
        }
        if let Some(status) = patch.status {
            self.set_status(status, now);
        }
        self.updated_at = now;
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<DateTime<Utc>>,
    pub scheduled: Option<DateTime<Utc>>,
    pub estimate_min: Option<u32>,
    pub tags: Vec<String>,
    pub links: Vec<String>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub(crate) fn into_task(self, now: DateTime<Utc>) -> Task {
        let mut task = Task {
            id: new_id(),
            title: normalize_title(self.title),
            description: self.description,
            status: TaskStatus::Todo,
            priority: self.priority,
            due_date: self.due_date,
            scheduled: self.scheduled,
            estimate_min: self.estimate_min,
            spent_min: 0,
            tags: normalize_tags(self.tags),
            links: normalize_links(self.links),
            created_at: now,
            updated_at: now,
            completed_at: None,
            archived: false,
            timer_start_time: None,
        };
        task.set_status(self.status, now);
        task
    }
}

/// Partial update for a task; `Some(None)` clears clearable fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<Option<DateTime<Utc>>>,
    pub scheduled: Option<Option<DateTime<Utc>>>,
    pub estimate_min: Option<Option<u32>>,
    pub spent_min: Option<u32>,
    pub tags: Option<Vec<String>>,
    pub links: Option<Vec<String>>,
    pub archived: Option<bool>,
}

fn normalize_title(title: Option<String>) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => title.trim().to_string(),
        _ => DEFAULT_TASK_TITLE.to_string(),
    }
}

fn normalize_links(links: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(links.len());
    for link in links {
        let link = link.trim().to_string();
        if !link.is_empty() && !out.contains(&link) {
            out.push(link);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, h, m, 0).unwrap()
    }

    #[test]
    fn test_draft_defaults() {
        let task = TaskDraft::default().into_task(at(9, 0));
        assert_eq!(task.title, DEFAULT_TASK_TITLE);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Med);
        assert_eq!(task.spent_min, 0);
        assert!(!task.archived);
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_draft_created_done_is_stamped() {
        let draft = TaskDraft {
            status: TaskStatus::Done,
            ..TaskDraft::titled("Ship it")
        };
        let task = draft.into_task(at(9, 0));
        assert_eq!(task.completed_at, Some(at(9, 0)));
    }

    #[test]
    fn test_status_done_stamps_and_reopen_clears() {
        let mut task = TaskDraft::titled("Write").into_task(at(9, 0));
        task.set_status(TaskStatus::Done, at(10, 0));
        assert_eq!(task.completed_at, Some(at(10, 0)));

        // Setting done again keeps the first stamp
        task.set_status(TaskStatus::Done, at(11, 0));
        assert_eq!(task.completed_at, Some(at(10, 0)));

        task.set_status(TaskStatus::Todo, at(12, 0));
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn test_running_minutes_floors() {
        let mut task = TaskDraft::titled("Focus").into_task(at(9, 0));
        task.timer_start_time = Some(at(9, 0));
        assert_eq!(task.running_minutes(at(9, 0) + Duration::seconds(119)), 1);
        assert_eq!(task.running_minutes(at(8, 0)), 0);

        task.spent_min = 10;
        assert_eq!(task.live_spent_minutes(at(9, 30)), 40);
        assert_eq!(task.stop_timer(at(9, 30)), 30);
        assert_eq!(task.spent_min, 40);
        assert!(!task.is_timer_running());
    }

    #[test]
    fn test_patch_normalizes_links_and_tags() {
        let mut task = TaskDraft::titled("Read").into_task(at(9, 0));
        task.apply(
            TaskPatch {
                tags: Some(vec!["#a".into(), "A".into(), "b".into()]),
                links: Some(vec!["doc-1".into(), " doc-1 ".into(), "".into()]),
                scheduled: Some(Some(at(14, 0))),
                ..TaskPatch::default()
            },
            at(9, 5),
        );
        assert_eq!(task.tags, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(task.links, vec!["doc-1".to_string()]);
        assert_eq!(task.scheduled, Some(at(14, 0)));
        assert_eq!(task.updated_at, at(9, 5));
    }

    #[test]
    fn test_priority_parse_accepts_medium() {
        assert_eq!(TaskPriority::parse("medium"), Some(TaskPriority::Med));
        assert_eq!(TaskPriority::parse("med"), Some(TaskPriority::Med));
        assert!(TaskPriority::Urgent > TaskPriority::High);
    }
}
