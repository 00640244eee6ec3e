use chrono::{DateTime, Utc};

use super::Store;
use crate::models::task::{Task, TaskDraft, TaskPatch, TaskStatus};

impl Store {
    pub fn create_task(&mut self, draft: TaskDraft) -> Task {
        let task = draft.into_task(self.now());
        self.tasks.push(task.clone());
        task
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Apply a partial update. Archiving through a patch stops the timer first.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Option<Task> {
        let now = self.now();
        let task = self.task_mut(id)?;
        if patch.archived == Some(true) && task.is_timer_running() {
            task.stop_timer(now);
        }
        task.apply(patch, now);
        Some(task.clone())
    }

    /// Remove a task and unlink the events that pointed at it.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            log::debug!("Ignoring delete of unknown task {}", id);
            return None;
        };
        let task = self.tasks.remove(index);

        let now = self.now();
        for event in self
            .events
            .iter_mut()
            .filter(|event| event.linked_task_id.as_deref() == Some(id))
        {
            event.linked_task_id = None;
            event.updated_at = now;
        }
        Some(task)
    }

    /// Move a task to `status`. Any transition is allowed.
    pub fn set_task_status(&mut self, id: &str, status: TaskStatus) -> Option<Task> {
        self.update_task(
            id,
            TaskPatch {
                status: Some(status),
                ..TaskPatch::default()
            },
        )
    }

    /// Start tracking time on a task.
    ///
    /// Any other running timer is stopped first, its elapsed minutes folded
    /// into its `spent_min`. Starting the task that is already running only
    /// refreshes its start stamp.
    pub fn start_timer(&mut self, id: &str) -> Option<Task> {
        self.get_task(id)?;
        let now = self.now();

        for other in self
            .tasks
            .iter_mut()
            .filter(|task| task.id != id && task.is_timer_running())
        {
            let folded = other.stop_timer(now);
            other.updated_at = now;
            log::debug!("Stopped timer on {} after {} min", other.id, folded);
        }

        let task = self.task_mut(id)?;
        task.timer_start_time = Some(now);
        task.updated_at = now;
        Some(task.clone())
    }

    /// Stop a running timer, folding whole elapsed minutes into `spent_min`.
    ///
    /// A task without a running timer comes back unchanged.
    pub fn stop_timer(&mut self, id: &str) -> Option<Task> {
        let now = self.now();
        let task = self.task_mut(id)?;
        if task.is_timer_running() {
            task.stop_timer(now);
            task.updated_at = now;
        }
        Some(task.clone())
    }

    /// Start the timer if it is idle, stop it if it is running.
    pub fn toggle_timer(&mut self, id: &str) -> Option<Task> {
        if self.get_task(id)?.is_timer_running() {
            self.stop_timer(id)
        } else {
            self.start_timer(id)
        }
    }

    /// The task whose timer is running, if any.
    pub fn active_timer(&self) -> Option<&Task> {
        self.tasks.iter().find(|task| task.is_timer_running())
    }

    /// Archive a batch of tasks, stopping their timers. Returns how many changed.
    pub fn archive_tasks<I, S>(&mut self, ids: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = self.now();
        let mut changed = 0;
        for id in ids {
            let Some(task) = self.task_mut(id.as_ref()) else {
                continue;
            };
            if task.archived {
                continue;
            }
            if task.is_timer_running() {
                task.stop_timer(now);
            }
            task.archived = true;
            task.updated_at = now;
            changed += 1;
        }
        changed
    }

    pub fn unarchive_task(&mut self, id: &str) -> Option<Task> {
        self.update_task(
            id,
            TaskPatch {
                archived: Some(false),
                ..TaskPatch::default()
            },
        )
    }

    /// Tasks whose `scheduled` instant lies in `[start, end)`, ordered by it.
    pub fn tasks_scheduled_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<&Task> {
        let mut found: Vec<&Task> = self
            .tasks
            .iter()
            .filter(|task| matches!(task.scheduled, Some(at) if at >= start && at < end))
            .collect();
        found.sort_by_key(|task| task.scheduled);
        found
    }

    pub fn tasks_with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.tasks.iter().filter(|task| task.status == status).collect()
    }
}
