//! In-memory owner of the event and task collections.
//!
//! Every write goes through here so the model invariants hold for anything
//! handed out: `start < end` on events, `completed_at` in step with `done`,
//! and at most one running task timer. Lookups of unknown ids are no-ops
//! that return `None` and leave state untouched.
//!
//! Operations are split across submodules:
//! - `events`: event CRUD and time-range queries
//! - `tasks`: task CRUD, status, timers and archiving
//! - `capture`: quick entry, selection capture, task blocks and ICS import

use chrono::{DateTime, Utc};

use crate::models::event::Event;
use crate::models::task::Task;
use crate::utils::clock::{Clock, SystemClock};

mod capture;
mod events;
mod tasks;

/// Canonical collections of events and tasks.
pub struct Store {
    events: Vec<Event>,
    tasks: Vec<Task>,
    clock: Box<dyn Clock>,
}

impl Store {
    /// Empty store on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Empty store reading time from `clock`.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::from_parts(Vec::new(), Vec::new(), clock)
    }

    /// Rebuild a store from persisted collections.
    ///
    /// Ranges are repaired on the way in. If more than one task claims a
    /// running timer, only the most recently started one keeps it.
    pub fn from_parts(
        mut events: Vec<Event>,
        mut tasks: Vec<Task>,
        clock: impl Clock + 'static,
    ) -> Self {
        for event in &mut events {
            event.end = crate::models::event::repair_end(event.start, event.end);
        }

        let latest_timer = tasks
            .iter()
            .filter_map(|task| task.timer_start_time.map(|at| (at, task.id.clone())))
            .max();
        if let Some((_, keep)) = latest_timer {
            for task in tasks.iter_mut().filter(|task| task.id != keep) {
                if task.timer_start_time.take().is_some() {
                    log::warn!("Dropping stale timer on task {}", task.id);
                }
            }
        }

        Self {
            events,
            tasks,
            clock: Box::new(clock),
        }
    }

    /// Current instant according to the store's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// All events, in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// All tasks, in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty() && self.tasks.is_empty()
    }

    fn event_mut(&mut self, id: &str) -> Option<&mut Event> {
        let found = self.events.iter_mut().find(|event| event.id == id);
        if found.is_none() {
            log::debug!("No event with id {}", id);
        }
        found
    }

    fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        let found = self.tasks.iter_mut().find(|task| task.id == id);
        if found.is_none() {
            log::debug!("No task with id {}", id);
        }
        found
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("events", &self.events.len())
            .field("tasks", &self.tasks.len())
            .finish()
    }
}
