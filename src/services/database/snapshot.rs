use anyhow::{Context, Result};
use rusqlite::{params, Row};

use super::shared::{from_json, to_json, to_optional_utc, to_utc_datetime, unknown_value};
use super::Database;
use crate::models::event::{Event, EventSource};
use crate::models::task::{Task, TaskPriority, TaskStatus};
use crate::services::store::Store;
use crate::utils::clock::Clock;

impl Database {
    /// Replace the stored collections with the store's contents in one transaction.
    pub fn save_store(&self, store: &Store) -> Result<()> {
        let tx = self
            .connection()
            .unchecked_transaction()
            .context("Failed to begin snapshot transaction")?;

        tx.execute("DELETE FROM events", [])
            .context("Failed to clear events")?;
        tx.execute("DELETE FROM tasks", [])
            .context("Failed to clear tasks")?;

        {
            let mut insert_event = tx.prepare(
                "INSERT INTO events (
                    id, title, description, start_datetime, end_datetime, is_all_day,
                    source, linked_task_id, tags, meta, recurrence_rule, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for event in store.events() {
                insert_event
                    .execute(params![
                        event.id,
                        event.title,
                        event.description,
                        event.start.to_rfc3339(),
                        event.end.to_rfc3339(),
                        event.all_day as i32,
                        event.source.as_str(),
                        event.linked_task_id,
                        to_json(&event.tags)?,
                        to_json(&event.meta)?,
                        event.recurrence_rule,
                        event.created_at.to_rfc3339(),
                        event.updated_at.to_rfc3339(),
                    ])
                    .with_context(|| format!("Failed to insert event {}", event.id))?;
            }

            let mut insert_task = tx.prepare(
                "INSERT INTO tasks (
                    id, title, description, status, priority, due_date, scheduled,
                    estimate_min, spent_min, tags, links, created_at, updated_at,
                    completed_at, archived, timer_start_time
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for task in store.tasks() {
                insert_task
                    .execute(params![
                        task.id,
                        task.title,
                        task.description,
                        task.status.as_str(),
                        task.priority.as_str(),
                        task.due_date.map(|dt| dt.to_rfc3339()),
                        task.scheduled.map(|dt| dt.to_rfc3339()),
                        task.estimate_min,
                        task.spent_min,
                        to_json(&task.tags)?,
                        to_json(&task.links)?,
                        task.created_at.to_rfc3339(),
                        task.updated_at.to_rfc3339(),
                        task.completed_at.map(|dt| dt.to_rfc3339()),
                        task.archived as i32,
                        task.timer_start_time.map(|dt| dt.to_rfc3339()),
                    ])
                    .with_context(|| format!("Failed to insert task {}", task.id))?;
            }
        }

        tx.commit().context("Failed to commit snapshot")?;
        log::info!(
            "Saved {} event(s) and {} task(s)",
            store.events().len(),
            store.tasks().len()
        );
        Ok(())
    }

    /// Rebuild a store from the stored collections.
    pub fn load_store(&self, clock: impl Clock + 'static) -> Result<Store> {
        let events = self.load_events()?;
        let tasks = self.load_tasks()?;
        log::info!("Loaded {} event(s) and {} task(s)", events.len(), tasks.len());
        Ok(Store::from_parts(events, tasks, clock))
    }

    fn load_events(&self) -> Result<Vec<Event>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, title, description, start_datetime, end_datetime, is_all_day,
                    source, linked_task_id, tags, meta, recurrence_rule, created_at, updated_at
             FROM events
             ORDER BY rowid ASC",
        )?;

        let events = stmt
            .query_map([], map_event_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read events")?;

        Ok(events)
    }

    fn load_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, title, description, status, priority, due_date, scheduled,
                    estimate_min, spent_min, tags, links, created_at, updated_at,
                    completed_at, archived, timer_start_time
             FROM tasks
             ORDER BY rowid ASC",
        )?;

        let tasks = stmt
            .query_map([], map_task_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read tasks")?;

        Ok(tasks)
    }
}

fn map_event_row(row: &Row) -> rusqlite::Result<Event> {
    let source: String = row.get(6)?;
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        start: to_utc_datetime(row.get(3)?)?,
        end: to_utc_datetime(row.get(4)?)?,
        all_day: row.get::<_, i32>(5)? != 0,
        source: EventSource::parse(&source).ok_or_else(|| unknown_value(6, "source"))?,
        linked_task_id: row.get(7)?,
        tags: from_json(row.get(8)?)?,
        meta: from_json(row.get(9)?)?,
        recurrence_rule: row.get(10)?,
        created_at: to_utc_datetime(row.get(11)?)?,
        updated_at: to_utc_datetime(row.get(12)?)?,
    })
}

fn map_task_row(row: &Row) -> rusqlite::Result<Task> {
    let status: String = row.get(3)?;
    let priority: String = row.get(4)?;
    Ok(Task {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: TaskStatus::parse(&status).ok_or_else(|| unknown_value(3, "status"))?,
        priority: TaskPriority::parse(&priority).ok_or_else(|| unknown_value(4, "priority"))?,
        due_date: to_optional_utc(row.get(5)?)?,
        scheduled: to_optional_utc(row.get(6)?)?,
        estimate_min: row.get(7)?,
        spent_min: row.get(8)?,
        tags: from_json(row.get(9)?)?,
        links: from_json(row.get(10)?)?,
        created_at: to_utc_datetime(row.get(11)?)?,
        updated_at: to_utc_datetime(row.get(12)?)?,
        completed_at: to_optional_utc(row.get(13)?)?,
        archived: row.get::<_, i32>(14)? != 0,
        timer_start_time: to_optional_utc(row.get(15)?)?,
    })
}
