use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_events_table(conn)?;
    run_events_migrations(conn)?;
    create_tasks_table(conn)?;
    run_tasks_migrations(conn)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_events_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            start_datetime TEXT NOT NULL,
            end_datetime TEXT NOT NULL,
            is_all_day INTEGER NOT NULL DEFAULT 0,
            source TEXT NOT NULL DEFAULT 'manual',
            linked_task_id TEXT,
            tags TEXT NOT NULL DEFAULT '[]',
            meta TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create events table")?;

    Ok(())
}

fn run_events_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "events",
        "recurrence_rule",
        "ALTER TABLE events ADD COLUMN recurrence_rule TEXT",
    )
}

fn create_tasks_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tasks (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL DEFAULT 'todo',
            priority TEXT NOT NULL DEFAULT 'med',
            due_date TEXT,
            scheduled TEXT,
            estimate_min INTEGER,
            spent_min INTEGER NOT NULL DEFAULT 0,
            tags TEXT NOT NULL DEFAULT '[]',
            links TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            completed_at TEXT,
            archived INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )
    .context("Failed to create tasks table")?;

    Ok(())
}

fn run_tasks_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "tasks",
        "timer_start_time",
        "ALTER TABLE tasks ADD COLUMN timer_start_time TEXT",
    )
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_datetime)",
        [],
    )
    .context("Failed to create events start index")?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tasks_scheduled ON tasks(scheduled)",
        [],
    )
    .context("Failed to create tasks scheduled index")?;

    Ok(())
}
