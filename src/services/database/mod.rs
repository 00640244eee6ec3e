// Database service module
// SQLite snapshot of the planner's events and tasks

mod connection;
mod migrations;
mod schema;
mod shared;
mod snapshot;

pub use connection::Database;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::{Event, EventSource};
    use crate::models::task::{TaskDraft, TaskPriority, TaskStatus};
    use crate::services::store::Store;
    use crate::utils::clock::FixedClock;
    use chrono::{DateTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    fn setup_test_db() -> Database {
        let db = Database::in_memory().unwrap();
        db.initialize_schema().unwrap();
        db
    }

    fn table_exists(db: &Database, name: &str) -> bool {
        let count: i64 = db
            .connection()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
                |row| row.get(0),
            )
            .unwrap();
        count == 1
    }

    #[test]
    fn test_new_database_with_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("nested").join("test.db");

        let result = Database::open(&db_path);
        assert!(result.is_ok(), "Should create file-based database");
        assert!(Path::new(&db_path).exists(), "Database file should exist");
    }

    #[test]
    fn test_initialize_schema_is_repeatable() {
        let db = setup_test_db();
        db.initialize_schema().unwrap();

        assert!(table_exists(&db, "events"));
        assert!(table_exists(&db, "tasks"));
        assert!(migrations::column_exists(db.connection(), "events", "recurrence_rule").unwrap());
        assert!(migrations::column_exists(db.connection(), "tasks", "timer_start_time").unwrap());
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let db = Database::in_memory().unwrap();
        let enabled: i64 = db
            .connection()
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1, "Foreign keys should be enabled");
    }

    #[test]
    fn test_snapshot_round_trip() {
        let db = setup_test_db();
        let mut store = Store::with_clock(FixedClock::new(now()));

        let mut task = TaskDraft::titled("Write report");
        task.priority = TaskPriority::High;
        task.tags = vec!["work".into()];
        task.links = vec!["doc-1".into()];
        let task = store.create_task(task);
        store.set_task_status(&task.id, TaskStatus::Done);
        let other = store.create_task(TaskDraft::titled("Timer"));
        store.start_timer(&other.id);

        store.create_event(
            Event::builder()
                .title("Standup")
                .description("Daily")
                .start(now())
                .end(now() + chrono::Duration::minutes(15))
                .tag("team")
                .meta("document_id", "doc-1")
                .recurrence_rule("FREQ=DAILY")
                .build(),
        );
        store.schedule_task_block(&task.id, now(), 60);

        db.save_store(&store).unwrap();
        let loaded = db.load_store(FixedClock::new(now())).unwrap();

        assert_eq!(loaded.events(), store.events());
        assert_eq!(loaded.tasks(), store.tasks());
        assert_eq!(loaded.events()[1].source, EventSource::TaskBlock);
        assert_eq!(loaded.active_timer().map(|t| t.id.clone()), Some(other.id));
    }

    #[test]
    fn test_save_replaces_previous_snapshot() {
        let db = setup_test_db();
        let mut store = Store::with_clock(FixedClock::new(now()));
        let task = store.create_task(TaskDraft::titled("Temporary"));
        db.save_store(&store).unwrap();

        store.delete_task(&task.id);
        db.save_store(&store).unwrap();

        let loaded = db.load_store(FixedClock::new(now())).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        let db = setup_test_db();
        db.connection()
            .execute(
                "INSERT INTO tasks (id, title, status, created_at, updated_at)
                 VALUES ('t1', 'Bad', 'someday', ?1, ?1)",
                [now().to_rfc3339()],
            )
            .unwrap();

        assert!(db.load_store(FixedClock::new(now())).is_err());
    }
}
