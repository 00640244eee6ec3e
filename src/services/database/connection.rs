use anyhow::{Context, Result};
use rusqlite::Connection;
use std::path::Path;

use super::schema;

/// SQLite connection holding the planner snapshot.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens the planner file, creating it and its parent directory on first use.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create database directory {:?}", parent))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open planner database {:?}", path))?;
        log::debug!("Opened planner database {:?}", path);
        Self::configure(conn)
    }

    /// Throwaway database for tests and dry runs.
    ///
    /// ```
    /// use rust_planner::services::database::Database;
    /// let db = Database::in_memory().unwrap();
    /// db.initialize_schema().unwrap();
    /// ```
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", true)
            .context("Failed to enable foreign keys")?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Creates the events and tasks tables and adds any missing columns.
    pub fn initialize_schema(&self) -> Result<()> {
        schema::initialize_schema(&self.conn)
    }
}
