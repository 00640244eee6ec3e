use super::{export, import};
use crate::models::event::Event;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::Path;

/// Serialize events as an iCalendar document, stamped with the current time.
pub fn to_ics(events: &[Event], calendar_name: &str) -> String {
    export::calendar(events, calendar_name, Utc::now())
}

/// Like [`to_ics`] with an explicit `DTSTAMP`.
pub fn to_ics_at(events: &[Event], calendar_name: &str, stamp: DateTime<Utc>) -> String {
    export::calendar(events, calendar_name, stamp)
}

/// Decode the well-formed events of an iCalendar document.
///
/// Blocks missing a title, start or end are dropped. Every event comes back
/// tagged as imported, keeping its UID as id when one is present.
pub fn from_ics(content: &str) -> Vec<Event> {
    import::events(content, Utc::now())
}

/// Like [`from_ics`] with an explicit creation stamp.
pub fn from_ics_at(content: &str, now: DateTime<Utc>) -> Vec<Event> {
    import::events(content, now)
}

/// Service for importing and exporting iCalendar (.ics) files
pub struct ICalendarService {
    calendar_name: String,
}

impl ICalendarService {
    /// Create a new ICalendarService writing `X-WR-CALNAME:<calendar_name>`
    pub fn new(calendar_name: impl Into<String>) -> Self {
        Self {
            calendar_name: calendar_name.into(),
        }
    }

    pub fn calendar_name(&self) -> &str {
        &self.calendar_name
    }

    /// Export events to an iCalendar formatted string
    pub fn export_events(&self, events: &[Event]) -> String {
        to_ics(events, &self.calendar_name)
    }

    /// Import events from an iCalendar formatted string
    pub fn import_events(&self, ics_content: &str) -> Vec<Event> {
        from_ics(ics_content)
    }

    /// Import events from a .ics file on disk
    pub fn import_from_file(&self, path: &Path) -> Result<Vec<Event>> {
        let content =
            fs::read_to_string(path).context(format!("Failed to read .ics file: {:?}", path))?;
        let events = self.import_events(&content);
        log::info!("Imported {} event(s) from {:?}", events.len(), path);
        Ok(events)
    }

    /// Import events from a .ics file without blocking the runtime
    pub async fn import_from_file_async(&self, path: &Path) -> Result<Vec<Event>> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read .ics file: {:?}", path))?;
        let events = self.import_events(&content);
        log::info!("Imported {} event(s) from {:?}", events.len(), path);
        Ok(events)
    }

    /// Export events to a .ics file on disk
    pub fn export_to_file(&self, events: &[Event], path: &Path) -> Result<()> {
        let content = self.export_events(events);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Failed to create directory: {:?}", parent))?;
        }
        fs::write(path, content).context(format!("Failed to write .ics file: {:?}", path))?;
        log::info!("Exported {} event(s) to {:?}", events.len(), path);
        Ok(())
    }
}

impl Default for ICalendarService {
    fn default() -> Self {
        Self::new(crate::models::settings::DEFAULT_CALENDAR_NAME)
    }
}
