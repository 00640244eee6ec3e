// Settings module
// Scheduling preferences loaded from settings.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::utils::grid::MINUTES_PER_DAY;

pub const DEFAULT_CALENDAR_NAME: &str = "Rust Planner";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Minutes between time-grid lines.
    pub grid_step_minutes: u32,
    /// First working hour of the day (inclusive).
    pub day_start_hour: u32,
    /// Last working hour of the day (exclusive). 24 means midnight.
    pub day_end_hour: u32,
    /// Length in minutes of events created without an explicit end.
    pub default_event_duration: u32,
    /// Name written into exported calendars.
    pub calendar_name: String,
    /// Location of the SQLite file. Defaults to the platform data dir.
    pub database_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            grid_step_minutes: 15,
            day_start_hour: 9,
            day_end_hour: 18,
            default_event_duration: 60,
            calendar_name: DEFAULT_CALENDAR_NAME.to_string(),
            database_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("grid step must divide a day evenly, got {0} minutes")]
    InvalidGridStep(u32),
    #[error("working hours must lie within 0..=24, got {start}..{end}")]
    HourOutOfRange { start: u32, end: u32 },
    #[error("working day must start before it ends, got {start}..{end}")]
    EmptyWorkingDay { start: u32, end: u32 },
    #[error("default event duration must be positive")]
    ZeroDuration,
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let step = self.grid_step_minutes;
        if step == 0 || step > MINUTES_PER_DAY || MINUTES_PER_DAY % step != 0 {
            return Err(SettingsError::InvalidGridStep(step));
        }

        let (start, end) = (self.day_start_hour, self.day_end_hour);
        if start > 24 || end > 24 {
            return Err(SettingsError::HourOutOfRange { start, end });
        }
        if start >= end {
            return Err(SettingsError::EmptyWorkingDay { start, end });
        }

        if self.default_event_duration == 0 {
            return Err(SettingsError::ZeroDuration);
        }

        Ok(())
    }
}
