use crate::models::settings::Settings;
use anyhow::{anyhow, Context, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.toml";
const DATABASE_FILE: &str = "planner.db";

/// Reads and writes `settings.toml`.
pub struct SettingsService {
    path: PathBuf,
}

impl SettingsService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service bound to the platform config directory.
    pub fn from_project_dirs() -> Result<Self> {
        let dirs = project_dirs()?;
        Ok(Self::new(dirs.config_dir().join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate settings from disk.
    pub fn load(&self) -> Result<Settings> {
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings file: {:?}", self.path))?;
        let settings: Settings = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse settings file: {:?}", self.path))?;
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file is missing or bad.
    pub fn load_or_default(&self) -> Settings {
        if !self.path.exists() {
            log::info!("No settings file at {:?}, using defaults", self.path);
            return Settings::default();
        }
        match self.load() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings: {:#}, using defaults", e);
                Settings::default()
            }
        }
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        settings
            .validate()
            .map_err(|e| anyhow!("Invalid settings: {}", e))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }
        let raw = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write settings file: {:?}", self.path))?;
        Ok(())
    }

    /// Database location: the configured path, else the platform data dir.
    pub fn resolve_database_path(settings: &Settings) -> Result<PathBuf> {
        if let Some(path) = &settings.database_path {
            return Ok(path.clone());
        }
        let dirs = project_dirs()?;
        let data_dir = dirs.data_dir();
        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {:?}", data_dir))?;
        Ok(data_dir.join(DATABASE_FILE))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "RustPlanner", "RustPlanner")
        .ok_or_else(|| anyhow!("Failed to determine project directories"))
}
