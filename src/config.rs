use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDate, Utc};
use log::{debug, error};
use serde::{Deserialize, Serialize};

use crate::{BoomerangError, Result};

/// Options file name inside the user's home directory.
pub const OPTIONS_FILE: &str = ".boomerang_options.json";

/// Application configuration settings, persisted as one JSON record.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Options {
    /// Directory where idea files are stored
    pub ideas_folder: Option<PathBuf>,

    /// Directory receiving dated backup snapshots
    pub backup_folder: Option<PathBuf>,

    /// Minimum number of days between two backup snapshots
    pub backup_interval_days: u32,

    /// Calendar date of the last completed backup
    pub last_backup_date: Option<NaiveDate>,

    /// Exact time of the last completed backup, used for debouncing
    pub last_backup_time: Option<DateTime<Utc>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ideas_folder: None,
            backup_folder: None,
            backup_interval_days: 7,
            last_backup_date: None,
            last_backup_time: None,
        }
    }
}

impl Options {
    /// The fixed per-user options file path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(OPTIONS_FILE)
    }

    /// Loads options from `path`. A missing file yields the defaults; a
    /// malformed file is an error the caller degrades to defaults after
    /// surfacing it.
    pub fn load_from(path: &Path) -> Result<Options> {
        if !path.exists() {
            debug!("No options file at {}, using defaults", path.display());
            return Ok(Options::default());
        }
        let raw = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read options file {}: {}", path.display(), e);
            BoomerangError::Io(e)
        })?;
        let options: Options = serde_json::from_str(&raw).map_err(|e| {
            error!("Failed to parse options file {}: {}", path.display(), e);
            BoomerangError::ConfigError {
                message: format!("Malformed options file {}: {}", path.display(), e),
            }
        })?;
        debug!("Loaded options: {:?}", options);
        Ok(options)
    }

    /// Persists the whole record to `path`, overwriting the previous
    /// contents. The write is not atomic; a crash mid-write can corrupt the
    /// file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| {
            error!("Failed to save options to {}: {}", path.display(), e);
            BoomerangError::Io(e)
        })?;
        debug!("Saved options: {:?}", self);
        Ok(())
    }
}
