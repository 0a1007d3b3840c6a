//! Filesystem-backed storage for ideas.
//!
//! One idea per text file inside the ideas folder. Deleting is a move into
//! the `deleted_ideas` subfolder, so nothing is ever erased outright.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Duration, NaiveDate};
use log::{debug, error, info, warn};

use crate::{idea_file_name, BoomerangError, Idea, Result, DATE_FORMAT, IDEA_EXTENSION};

/// Subfolder of the ideas folder holding soft-deleted ideas.
pub const DELETED_DIR: &str = "deleted_ideas";

/// Upper bound on the `_N` collision probe for one base name.
const PROBE_LIMIT: u32 = 10_000;

/// Manages the ideas folder: listing, reading, writing, deleting, postponing.
pub struct IdeaStore {
    /// Folder holding the idea files.
    ideas_dir: PathBuf,
}

impl IdeaStore {
    /// Creates a store rooted at the given ideas folder.
    pub fn new(ideas_dir: impl Into<PathBuf>) -> Self {
        Self {
            ideas_dir: ideas_dir.into(),
        }
    }

    /// The folder this store operates on.
    pub fn ideas_dir(&self) -> &Path {
        &self.ideas_dir
    }

    /// Creates the ideas folder if it does not exist yet.
    pub fn ensure_exists(&self) -> Result<()> {
        if !self.ideas_dir.exists() {
            fs::create_dir_all(&self.ideas_dir).map_err(|e| {
                error!("Failed to create ideas folder: {}", e);
                BoomerangError::DirectoryError {
                    path: self.ideas_dir.clone(),
                }
            })?;
            info!("Created ideas folder {}", self.ideas_dir.display());
        }
        Ok(())
    }

    /// Lists all ideas due on or before `today`, in ascending date order.
    ///
    /// A missing ideas folder yields an empty list. Files whose names do not
    /// carry a valid date prefix are skipped with a warning; a malformed
    /// filename never stops the scan.
    pub fn list_due(&self, today: NaiveDate) -> Result<Vec<Idea>> {
        if !self.ideas_dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.ideas_dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == IDEA_EXTENSION) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        // Alphabetical = chronological, thanks to the zero-padded date prefix.
        names.sort();

        let mut due = Vec::new();
        for name in &names {
            match Idea::from_path(self.ideas_dir.join(name)) {
                Some(idea) if idea.due_date <= today => due.push(idea),
                Some(_) => {}
                None => warn!("Invalid filename format: {}", name),
            }
        }

        debug!("Found {} due ideas", due.len());
        Ok(due)
    }

    /// Reads the whole body of an idea file.
    pub fn read(&self, path: &Path) -> Result<String> {
        let text = fs::read_to_string(path).map_err(|e| {
            error!("Failed to read idea {}: {}", path.display(), e);
            BoomerangError::Io(e)
        })?;
        debug!("Loaded idea from {}", path.display());
        Ok(text)
    }

    /// Overwrites the body of an idea file in place.
    pub fn write(&self, path: &Path, text: &str) -> Result<()> {
        fs::write(path, text).map_err(|e| {
            error!("Failed to write idea {}: {}", path.display(), e);
            BoomerangError::Io(e)
        })?;
        debug!("Saved idea to {}", path.display());
        Ok(())
    }

    /// Soft-deletes an idea by moving it into the `deleted_ideas` subfolder,
    /// creating that folder on demand.
    ///
    /// A name collision inside `deleted_ideas` picks a fresh `_N` suffix
    /// instead of overwriting the earlier soft-deleted file. Returns the new
    /// location of the file.
    pub fn delete(&self, path: &Path) -> Result<PathBuf> {
        if !path.exists() {
            return Err(BoomerangError::IdeaNotFound {
                path: path.to_path_buf(),
            });
        }

        let deleted_dir = self.ideas_dir.join(DELETED_DIR);
        fs::create_dir_all(&deleted_dir).map_err(|e| {
            error!("Failed to create {}: {}", deleted_dir.display(), e);
            BoomerangError::DirectoryError {
                path: deleted_dir.clone(),
            }
        })?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| BoomerangError::InvalidFilename {
                name: path.display().to_string(),
            })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or(IDEA_EXTENSION);

        let target = probe_free_name(&deleted_dir, stem, ext)?;
        fs::rename(path, &target)?;
        info!("Moved {} to {}", path.display(), target.display());
        Ok(target)
    }

    /// Postpones an idea by renaming it to a fresh name under `today + days`.
    ///
    /// `days` may be zero or negative; no validation is applied to the
    /// resulting date beyond calendar range.
    pub fn postpone(&self, path: &Path, days: i64, today: NaiveDate) -> Result<PathBuf> {
        if !path.exists() {
            return Err(BoomerangError::IdeaNotFound {
                path: path.to_path_buf(),
            });
        }

        let new_date = offset_date(today, days)?;
        let target = self.free_path_for(new_date)?;
        fs::rename(path, &target)?;
        info!("Postponed {} to {}", path.display(), target.display());
        Ok(target)
    }

    /// Creates a new idea due `days` from `today` and writes its body.
    pub fn create(&self, text: &str, days: i64, today: NaiveDate) -> Result<PathBuf> {
        let target_date = offset_date(today, days)?;
        let target = self.free_path_for(target_date)?;
        self.write(&target, text)?;
        info!("Created new idea {}", target.display());
        Ok(target)
    }

    /// Finds a free path for an idea due on `date`: `YYYYMMDD.txt`, then
    /// `YYYYMMDD_2.txt`, `_3`, ... up to the probe limit.
    fn free_path_for(&self, date: NaiveDate) -> Result<PathBuf> {
        let first = self.ideas_dir.join(idea_file_name(date, None));
        if !first.exists() {
            return Ok(first);
        }
        for idx in 2..=PROBE_LIMIT {
            let candidate = self.ideas_dir.join(idea_file_name(date, Some(idx)));
            if !candidate.exists() {
                return Ok(candidate);
            }
        }
        Err(BoomerangError::FilenameSpaceExhausted {
            base: date.format(DATE_FORMAT).to_string(),
            limit: PROBE_LIMIT,
        })
    }
}

fn offset_date(today: NaiveDate, days: i64) -> Result<NaiveDate> {
    Duration::try_days(days)
        .and_then(|delta| today.checked_add_signed(delta))
        .ok_or_else(|| BoomerangError::ApplicationError {
            message: format!("Date out of range: {} {:+} days", today, days),
        })
}

/// Linear `_N` probe for a free filename under `dir`.
fn probe_free_name(dir: &Path, base: &str, ext: &str) -> Result<PathBuf> {
    let first = dir.join(format!("{base}.{ext}"));
    if !first.exists() {
        return Ok(first);
    }
    for idx in 2..=PROBE_LIMIT {
        let candidate = dir.join(format!("{base}_{idx}.{ext}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }
    Err(BoomerangError::FilenameSpaceExhausted {
        base: base.to_string(),
        limit: PROBE_LIMIT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> (tempfile::TempDir, IdeaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = IdeaStore::new(dir.path());
        (dir, store)
    }

    #[test]
    fn list_due_filters_and_orders() {
        let (_dir, store) = store();
        let today = date(2025, 6, 15);

        store.write(&store.ideas_dir().join("20250615.txt"), "today").unwrap();
        store.write(&store.ideas_dir().join("20250101.txt"), "past").unwrap();
        store.write(&store.ideas_dir().join("20251231.txt"), "future").unwrap();
        store.write(&store.ideas_dir().join("shopping.txt"), "junk").unwrap();
        store.write(&store.ideas_dir().join("20250102.md"), "wrong ext").unwrap();

        let due = store.list_due(today).unwrap();
        let names: Vec<_> = due
            .iter()
            .map(|i| i.path.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["20250101.txt", "20250615.txt"]);
        assert_eq!(due[0].due_date, date(2025, 1, 1));
    }

    #[test]
    fn list_due_on_missing_folder_is_empty() {
        let store = IdeaStore::new("/nonexistent/boomerang-test-ideas");
        assert!(store.list_due(date(2025, 1, 1)).unwrap().is_empty());
    }

    #[test]
    fn create_disambiguates_without_overwriting() {
        let (_dir, store) = store();
        let today = date(2025, 6, 15);

        let first = store.create("first", 0, today).unwrap();
        let second = store.create("second", 0, today).unwrap();
        let third = store.create("third", 0, today).unwrap();

        assert_eq!(first.file_name().unwrap(), "20250615.txt");
        assert_eq!(second.file_name().unwrap(), "20250615_2.txt");
        assert_eq!(third.file_name().unwrap(), "20250615_3.txt");
        assert_eq!(store.read(&first).unwrap(), "first");
        assert_eq!(store.read(&second).unwrap(), "second");
        assert_eq!(store.read(&third).unwrap(), "third");
    }

    #[test]
    fn postpone_moves_discovery_to_the_new_date() {
        let (_dir, store) = store();
        let today = date(2025, 6, 15);

        let path = store.create("revisit later", 0, today).unwrap();
        let moved = store.postpone(&path, 3, today).unwrap();

        assert!(!path.exists());
        assert_eq!(moved.file_name().unwrap(), "20250618.txt");
        assert!(store.list_due(today).unwrap().is_empty());

        let due = store.list_due(date(2025, 6, 18)).unwrap();
        assert_eq!(due.len(), 1);
        assert_eq!(store.read(&due[0].path).unwrap(), "revisit later");
    }

    #[test]
    fn postpone_by_zero_is_a_same_day_rename() {
        let (_dir, store) = store();
        let today = date(2025, 6, 15);

        let path = store.create("still today", 0, today).unwrap();
        let moved = store.postpone(&path, 0, today).unwrap();

        assert_eq!(moved.file_name().unwrap(), "20250615_2.txt");
        assert!(!path.exists());
        assert!(moved.exists());
    }

    #[test]
    fn postpone_into_the_past_is_permitted() {
        let (_dir, store) = store();
        let today = date(2025, 6, 15);

        let path = store.create("again yesterday", 0, today).unwrap();
        let moved = store.postpone(&path, -1, today).unwrap();
        assert_eq!(moved.file_name().unwrap(), "20250614.txt");
    }

    #[test]
    fn delete_is_a_move_into_deleted_ideas() {
        let (_dir, store) = store();
        let today = date(2025, 6, 15);

        let path = store.create("done with this", 0, today).unwrap();
        let target = store.delete(&path).unwrap();

        assert!(!path.exists());
        assert_eq!(target, store.ideas_dir().join(DELETED_DIR).join("20250615.txt"));
        assert_eq!(fs::read_to_string(&target).unwrap(), "done with this");
    }

    #[test]
    fn delete_twice_fails_gracefully() {
        let (_dir, store) = store();
        let today = date(2025, 6, 15);

        let path = store.create("once only", 0, today).unwrap();
        store.delete(&path).unwrap();

        match store.delete(&path) {
            Err(BoomerangError::IdeaNotFound { path: p }) => assert_eq!(p, path),
            other => panic!("expected IdeaNotFound, got {:?}", other.map(|p| p.display().to_string())),
        }
    }

    #[test]
    fn deleted_name_collisions_are_disambiguated() {
        let (_dir, store) = store();
        let today = date(2025, 6, 15);

        let first = store.create("first round", 0, today).unwrap();
        store.delete(&first).unwrap();
        let second = store.create("second round", 0, today).unwrap();
        let target = store.delete(&second).unwrap();

        let deleted = store.ideas_dir().join(DELETED_DIR);
        assert_eq!(target, deleted.join("20250615_2.txt"));
        assert_eq!(fs::read_to_string(deleted.join("20250615.txt")).unwrap(), "first round");
        assert_eq!(fs::read_to_string(&target).unwrap(), "second round");
    }
}
