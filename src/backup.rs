//! Scheduled backups of the ideas folder.
//!
//! A background worker wakes every 12 hours, re-loads the options from disk,
//! and decides whether to copy the whole ideas tree into a dated snapshot
//! directory. At most one snapshot is taken per calendar day. The worker
//! never talks to the presentation layer directly; outcomes travel back to
//! the app event loop as [`AppEvent::BackupFinished`] messages.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Duration, Local, NaiveDate, Utc};
use log::{debug, error, info, warn};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use walkdir::WalkDir;

use crate::{AppEvent, BoomerangError, Options, Result, DATE_FORMAT};

/// Hours between scheduled checks; also the debounce window between runs.
pub const CHECK_INTERVAL_HOURS: i64 = 12;

/// What a backup attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A snapshot was written to `target`.
    Completed { target: PathBuf, files_copied: usize },
    /// Ideas or backup folder is not configured; nothing to do.
    NotConfigured,
    /// The user declined creating the missing backup folder.
    Declined,
    /// A snapshot for today already exists; one backup per calendar day.
    AlreadyRanToday { target: PathBuf },
}

/// Commands accepted by the scheduler task.
#[derive(Debug, Clone)]
pub enum BackupCommand {
    /// Run a debounced backup check immediately.
    CheckNow,
    /// Stop the backup scheduler.
    Stop,
}

/// Decides whether a scheduled backup should run now.
///
/// The rules, in order: no backup folder configured → no; less than the
/// debounce window since the last run → no; never backed up → yes; otherwise
/// only when the configured interval has elapsed since the last backup date.
pub fn should_backup(options: &Options, today: NaiveDate, now: DateTime<Utc>) -> bool {
    if options.backup_folder.is_none() {
        return false;
    }
    if let Some(last_time) = options.last_backup_time {
        if now - last_time < Duration::hours(CHECK_INTERVAL_HOURS) {
            debug!("Last backup ran under {}h ago, debouncing", CHECK_INTERVAL_HOURS);
            return false;
        }
    }
    match options.last_backup_date {
        None => true,
        Some(last_date) => (today - last_date).num_days() >= options.backup_interval_days as i64,
    }
}

/// Copies the ideas folder into `<backup_folder>/<today>/`, then records the
/// run in the options and persists them to `options_path`.
///
/// `confirm_create` is consulted before creating a missing backup folder; the
/// scheduled path passes an auto-approving closure since prompting is
/// disabled there. Copy failures propagate with the options left untouched.
pub fn perform_backup<F>(
    options: &mut Options,
    options_path: &Path,
    today: NaiveDate,
    now: DateTime<Utc>,
    mut confirm_create: F,
) -> Result<BackupOutcome>
where
    F: FnMut(&Path) -> bool,
{
    let (Some(backup_folder), Some(ideas_folder)) =
        (options.backup_folder.clone(), options.ideas_folder.clone())
    else {
        debug!("Backup folders not configured, nothing to do");
        return Ok(BackupOutcome::NotConfigured);
    };

    if !backup_folder.exists() {
        if !confirm_create(&backup_folder) {
            info!("Backup folder creation declined, aborting backup");
            return Ok(BackupOutcome::Declined);
        }
        fs::create_dir_all(&backup_folder).map_err(|e| {
            error!("Failed to create backup folder: {}", e);
            BoomerangError::DirectoryError {
                path: backup_folder.clone(),
            }
        })?;
        info!("Created backup folder {}", backup_folder.display());
    }

    let target = backup_folder.join(today.format(DATE_FORMAT).to_string());
    if target.exists() {
        debug!("Backup for {} already exists at {}", today, target.display());
        return Ok(BackupOutcome::AlreadyRanToday { target });
    }

    let files_copied = copy_dir_recursive(&ideas_folder, &target)?;

    options.last_backup_date = Some(today);
    options.last_backup_time = Some(now);
    options.save_to(options_path)?;

    info!(
        "Backup completed: {} files copied to {}",
        files_copied,
        target.display()
    );
    Ok(BackupOutcome::Completed {
        target,
        files_copied,
    })
}

/// Recursively copies the directory tree at `src` into `dst`.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<usize> {
    let mut files_copied = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| BoomerangError::BackupFailed {
            message: format!("Failed to walk {}: {}", src.display(), e),
        })?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| BoomerangError::BackupFailed {
                message: format!("Unexpected path {}: {}", entry.path().display(), e),
            })?;
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| BoomerangError::BackupFailed {
                message: format!("Failed to create {}: {}", target.display(), e),
            })?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).map_err(|e| BoomerangError::BackupFailed {
                message: format!(
                    "Failed to copy {} to {}: {}",
                    entry.path().display(),
                    target.display(),
                    e
                ),
            })?;
            files_copied += 1;
        }
    }
    Ok(files_copied)
}

/// Background worker driving the scheduled backup checks.
pub struct BackupScheduler {
    /// Options file re-read on every check
    options_path: PathBuf,

    /// Channel delivering outcomes to the app event loop
    events: mpsc::Sender<AppEvent>,

    /// Channel to send commands to the scheduler task
    command_tx: mpsc::Sender<BackupCommand>,

    /// Handle to the scheduler task
    task: Option<JoinHandle<()>>,
}

impl BackupScheduler {
    /// Creates a scheduler that reports outcomes onto `events`.
    pub fn new(options_path: PathBuf, events: mpsc::Sender<AppEvent>) -> Self {
        let (command_tx, _) = mpsc::channel(10);
        Self {
            options_path,
            events,
            command_tx,
            task: None,
        }
    }

    /// Starts the scheduler task. The first scheduled check happens one full
    /// interval after start; `check_now` forces an earlier one.
    pub fn start(&mut self) {
        info!("Starting backup scheduler");
        let (command_tx, mut command_rx) = mpsc::channel(10);
        self.command_tx = command_tx;

        let options_path = self.options_path.clone();
        let events = self.events.clone();

        let task = tokio::spawn(async move {
            let mut interval =
                time::interval(time::Duration::from_secs(CHECK_INTERVAL_HOURS as u64 * 3600));
            interval.tick().await; // Initial tick

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        run_scheduled_check(&options_path, &events).await;
                    }
                    Some(cmd) = command_rx.recv() => match cmd {
                        BackupCommand::CheckNow => {
                            run_scheduled_check(&options_path, &events).await;
                        }
                        BackupCommand::Stop => {
                            info!("Backup scheduler stopping...");
                            break;
                        }
                    }
                }
            }
        });

        self.task = Some(task);
    }

    /// Whether the scheduler task is running.
    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Asks the scheduler to run a debounced check immediately.
    pub async fn check_now(&self) -> Result<()> {
        self.command_tx
            .send(BackupCommand::CheckNow)
            .await
            .map_err(|e| BoomerangError::BackupFailed {
                message: format!("Failed to send backup command: {}", e),
            })
    }

    /// Stops the scheduler task if it is running.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            if let Err(e) = self.command_tx.send(BackupCommand::Stop).await {
                error!("Failed to send stop command to backup scheduler: {}", e);
            }
            task.await.map_err(|e| BoomerangError::BackupFailed {
                message: format!("Failed to stop backup scheduler: {}", e),
            })?;
            info!("Backup scheduler stopped");
        } else {
            debug!("Backup scheduler is not running");
        }
        Ok(())
    }
}

async fn run_scheduled_check(options_path: &Path, events: &mpsc::Sender<AppEvent>) {
    // Re-read the options each pass so edits from the options dialog and
    // manual backups are honored.
    let mut options = match Options::load_from(options_path) {
        Ok(options) => options,
        Err(e) => {
            error!("Scheduled backup check could not load options: {}", e);
            return;
        }
    };

    let today = Local::now().date_naive();
    let now = Utc::now();
    if !should_backup(&options, today, now) {
        debug!("No backup due");
        return;
    }

    let result = perform_backup(&mut options, options_path, today, now, |_| true);
    match &result {
        Ok(outcome) => info!("Scheduled backup finished: {:?}", outcome),
        Err(e) => error!("Scheduled backup failed: {}", e),
    }
    if let Err(e) = events.send(AppEvent::BackupFinished(result)).await {
        warn!("Failed to deliver backup outcome to the app: {}", e);
    }
}
