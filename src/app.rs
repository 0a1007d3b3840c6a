//! Application core: the event loop that owns the presenter and the options
//! record, and dispatches user actions.
//!
//! Background workers (backup scheduler, command server) only ever post
//! [`AppEvent`]s; every prompt and alert is rendered here, on the loop that
//! owns the [`Presenter`].

use std::path::PathBuf;

use chrono::{Local, Utc};
use log::{error, info, warn};
use tokio::sync::mpsc;

use crate::{
    perform_backup, Action, AppEvent, BackupOutcome, BackupScheduler, Idea, IdeaStore, Options,
    Result,
};

/// Seam to the out-of-scope GUI presentation layer.
///
/// The tray icon and the three windows live elsewhere; the core drives them
/// through this trait and never from a background task.
pub trait Presenter {
    /// Show the process-due-ideas window for the given batch.
    fn process_due_ideas(&mut self, store: &IdeaStore, due: Vec<Idea>);

    /// Show the add-new-idea window.
    fn open_add_idea(&mut self, store: &IdeaStore);

    /// Show the options dialog; returns true when the record was edited.
    fn edit_options(&mut self, options: &mut Options) -> bool;

    /// Modal alert for an error.
    fn alert(&mut self, message: &str);

    /// Yes/no question.
    fn confirm(&mut self, question: &str) -> bool;

    /// Informational message.
    fn info(&mut self, message: &str);
}

/// Headless presenter: logs what a GUI would show and auto-confirms
/// questions.
#[derive(Debug, Default)]
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn process_due_ideas(&mut self, store: &IdeaStore, due: Vec<Idea>) {
        info!("{} ideas due", due.len());
        for idea in &due {
            match store.read(&idea.path) {
                Ok(text) => info!("Due {}: {}", idea.due_date, first_line(&text)),
                Err(e) => error!("Could not read {}: {}", idea.path.display(), e),
            }
        }
    }

    fn open_add_idea(&mut self, _store: &IdeaStore) {
        info!("Add-idea window requested");
    }

    fn edit_options(&mut self, _options: &mut Options) -> bool {
        info!("Options dialog requested");
        false
    }

    fn alert(&mut self, message: &str) {
        error!("{}", message);
    }

    fn confirm(&mut self, question: &str) -> bool {
        info!("{} (auto-confirmed)", question);
        true
    }

    fn info(&mut self, message: &str) {
        info!("{}", message);
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or("")
}

/// The long-running application loop.
pub struct App<P: Presenter> {
    options: Options,
    options_path: PathBuf,
    store: IdeaStore,
    presenter: P,
    scheduler: BackupScheduler,
    events_rx: mpsc::Receiver<AppEvent>,
}

impl<P: Presenter> App<P> {
    pub fn new(
        options: Options,
        options_path: PathBuf,
        store: IdeaStore,
        presenter: P,
        scheduler: BackupScheduler,
        events_rx: mpsc::Receiver<AppEvent>,
    ) -> Self {
        Self {
            options,
            options_path,
            store,
            presenter,
            scheduler,
            events_rx,
        }
    }

    /// Runs until `Action::Quit`, ctrl-c, or all event senders are gone.
    pub async fn run(mut self) -> Result<()> {
        loop {
            let maybe = tokio::select! {
                maybe = self.events_rx.recv() => maybe,
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted, quitting");
                    None
                }
            };
            match maybe {
                Some(event) => {
                    if self.handle_event(event) {
                        break;
                    }
                }
                None => break,
            }
        }
        self.scheduler.stop().await
    }

    /// Handles one event; returns true when the app should quit.
    fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Action(action) => self.dispatch(action),
            AppEvent::BackupFinished(result) => {
                self.on_backup_finished(result);
                false
            }
        }
    }

    fn dispatch(&mut self, action: Action) -> bool {
        info!("Dispatching {:?}", action);
        match action {
            Action::BringBack => {
                self.bring_back();
                false
            }
            Action::LogNew => {
                self.presenter.open_add_idea(&self.store);
                false
            }
            Action::BackupNow => {
                self.backup_now();
                false
            }
            Action::Options => {
                self.options_dialog();
                false
            }
            Action::Quit => true,
        }
    }

    fn bring_back(&mut self) {
        let today = Local::now().date_naive();
        match self.store.list_due(today) {
            Ok(due) if due.is_empty() => self.presenter.info("No ideas to process today."),
            Ok(due) => self.presenter.process_due_ideas(&self.store, due),
            Err(e) => self.presenter.alert(&format!("Failed to list due ideas: {}", e)),
        }
    }

    fn backup_now(&mut self) {
        let today = Local::now().date_naive();
        let now = Utc::now();
        let presenter = &mut self.presenter;
        let options = &mut self.options;
        let result = perform_backup(options, &self.options_path, today, now, |folder| {
            presenter.confirm(&format!(
                "The backup folder '{}' does not exist. Create it?",
                folder.display()
            ))
        });
        match result {
            Ok(outcome) => self.report_outcome(outcome, true),
            Err(e) => self.presenter.alert(&format!("Backup failed: {}", e)),
        }
    }

    fn options_dialog(&mut self) {
        if self.presenter.edit_options(&mut self.options) {
            if let Err(e) = self.options.save_to(&self.options_path) {
                self.presenter.alert(&format!("Failed to save options: {}", e));
            }
        }
    }

    fn on_backup_finished(&mut self, result: Result<BackupOutcome>) {
        match result {
            Ok(outcome) => {
                // The worker persisted its bookkeeping; pick it up so this
                // copy stays current.
                if matches!(outcome, BackupOutcome::Completed { .. }) {
                    match Options::load_from(&self.options_path) {
                        Ok(options) => self.options = options,
                        Err(e) => warn!("Could not re-load options after backup: {}", e),
                    }
                }
                self.report_outcome(outcome, false);
            }
            Err(e) => self
                .presenter
                .alert(&format!("Scheduled backup failed: {}", e)),
        }
    }

    fn report_outcome(&mut self, outcome: BackupOutcome, manual: bool) {
        match outcome {
            BackupOutcome::Completed {
                target,
                files_copied,
            } => self.presenter.info(&format!(
                "Backup completed: {} files copied to {}",
                files_copied,
                target.display()
            )),
            BackupOutcome::AlreadyRanToday { target } => {
                if manual {
                    self.presenter
                        .info(&format!("Already backed up today ({})", target.display()));
                }
            }
            BackupOutcome::NotConfigured => {
                if manual {
                    self.presenter
                        .alert("Set a backup folder in the options first.");
                }
            }
            BackupOutcome::Declined => {}
        }
    }
}
