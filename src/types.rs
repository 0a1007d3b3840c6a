//! Core shared types for the boomerang application.

use crate::{BackupOutcome, BoomerangError};

/// A specialized Result type for boomerang operations.
pub type Result<T> = std::result::Result<T, BoomerangError>;

/// The actions a user can trigger from the tray menu or the hotkey helper.
///
/// Every entry point (menu item, IPC command, signal) reduces to one of these
/// variants, dispatched through a single `match` in the app event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Open the process-due-ideas window.
    BringBack,
    /// Open the add-new-idea window.
    LogNew,
    /// Run a backup immediately, with prompts enabled.
    BackupNow,
    /// Open the options dialog.
    Options,
    /// Quit the application.
    Quit,
}

/// Events delivered to the app event loop.
///
/// Background workers never call into the presentation layer directly; they
/// post one of these and the loop, which owns the presenter, reacts on its
/// own thread.
#[derive(Debug)]
pub enum AppEvent {
    /// A user action requested via menu, hotkey IPC, or signal.
    Action(Action),
    /// A scheduled backup check finished with the given outcome.
    BackupFinished(Result<BackupOutcome>),
}
