//! Error types for the boomerang application.
//!
//! This module defines custom error types that categorize different failures
//! that can occur during idea management, backup, and IPC operations.

use std::{io, path::PathBuf};

use thiserror::Error;

/// The main error type for the boomerang application.
#[derive(Error, Debug)]
pub enum BoomerangError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Idea file was not found when performing an operation.
    #[error("Idea not found: {path}")]
    IdeaNotFound { path: PathBuf },

    /// Idea filename does not carry a parsable YYYYMMDD prefix.
    #[error("Invalid idea filename: {name}")]
    InvalidFilename { name: String },

    /// The unique-filename probe ran out of candidates for a base name.
    #[error("No free filename based on {base} within {limit} candidates")]
    FilenameSpaceExhausted { base: String, limit: u32 },

    /// Directory creation or access failed.
    #[error("Failed to create or access directory: {path}")]
    DirectoryError { path: PathBuf },

    /// Errors related to backup operations.
    #[error("Backup failed: {message}")]
    BackupFailed { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// No running instance is listening on the command socket.
    #[error("No running instance reachable at {path}")]
    IpcUnreachable { path: PathBuf },

    /// Connected to the command socket but the write did not complete.
    #[error("Failed to send command: {message}")]
    IpcSendFailed { message: String },

    /// Generic application error with a custom message.
    #[error("{message}")]
    ApplicationError { message: String },
}
