use std::path::PathBuf;

use clap::Parser;

/// Main application arguments
#[derive(Parser)]
#[clap(
    version,
    about = "Tray utility that boomerangs logged ideas back on their due date"
)]
pub struct Cli {
    /// Path to the options file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Ideas folder, overriding the configured one for this run
    #[clap(long, value_parser)]
    pub ideas_dir: Option<PathBuf>,

    /// Backup folder, overriding the configured one for this run
    #[clap(long, value_parser)]
    pub backup_dir: Option<PathBuf>,

    /// Path of the command socket
    #[clap(long, value_parser)]
    pub socket: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,
}
