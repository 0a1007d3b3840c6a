//! One-shot helper that tells a running Boomerang instance to open the
//! add-idea window. Bind it to a global hotkey:
//!
//! ```text
//! boomerang-hotkey        # sends "log"
//! boomerang-hotkey log
//! ```
//!
//! Exit codes: 0 on success, 1 when no running instance is reachable,
//! 2 when the write fails.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;

use boomerang::{send_command, socket_path, BoomerangError};

#[derive(Parser)]
#[clap(version, about = "Send a command to a running Boomerang instance")]
struct HotkeyCli {
    /// Command to send
    #[clap(default_value = "log")]
    command: String,

    /// Path of the command socket
    #[clap(long, value_parser)]
    socket: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = HotkeyCli::parse();
    let path = cli.socket.unwrap_or_else(socket_path);

    match send_command(&path, &cli.command).await {
        Ok(()) => {
            println!("Command sent: {}", cli.command);
            ExitCode::SUCCESS
        }
        Err(BoomerangError::IpcUnreachable { .. }) => {
            eprintln!("Boomerang is not running.");
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("Failed to send command: {}", e);
            ExitCode::from(2)
        }
    }
}
