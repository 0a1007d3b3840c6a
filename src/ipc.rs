//! Local command channel for the global-hotkey helper.
//!
//! A Unix domain socket at a well-known per-user location. The client writes
//! one short text command and disconnects; the server reads to end-of-stream,
//! trims, and dispatches by exact match. `log` opens the add-idea window;
//! anything else is silently ignored. The server never replies.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use directories::BaseDirs;
use log::{debug, error, info, warn};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::{Action, AppEvent, BoomerangError, Result};

/// The one command with an effect; everything else is ignored.
pub const COMMAND_LOG: &str = "log";

/// Socket file name inside the runtime directory.
pub const SOCKET_NAME: &str = "boomerang.sock";

/// Client-side timeout for connecting and for writing.
pub const CLIENT_TIMEOUT: Duration = Duration::from_millis(500);

/// Default location of the command socket.
pub fn socket_path() -> PathBuf {
    BaseDirs::new()
        .and_then(|dirs| dirs.runtime_dir().map(Path::to_path_buf))
        .unwrap_or_else(std::env::temp_dir)
        .join(SOCKET_NAME)
}

/// Listener accepting one-shot commands from the hotkey helper.
pub struct CommandServer {
    path: PathBuf,
    task: JoinHandle<()>,
}

impl CommandServer {
    /// Binds the socket and starts the accept loop. A stale socket file left
    /// behind by a previous crash is removed before binding.
    pub fn bind(path: impl Into<PathBuf>, events: mpsc::Sender<AppEvent>) -> Result<CommandServer> {
        let path = path.into();
        if path.exists() {
            debug!("Removing stale command socket {}", path.display());
            fs::remove_file(&path)?;
        }
        let listener = UnixListener::bind(&path).map_err(|e| {
            error!("Failed to bind command socket {}: {}", path.display(), e);
            BoomerangError::Io(e)
        })?;
        info!("Command server listening on {}", path.display());

        let task = tokio::spawn(accept_loop(listener, events));
        Ok(CommandServer { path, task })
    }

    /// The socket path this server is bound to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stops the accept loop and removes the socket file.
    pub fn shutdown(self) {
        self.task.abort();
        if let Err(e) = fs::remove_file(&self.path) {
            debug!(
                "Could not remove command socket {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

async fn accept_loop(listener: UnixListener, events: mpsc::Sender<AppEvent>) {
    loop {
        match listener.accept().await {
            Ok((stream, _)) => handle_connection(stream, &events).await,
            Err(e) => error!("Command server accept failed: {}", e),
        }
    }
}

async fn handle_connection(mut stream: UnixStream, events: &mpsc::Sender<AppEvent>) {
    let mut buf = Vec::new();
    if let Err(e) = stream.read_to_end(&mut buf).await {
        warn!("Failed to read command: {}", e);
        return;
    }
    let command = String::from_utf8_lossy(&buf).trim().to_string();
    debug!("IPC received: {}", command);
    match command.as_str() {
        COMMAND_LOG => {
            if let Err(e) = events.send(AppEvent::Action(Action::LogNew)).await {
                error!("Failed to dispatch log command: {}", e);
            }
        }
        other => debug!("Ignoring unknown command: {:?}", other),
    }
}

/// Connects to a running instance and sends one command.
///
/// Distinguishes an unreachable endpoint ([`BoomerangError::IpcUnreachable`])
/// from a failed or timed-out write ([`BoomerangError::IpcSendFailed`]) so
/// the hotkey helper can report distinct exit codes.
pub async fn send_command(path: &Path, command: &str) -> Result<()> {
    let mut stream = match timeout(CLIENT_TIMEOUT, UnixStream::connect(path)).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(e)) => {
            debug!("Connect to {} failed: {}", path.display(), e);
            return Err(BoomerangError::IpcUnreachable {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(BoomerangError::IpcUnreachable {
                path: path.to_path_buf(),
            })
        }
    };

    let write = async {
        stream.write_all(command.as_bytes()).await?;
        stream.shutdown().await
    };
    match timeout(CLIENT_TIMEOUT, write).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(BoomerangError::IpcSendFailed {
            message: e.to_string(),
        }),
        Err(_) => Err(BoomerangError::IpcSendFailed {
            message: "write timed out".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_socket(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join(SOCKET_NAME)
    }

    #[tokio::test]
    async fn log_command_dispatches_exactly_one_action() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let server = CommandServer::bind(test_socket(&dir), tx).unwrap();

        send_command(server.path(), "log").await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("event channel closed");
        assert!(matches!(event, AppEvent::Action(Action::LogNew)));
        assert!(rx.try_recv().is_err());

        server.shutdown();
    }

    #[tokio::test]
    async fn unknown_command_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let server = CommandServer::bind(test_socket(&dir), tx).unwrap();

        send_command(server.path(), "ping").await.unwrap();
        // A follow-up `log` proves the server is still serving and that
        // `ping` produced nothing before it.
        send_command(server.path(), "log").await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("event channel closed");
        assert!(matches!(event, AppEvent::Action(Action::LogNew)));
        assert!(rx.try_recv().is_err());

        server.shutdown();
    }

    #[tokio::test]
    async fn surrounding_whitespace_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let (tx, mut rx) = mpsc::channel(16);
        let server = CommandServer::bind(test_socket(&dir), tx).unwrap();

        send_command(server.path(), "  log\n").await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("event channel closed");
        assert!(matches!(event, AppEvent::Action(Action::LogNew)));

        server.shutdown();
    }

    #[tokio::test]
    async fn no_listener_is_reported_as_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_socket(&dir);

        match send_command(&path, "log").await {
            Err(BoomerangError::IpcUnreachable { path: p }) => assert_eq!(p, path),
            other => panic!("expected IpcUnreachable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn stale_socket_file_is_replaced_on_bind() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_socket(&dir);
        fs::write(&path, "stale").unwrap();

        let (tx, mut rx) = mpsc::channel(16);
        let server = CommandServer::bind(&path, tx).unwrap();
        send_command(&path, "log").await.unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("no event within timeout")
            .expect("event channel closed");
        assert!(matches!(event, AppEvent::Action(Action::LogNew)));

        server.shutdown();
    }
}
