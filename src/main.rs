use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use tokio::sync::mpsc;

use boomerang::{
    socket_path, App, BackupScheduler, Cli, CommandServer, ConsolePresenter, IdeaStore, Options,
    Presenter,
};

fn initialize_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

// The tray process should never die on an unhandled error; the GUI shell
// surfaces these as modal alerts.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        error!("Unexpected error: {}", info);
    }));
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);
    install_panic_hook();

    let options_path = cli.config.clone().unwrap_or_else(Options::default_path);
    let mut presenter = ConsolePresenter;

    // Corrupt options degrade to defaults rather than blocking startup.
    let mut options = match Options::load_from(&options_path) {
        Ok(options) => options,
        Err(e) => {
            presenter.alert(&format!("Failed to load options: {}", e));
            Options::default()
        }
    };
    if let Some(dir) = cli.ideas_dir {
        options.ideas_folder = Some(dir);
    }
    if let Some(dir) = cli.backup_dir {
        options.backup_folder = Some(dir);
    }

    let Some(ideas_folder) = options.ideas_folder.clone() else {
        error!(
            "No ideas folder configured; pass --ideas-dir or set one in {}",
            options_path.display()
        );
        return ExitCode::FAILURE;
    };

    let store = IdeaStore::new(&ideas_folder);
    if !ideas_folder.exists() {
        let question = format!(
            "The ideas folder '{}' does not exist. Create it?",
            ideas_folder.display()
        );
        if !presenter.confirm(&question) {
            return ExitCode::FAILURE;
        }
        if let Err(e) = store.ensure_exists() {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    let (events_tx, events_rx) = mpsc::channel(100);

    let socket = cli.socket.unwrap_or_else(socket_path);
    let server = match CommandServer::bind(&socket, events_tx.clone()) {
        Ok(server) => Some(server),
        Err(e) => {
            // The app keeps running without the hotkey channel.
            presenter.alert(&format!("Failed to start command server: {}", e));
            None
        }
    };

    let mut scheduler = BackupScheduler::new(options_path.clone(), events_tx.clone());
    scheduler.start();

    info!("Boomerang started");
    let app = App::new(options, options_path, store, presenter, scheduler, events_rx);
    let result = app.run().await;

    if let Some(server) = server {
        server.shutdown();
    }
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Application error: {}", e);
            ExitCode::FAILURE
        }
    }
}
