//! CLI entrypoint. Argument parsing, logging setup, and the interactive
//! shell itself are outside the engine proper; this binary only wires the
//! engine up to a process exit code, per the external-interfaces contract.

use std::path::PathBuf;

use clap::Parser;

use save_warden::collaborators::LoggingCollaborator;
use save_warden::instance_lock::{self, AcquireOutcome};
use save_warden::session::Session;
use save_warden::silent;

/// Save Warden: retained, timestamped archive backups of game save data.
#[derive(Parser)]
#[command(name = "save-warden", version)]
struct Cli {
    /// Run a single silent backup of the named profile, then exit.
    #[arg(long, value_name = "PROFILE_NAME")]
    backup: Option<String>,
}

fn config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("save-warden")
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let dir = config_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        log::error!("could not create config directory {}: {e}", dir.display());
        std::process::exit(1);
    }
    let settings_path = dir.join("settings.json");
    let profiles_path = dir.join("profiles.json");

    let ui = LoggingCollaborator;
    let session = Session::new();

    let code = match cli.backup {
        // Silent mode bypasses the single-instance lock entirely: it may
        // run alongside an interactive session or another silent backup.
        Some(profile_name) => {
            silent::run_silent_backup(&session, &settings_path, &profiles_path, &profile_name, &ui)
        }
        None => run_interactive(),
    };

    std::process::exit(code);
}

/// The windowed shell itself lives outside this crate; what remains here is
/// the single-instance handshake it depends on. A second launch forwards
/// `activate` to the first and exits immediately rather than erroring.
fn run_interactive() -> i32 {
    match instance_lock::acquire() {
        Ok(AcquireOutcome::ForwardedToExisting) => {
            log::info!("another instance is already running; activated it instead");
            0
        }
        Ok(AcquireOutcome::Acquired(lock)) => {
            log::info!("holding the single-instance lock; listening for activation requests");
            loop {
                match lock.accept_one() {
                    Ok(Some(command)) => log::info!("received IPC command: {command}"),
                    Ok(None) => {}
                    Err(e) => {
                        log::error!("single-instance listener failed: {e}");
                        break 1;
                    }
                }
            }
        }
        Err(e) => {
            log::error!("could not acquire single-instance lock: {e}");
            1
        }
    }
}
