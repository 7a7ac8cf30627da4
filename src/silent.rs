//! Silent-backup entrypoint (C10): a headless one-shot invoked as
//! `--backup <profile_name>`. Mirrors the fixed step order of the original
//! unattended-backup runner: load settings, load the profile store, look
//! up the profile, run the backup orchestrator, emit one notification.

use std::path::Path;

use crate::backup;
use crate::collaborators::UiCollaborator;
use crate::profile_store::ProfileStore;
use crate::session::Session;
use crate::settings::Settings;

/// Exit-code contract: 0 success, 1 failure. Usage errors (missing
/// argument) are the CLI layer's responsibility, not this function's.
/// Silent backups bypass the single-instance lock but still honor the
/// per-session backup/restore slot, so one fails fast with `Busy` rather
/// than racing an interactive backup already running in the same session.
pub fn run_silent_backup(
    session: &Session,
    settings_path: &Path,
    profiles_path: &Path,
    profile_name: &str,
    ui: &dyn UiCollaborator,
) -> i32 {
    let settings = match Settings::load_from(settings_path) {
        Ok(s) => s,
        Err(e) => {
            ui.notify("Save Warden", &format!("could not load settings: {e}"), false);
            return 1;
        }
    };

    let store = ProfileStore::new(profiles_path);

    match backup::backup(session, &store, &settings, profile_name) {
        Ok(outcome) => {
            for warning in &outcome.warnings {
                log::warn!("{warning}");
            }
            ui.notify("Save Warden", &outcome.message, true);
            0
        }
        Err(e) => {
            ui.notify(
                "Save Warden",
                &format!("backup of '{profile_name}' failed: {e}"),
                false,
            );
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::LoggingCollaborator;

    #[test]
    fn silent_backup_succeeds_for_a_known_profile() {
        let workdir = tempfile::tempdir().unwrap();
        let src = workdir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("save.dat"), b"data").unwrap();

        let profiles_path = workdir.path().join("profiles.json");
        let store = ProfileStore::new(&profiles_path);
        store.upsert("Alpha", vec![src.clone()]).unwrap();

        let settings_path = workdir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.backup_base_dir = workdir.path().join("bk");
        settings.check_free_space_enabled = false;
        settings.save_to(&settings_path).unwrap();

        let ui = LoggingCollaborator;
        let session = Session::new();
        let code = run_silent_backup(&session, &settings_path, &profiles_path, "Alpha", &ui);
        assert_eq!(code, 0);
    }

    #[test]
    fn silent_backup_fails_for_unknown_profile() {
        let workdir = tempfile::tempdir().unwrap();
        let profiles_path = workdir.path().join("profiles.json");
        let settings_path = workdir.path().join("settings.json");
        Settings::default().save_to(&settings_path).unwrap();

        let ui = LoggingCollaborator;
        let session = Session::new();
        let code = run_silent_backup(&session, &settings_path, &profiles_path, "Nonexistent", &ui);
        assert_eq!(code, 1);
    }
}
