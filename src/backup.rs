//! Backup orchestrator (C5): composes the profile store, archive engine,
//! and size/space auditor into a single backup/restore transaction.

use std::path::{Path, PathBuf};

use crate::archive;
use crate::audit;
use crate::error::{EngineError, Result};
use crate::paths::{sanitize_profile_name, validate_save_path};
use crate::profile_store::ProfileStore;
use crate::session::Session;
use crate::settings::Settings;

#[derive(Debug, Clone)]
pub struct BackupOutcome {
    pub success: bool,
    pub message: String,
    pub warnings: Vec<String>,
}

/// Run one backup of `profile_name`: measure, gate, archive, then prune.
/// Pruning failures are attached as warnings rather than failing the call.
/// Fails fast with `EngineError::Busy` if another backup or restore for
/// this session is already in flight (§5: one backup/restore at a time).
pub fn backup(
    session: &Session,
    store: &ProfileStore,
    settings: &Settings,
    profile_name: &str,
) -> Result<BackupOutcome> {
    let _guard = session.enter_backup_restore()?;

    let stored_paths = store
        .get(profile_name)
        .ok_or_else(|| EngineError::ProfileNotFound(profile_name.to_string()))?;

    let sources: Vec<PathBuf> = stored_paths
        .iter()
        .map(|p| validate_save_path(p))
        .collect::<Result<Vec<_>>>()?;

    let measurement = audit::measure(&sources);

    if let Some(limit) = settings.max_source_size_bytes() {
        if measurement.bytes > limit {
            return Err(EngineError::SourceTooLarge {
                measured: measurement.bytes,
                limit,
            });
        }
    }

    let sanitized_name = sanitize_profile_name(profile_name)?;
    let profile_dir = settings.backup_base_dir.join(&sanitized_name);

    if settings.check_free_space_enabled {
        audit::check(&profile_dir, measurement.bytes, settings.min_free_space_bytes())?;
    } else {
        std::fs::create_dir_all(&profile_dir)?;
    }

    let archive_path = archive::create(&sanitized_name, &sources, &profile_dir, settings.compression_mode)?;

    let mut warnings = Vec::new();
    if measurement.skipped_entries > 0 {
        warnings.push(format!(
            "{} source entries were unreadable and skipped",
            measurement.skipped_entries
        ));
    }

    match archive::prune(&profile_dir, settings.max_backups) {
        Ok(0) => {}
        Ok(failed) => warnings.push(format!("{failed} old archive(s) could not be pruned")),
        Err(e) => warnings.push(format!("retention pruning failed: {e}")),
    }

    Ok(BackupOutcome {
        success: true,
        message: format!(
            "backed up profile '{profile_name}' to {}",
            archive_path.display()
        ),
        warnings,
    })
}

/// Restore `archive_path` (which must live under the profile's own archive
/// directory) back into the profile's source directories. Shares the same
/// in-flight slot as `backup` — a restore and a backup cannot overlap.
pub fn restore(
    session: &Session,
    store: &ProfileStore,
    settings: &Settings,
    profile_name: &str,
    archive_path: &Path,
) -> Result<BackupOutcome> {
    let _guard = session.enter_backup_restore()?;

    let stored_paths = store
        .get(profile_name)
        .ok_or_else(|| EngineError::ProfileNotFound(profile_name.to_string()))?;

    let destinations: Vec<PathBuf> = stored_paths
        .iter()
        .map(|p| validate_save_path(p))
        .collect::<Result<Vec<_>>>()?;

    let sanitized_name = sanitize_profile_name(profile_name)?;
    let profile_dir = settings.backup_base_dir.join(&sanitized_name);

    require_under_backup_root(archive_path, &profile_dir)?;

    archive::extract(archive_path, &destinations)?;

    Ok(BackupOutcome {
        success: true,
        message: format!(
            "restored profile '{profile_name}' from {}",
            archive_path.display()
        ),
        warnings: Vec::new(),
    })
}

fn require_under_backup_root(archive_path: &Path, profile_dir: &Path) -> Result<()> {
    let canonical_archive = std::fs::canonicalize(archive_path)
        .map_err(|_| EngineError::ArchiveNotUnderBackupRoot(archive_path.to_path_buf()))?;
    let canonical_root = std::fs::canonicalize(profile_dir)
        .unwrap_or_else(|_| profile_dir.to_path_buf());

    if canonical_archive.starts_with(&canonical_root) {
        Ok(())
    } else {
        Err(EngineError::ArchiveNotUnderBackupRoot(archive_path.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CompressionMode;

    fn store_with(dir: &Path, name: &str, source: &Path) -> ProfileStore {
        let store = ProfileStore::new(dir.join("profiles.json"));
        store.upsert(name, vec![source.to_path_buf()]).unwrap();
        store
    }

    #[test]
    fn happy_path_backup_respects_retention_cap() {
        let workdir = tempfile::tempdir().unwrap();
        let src = workdir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("save.dat"), vec![0u8; 10 * 1024]).unwrap();

        let store = store_with(workdir.path(), "Alpha", &src);
        let mut settings = Settings::default();
        settings.backup_base_dir = workdir.path().join("bk");
        settings.max_backups = 2;
        settings.check_free_space_enabled = false;

        let session = Session::new();
        for _ in 0..3 {
            let outcome = backup(&session, &store, &settings, "Alpha").unwrap();
            assert!(outcome.success);
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        let profile_dir = settings.backup_base_dir.join("Alpha");
        let archives = archive::list(&profile_dir).unwrap();
        assert_eq!(archives.len(), 2);
    }

    #[test]
    fn backup_then_restore_round_trips_contents() {
        let workdir = tempfile::tempdir().unwrap();
        let src = workdir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("save.dat"), b"progress").unwrap();

        let store = store_with(workdir.path(), "Alpha", &src);
        let mut settings = Settings::default();
        settings.backup_base_dir = workdir.path().join("bk");
        settings.check_free_space_enabled = false;
        settings.compression_mode = CompressionMode::Stored;

        let session = Session::new();
        backup(&session, &store, &settings, "Alpha").unwrap();

        std::fs::write(src.join("save.dat"), b"corrupted").unwrap();

        let profile_dir = settings.backup_base_dir.join("Alpha");
        let archives = archive::list(&profile_dir).unwrap();
        let latest = &archives.last().unwrap().path;

        restore(&session, &store, &settings, "Alpha", latest).unwrap();

        assert_eq!(std::fs::read(src.join("save.dat")).unwrap(), b"progress");
    }

    #[test]
    fn backup_fails_fast_on_unknown_profile() {
        let workdir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(workdir.path().join("profiles.json"));
        let settings = Settings::default();
        let session = Session::new();
        let err = backup(&session, &store, &settings, "Nonexistent").unwrap_err();
        assert!(matches!(err, EngineError::ProfileNotFound(_)));
    }

    #[test]
    fn backup_refuses_when_sources_exceed_max_size() {
        let workdir = tempfile::tempdir().unwrap();
        let src = workdir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("big.dat"), vec![0u8; 2048]).unwrap();

        let store = store_with(workdir.path(), "Alpha", &src);
        let mut settings = Settings::default();
        settings.backup_base_dir = workdir.path().join("bk");
        settings.max_source_size_mb = 0;
        settings.check_free_space_enabled = false;

        let session = Session::new();
        let err = backup(&session, &store, &settings, "Alpha").unwrap_err();
        assert!(matches!(err, EngineError::SourceTooLarge { .. }));

        let profile_dir = settings.backup_base_dir.join("Alpha");
        assert!(archive::list(&profile_dir).unwrap().is_empty());
    }

    #[test]
    fn backup_refuses_when_free_space_check_fails() {
        let workdir = tempfile::tempdir().unwrap();
        let src = workdir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("save.dat"), vec![0u8; 1024]).unwrap();

        let store = store_with(workdir.path(), "Alpha", &src);
        let mut settings = Settings::default();
        settings.backup_base_dir = workdir.path().join("bk");
        settings.check_free_space_enabled = true;
        settings.min_free_space_gb = u64::MAX / (1024 * 1024 * 1024);

        let session = Session::new();
        let err = backup(&session, &store, &settings, "Alpha").unwrap_err();
        assert!(matches!(err, EngineError::InsufficientSpace { .. }));

        let profile_dir = settings.backup_base_dir.join("Alpha");
        assert!(archive::list(&profile_dir).unwrap().is_empty());
    }

    #[test]
    fn restore_rejects_archive_outside_backup_root() {
        let workdir = tempfile::tempdir().unwrap();
        let src = workdir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();

        let store = store_with(workdir.path(), "Alpha", &src);
        let mut settings = Settings::default();
        settings.backup_base_dir = workdir.path().join("bk");

        let rogue_archive = workdir.path().join("not_a_backup.zip");
        std::fs::write(&rogue_archive, b"x").unwrap();

        let session = Session::new();
        let err = restore(&session, &store, &settings, "Alpha", &rogue_archive).unwrap_err();
        assert!(matches!(err, EngineError::ArchiveNotUnderBackupRoot(_)));
    }

    #[test]
    fn backup_fails_fast_with_busy_when_one_is_already_in_flight() {
        let workdir = tempfile::tempdir().unwrap();
        let src = workdir.path().join("src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("save.dat"), b"data").unwrap();

        let store = store_with(workdir.path(), "Alpha", &src);
        let mut settings = Settings::default();
        settings.backup_base_dir = workdir.path().join("bk");
        settings.check_free_space_enabled = false;

        let session = Session::new();
        let _held = session.enter_backup_restore().unwrap();

        let err = backup(&session, &store, &settings, "Alpha").unwrap_err();
        assert!(matches!(err, EngineError::Busy));
    }
}
