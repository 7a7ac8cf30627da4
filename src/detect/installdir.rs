//! Stage D: probe inside the game's own install directory for a save
//! subfolder, once the common-location probe has been exhausted.

use std::path::{Path, PathBuf};

use crate::paths::normalize;
use crate::progress::CancellationToken;

const SUFFIXES: &[&str] = &[
    "Saves",
    "Save",
    "SaveGame",
    "SaveGames",
    "Saved",
    "storage",
    "PlayerData",
    "UserData",
    "Profile",
    "Profiles",
    "PlayerProfiles",
    "Game",
];

pub fn stage_install_dir_probe(install_dir: &Path, cancel: &CancellationToken) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    for suffix in SUFFIXES {
        if cancel.is_cancelled() {
            break;
        }
        let candidate = install_dir.join(suffix);
        if candidate.is_dir() {
            candidates.push(normalize(&candidate));
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_known_suffix_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("SaveGames")).unwrap();
        std::fs::create_dir_all(dir.path().join("Profiles")).unwrap();

        let cancel = CancellationToken::new();
        let found = stage_install_dir_probe(dir.path(), &cancel);
        assert!(found.contains(&normalize(&dir.path().join("SaveGames"))));
        assert!(found.contains(&normalize(&dir.path().join("Profiles"))));
    }

    #[test]
    fn ignores_absent_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        assert!(stage_install_dir_probe(dir.path(), &cancel).is_empty());
    }
}
