//! Persistent, atomic, multi-path profile registry (`profiles.json`).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::profile::Profile;

/// On-disk value shape: accepts a single path string or an ordered list.
/// Writers always emit the list form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredPaths {
    Single(PathBuf),
    Many(Vec<PathBuf>),
}

impl From<StoredPaths> for Vec<PathBuf> {
    fn from(value: StoredPaths) -> Self {
        match value {
            StoredPaths::Single(p) => vec![p],
            StoredPaths::Many(ps) => ps,
        }
    }
}

pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the store file. A missing file or a parse failure is treated as
    /// an empty set; this never returns an error for those cases.
    pub fn load(&self) -> BTreeMap<String, Vec<PathBuf>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(),
        };

        match serde_json::from_str::<BTreeMap<String, StoredPaths>>(&contents) {
            Ok(map) => map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            Err(e) => {
                log::warn!(
                    "profile store {} is corrupt ({e}); treating as empty",
                    self.path.display()
                );
                BTreeMap::new()
            }
        }
    }

    /// Atomically write the whole profile map, emitting the list form for
    /// every entry. On failure, the previous file content is left intact.
    pub fn save(&self, profiles: &BTreeMap<String, Vec<PathBuf>>) -> Result<()> {
        let as_lists: BTreeMap<&String, &Vec<PathBuf>> = profiles.iter().collect();
        let json = serde_json::to_string_pretty(&as_lists)
            .map_err(|e| EngineError::StoreIoFailure(e.to_string()))?;
        atomic_write(&self.path, json.as_bytes())
    }

    /// Insert or replace a profile, validating name and paths first.
    pub fn upsert(&self, name: &str, paths: Vec<PathBuf>) -> Result<()> {
        let profile = Profile::new(name, paths)?;
        let mut map = self.load();
        map.insert(profile.name, profile.paths);
        self.save(&map)
    }

    /// Remove a profile by name. Idempotent: absent entries are not an error.
    pub fn delete(&self, name: &str) -> Result<()> {
        let mut map = self.load();
        map.remove(name);
        self.save(&map)
    }

    pub fn get(&self, name: &str) -> Option<Vec<PathBuf>> {
        self.load().get(name).cloned()
    }
}

/// Write `contents` to `path` via a temp file in the same directory,
/// followed by an atomic rename. If any step fails, `path` is left
/// untouched.
pub fn atomic_write(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir).map_err(|e| EngineError::StoreIoFailure(e.to_string()))?;

    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "store".to_string())
    ));

    std::fs::write(&tmp_path, contents).map_err(|e| EngineError::StoreIoFailure(e.to_string()))?;

    std::fs::rename(&tmp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp_path);
        EngineError::StoreIoFailure(e.to_string())
    })?;

    Ok(())
}
