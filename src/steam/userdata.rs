//! Active Steam user (`userdata/<id3>`) selection.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct UserdataInfo {
    pub base: PathBuf,
    pub selected_id3: String,
    pub available_ids: Vec<String>,
}

/// Enumerate numeric subfolders of `userdata/` excluding `0`. With more than
/// one candidate, prefer the one whose `config/localconfig.vdf` (or, absent
/// that, the folder itself) was modified most recently.
pub fn find_userdata(steam_root: &Path) -> Option<UserdataInfo> {
    let base = steam_root.join("userdata");
    let entries = std::fs::read_dir(&base).ok()?;

    let mut ids: Vec<String> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| !name.is_empty() && name.chars().all(|c| c.is_ascii_digit()) && name != "0")
        .collect();
    ids.sort();

    if ids.is_empty() {
        return None;
    }

    let selected = if ids.len() == 1 {
        ids[0].clone()
    } else {
        ids.iter()
            .max_by_key(|id| most_recent_mtime(&base, id))
            .cloned()
            .unwrap_or_else(|| ids[0].clone())
    };

    Some(UserdataInfo {
        base,
        selected_id3: selected,
        available_ids: ids,
    })
}

fn most_recent_mtime(base: &Path, id: &str) -> std::time::SystemTime {
    let localconfig = base.join(id).join("config").join("localconfig.vdf");
    localconfig
        .metadata()
        .and_then(|m| m.modified())
        .or_else(|_| base.join(id).metadata().and_then(|m| m.modified()))
        .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
}
