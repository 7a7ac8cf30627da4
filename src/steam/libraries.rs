//! Steam root resolution and library-folder enumeration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::vdf::{self, VdfValue};

#[cfg(target_os = "windows")]
pub fn find_steam_root() -> Option<PathBuf> {
    find_steam_root_registry().or_else(default_steam_root)
}

#[cfg(target_os = "windows")]
fn find_steam_root_registry() -> Option<PathBuf> {
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE};
    use winreg::RegKey;

    for (hive, _label) in [(HKEY_CURRENT_USER, "HKCU"), (HKEY_LOCAL_MACHINE, "HKLM")] {
        let key = RegKey::predef(hive).open_subkey(r"Software\Valve\Steam").ok()?;
        if let Ok(path) = key.get_value::<String, _>("SteamPath") {
            let path = PathBuf::from(path);
            if path.is_dir() {
                return Some(path);
            }
        }
    }
    None
}

#[cfg(target_os = "windows")]
fn default_steam_root() -> Option<PathBuf> {
    let candidate = PathBuf::from(r"C:\Program Files (x86)\Steam");
    candidate.is_dir().then_some(candidate)
}

#[cfg(target_os = "macos")]
pub fn find_steam_root() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let candidate = home.join("Library/Application Support/Steam");
    candidate.is_dir().then_some(candidate)
}

#[cfg(all(unix, not(target_os = "macos")))]
pub fn find_steam_root() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    [
        home.join(".local/share/Steam"),
        home.join(".steam/steam"),
        home.join(".steam/root"),
    ]
    .into_iter()
    .find(|candidate| candidate.is_dir())
}

/// Library roots for this Steam installation, always including `steam_root`
/// itself as library 0. Additional libraries come from `libraryfolders.vdf`;
/// entries whose path is not an existing directory are dropped.
pub fn find_libraries(steam_root: &Path) -> Vec<PathBuf> {
    let mut libraries = vec![steam_root.to_path_buf()];

    let vdf_path = steam_root.join("steamapps").join("libraryfolders.vdf");
    if let Ok(content) = std::fs::read_to_string(&vdf_path) {
        for path in parse_library_paths(&content) {
            if path.is_dir() && !libraries.contains(&path) {
                libraries.push(path);
            }
        }
    }

    libraries
}

fn parse_library_paths(content: &str) -> Vec<PathBuf> {
    let Some(root) = vdf::parse(content) else {
        return Vec::new();
    };

    let mut paths = Vec::new();
    for value in root.values() {
        if let VdfValue::Block(entries) = value {
            collect_library_paths(entries, &mut paths);
        }
    }
    paths
}

/// Walks the numerically-keyed children of a `libraryfolders` block, each of
/// which is either a nested block carrying a `path` leaf (modern shape) or a
/// leaf holding the path directly (legacy shape).
fn collect_library_paths(entries: &HashMap<String, VdfValue>, out: &mut Vec<PathBuf>) {
    for (key, value) in entries {
        if !key.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        match value {
            VdfValue::Block(block) => {
                if let Some(VdfValue::Leaf(path)) = block.get("path") {
                    out.push(unescape_path(path));
                }
            }
            VdfValue::Leaf(path) => out.push(unescape_path(path)),
        }
    }
}

fn unescape_path(raw: &str) -> PathBuf {
    PathBuf::from(raw.replace("\\\\", "\\"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_libraries_always_includes_steam_root() {
        let dir = tempfile::tempdir().unwrap();
        let libraries = find_libraries(dir.path());
        assert_eq!(libraries, vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn find_libraries_adds_additional_modern_entries() {
        let dir = tempfile::tempdir().unwrap();
        let extra_lib = tempfile::tempdir().unwrap();

        let steamapps = dir.path().join("steamapps");
        std::fs::create_dir_all(&steamapps).unwrap();
        let escaped = extra_lib.path().to_string_lossy().replace('\\', "\\\\");
        std::fs::write(
            steamapps.join("libraryfolders.vdf"),
            format!(
                "\"libraryfolders\"\n{{\n    \"1\"\n    {{\n        \"path\"\t\t\"{escaped}\"\n    }}\n}}\n"
            ),
        )
        .unwrap();

        let libraries = find_libraries(dir.path());
        assert_eq!(libraries.len(), 2);
        assert_eq!(libraries[1], extra_lib.path());
    }

    #[test]
    fn find_libraries_drops_nonexistent_entries() {
        let dir = tempfile::tempdir().unwrap();
        let steamapps = dir.path().join("steamapps");
        std::fs::create_dir_all(&steamapps).unwrap();
        std::fs::write(
            steamapps.join("libraryfolders.vdf"),
            "\"libraryfolders\"\n{\n    \"1\"\n    {\n        \"path\"\t\t\"/does/not/exist\"\n    }\n}\n",
        )
        .unwrap();

        let libraries = find_libraries(dir.path());
        assert_eq!(libraries, vec![dir.path().to_path_buf()]);
    }
}
