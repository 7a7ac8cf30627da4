//! Path utilities: standard user roots, normalization, and name sanitization.

use std::path::{Component, Path, PathBuf};

use crate::error::{EngineError, Result};

/// Standard per-OS user roots that the save-path detector and known-pattern
/// table probe. A root is `None` when the platform has no equivalent and
/// callers must skip it rather than substitute something misleading.
#[derive(Debug, Clone, Default)]
pub struct UserRoots {
    pub home: Option<PathBuf>,
    pub documents: Option<PathBuf>,
    pub my_games: Option<PathBuf>,
    pub saved_games: Option<PathBuf>,
    pub appdata_roaming: Option<PathBuf>,
    pub appdata_local: Option<PathBuf>,
    pub appdata_locallow: Option<PathBuf>,
}

impl UserRoots {
    /// Resolve the roots available on the running platform.
    pub fn resolve() -> Self {
        let home = dirs::home_dir();
        let documents = dirs::document_dir().or_else(|| home.clone());
        let my_games = documents.as_ref().map(|d| d.join("My Games"));

        #[cfg(target_os = "windows")]
        let saved_games = home.as_ref().map(|h| h.join("Saved Games"));
        #[cfg(not(target_os = "windows"))]
        let saved_games = None;

        let appdata_roaming = dirs::config_dir();
        let appdata_local = dirs::data_local_dir();

        #[cfg(target_os = "windows")]
        let appdata_locallow = home
            .as_ref()
            .map(|h| h.join("AppData").join("LocalLow"));
        #[cfg(not(target_os = "windows"))]
        let appdata_locallow = None;

        Self {
            home,
            documents,
            my_games,
            saved_games,
            appdata_roaming,
            appdata_local,
            appdata_locallow,
        }
    }

    /// All resolved roots paired with a stable label, skipping unavailable ones.
    pub fn available(&self) -> Vec<(&'static str, &Path)> {
        let mut out = Vec::new();
        let mut push = |name: &'static str, p: &Option<PathBuf>| {
            if let Some(p) = p {
                out.push((name, p.as_path()));
            }
        };
        push("documents", &self.documents);
        push("my_games", &self.my_games);
        push("saved_games", &self.saved_games);
        push("appdata_roaming", &self.appdata_roaming);
        push("appdata_local", &self.appdata_local);
        push("appdata_locallow", &self.appdata_locallow);
        out
    }
}

/// Lexically normalize a path: resolve `.`/`..` components without touching
/// the filesystem, and canonicalize case/separators on Windows.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !matches!(out.components().last(), Some(Component::RootDir) | None) {
                    out.pop();
                }
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }

    #[cfg(target_os = "windows")]
    {
        let mut s = out.to_string_lossy().replace('/', "\\");
        if let Some(rest) = s.strip_prefix(|c: char| c.is_ascii_lowercase()) {
            if rest.starts_with(':') {
                let drive = s.chars().next().unwrap().to_ascii_uppercase();
                s = format!("{drive}{rest}");
            }
        }
        return PathBuf::from(s);
    }

    #[cfg(not(target_os = "windows"))]
    out
}

/// True iff `path` equals the root of its volume (`C:\`, `/`).
pub fn is_filesystem_root(path: &Path) -> bool {
    let mut components = path.components();
    match components.next() {
        Some(Component::RootDir) => components.next().is_none(),
        Some(Component::Prefix(_)) => matches!(components.next(), Some(Component::RootDir))
            && components.next().is_none(),
        _ => false,
    }
}

const RESERVED_DEVICE_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Sanitize a profile name: strip trademark glyphs, replace forbidden
/// characters with `_`, collapse whitespace, trim, and reject reserved
/// device names and empty results.
pub fn sanitize_profile_name(raw: &str) -> Result<String> {
    let stripped: String = raw.chars().filter(|c| !matches!(c, '™' | '®' | '©')).collect();

    let replaced: String = stripped
        .chars()
        .map(|c| {
            if c.is_control() || "<>:\"/\\|?*".contains(c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let collapsed = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let trimmed = collapsed.trim().to_string();

    if trimmed.is_empty() {
        return Err(EngineError::InvalidProfileName(raw.to_string()));
    }

    let base = trimmed.split('.').next().unwrap_or(&trimmed);
    if RESERVED_DEVICE_NAMES
        .iter()
        .any(|r| r.eq_ignore_ascii_case(base))
    {
        return Err(EngineError::InvalidProfileName(raw.to_string()));
    }

    Ok(trimmed)
}

/// Validate a directory intended as a backup source: non-blank, normalized,
/// not a filesystem root, and an existing directory.
pub fn validate_save_path(p: &Path) -> Result<PathBuf> {
    if p.as_os_str().is_empty() {
        return Err(EngineError::InvalidPath("empty path".to_string()));
    }

    let normalized = normalize(p);

    if is_filesystem_root(&normalized) {
        return Err(EngineError::RootNotAllowed(normalized));
    }

    if !normalized.is_dir() {
        return Err(EngineError::NotADirectory(normalized));
    }

    Ok(normalized)
}
