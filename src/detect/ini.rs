//! Stage B: walk an install tree for whitelisted `.ini` files and look up
//! a save-path key, falling back to a line-scan for emulator-style markers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::progress::CancellationToken;

const SECTIONS: &[&str] = &["", "settings", "storage", "game", "directories", "paths", "location"];
const KEYS: &[&str] = &["savepath", "appdatapath", "dir_0", "userdatafolder"];

pub fn stage_ini_scan(
    install_dir: &Path,
    whitelist: &[String],
    blacklist: &[String],
    cancel: &CancellationToken,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let mut ini_files = collect_ini_files(install_dir, whitelist, blacklist);

    // Prefer steam_emu.ini first when we fall through to the line-scan pass.
    ini_files.sort_by_key(|path| {
        !path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| n.eq_ignore_ascii_case("steam_emu.ini"))
            .unwrap_or(false)
    });

    for ini_path in &ini_files {
        if cancel.is_cancelled() {
            break;
        }

        let Ok(bytes) = std::fs::read(ini_path) else {
            continue;
        };
        let text = decode_ini(&bytes);
        let sections = parse_sections(&text);

        if let Some(raw_value) = find_save_path_key(&sections) {
            if let Some(resolved) = resolve_candidate(&raw_value, install_dir) {
                candidates.push(resolved);
                continue;
            }
        }

        if let Some(resolved) = line_scan_fallback(&text, install_dir) {
            candidates.push(resolved);
        }
    }

    candidates
}

fn collect_ini_files(install_dir: &Path, whitelist: &[String], blacklist: &[String]) -> Vec<PathBuf> {
    WalkDir::new(install_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_ascii_lowercase();
            if !name.ends_with(".ini") {
                return None;
            }
            if !whitelist.is_empty() && !whitelist.contains(&name) {
                return None;
            }
            if blacklist.contains(&name) {
                return None;
            }
            Some(e.path().to_path_buf())
        })
        .collect()
}

/// Decode with UTF-8, then Windows-1252, then a last-resort byte-as-codepoint
/// Latin-1 mapping that never fails.
fn decode_ini(bytes: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }
    let (cow, _, had_errors) = encoding_rs::WINDOWS_1252.decode(bytes);
    if !had_errors {
        return cow.into_owned();
    }
    bytes.iter().map(|&b| b as char).collect()
}

fn parse_sections(text: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current = String::new();
    sections.entry(current.clone()).or_default();

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            current = name.trim().to_ascii_lowercase();
            sections.entry(current.clone()).or_default();
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            sections
                .entry(current.clone())
                .or_default()
                .insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    sections
}

fn find_save_path_key(sections: &HashMap<String, HashMap<String, String>>) -> Option<String> {
    for section_name in SECTIONS {
        let Some(section) = sections.get(*section_name) else {
            continue;
        };
        for key in KEYS {
            if let Some(value) = section.get(*key) {
                return Some(value.clone());
            }
        }
    }
    None
}

fn line_scan_fallback(text: &str, install_dir: &Path) -> Option<PathBuf> {
    for line in text.lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("### Game data is stored at ") {
            if let Some(resolved) = resolve_candidate(rest.trim(), install_dir) {
                return Some(resolved);
            }
        } else if let Some(rest) = trimmed.strip_prefix("Dir_0=") {
            if let Some(resolved) = resolve_candidate(rest.trim(), install_dir) {
                return Some(resolved);
            }
        }
    }
    None
}

fn resolve_candidate(raw: &str, install_dir: &Path) -> Option<PathBuf> {
    let expanded = expand_env_vars(raw);
    let path = PathBuf::from(expanded);
    let resolved = if path.is_absolute() {
        path
    } else {
        install_dir.join(path)
    };
    let normalized = crate::paths::normalize(&resolved);
    if crate::paths::is_filesystem_root(&normalized) {
        return None;
    }
    normalized.is_dir().then_some(normalized)
}

fn expand_env_vars(raw: &str) -> String {
    let mut result = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '%' => {
                let mut name = String::new();
                let mut closed = false;
                for c2 in chars.by_ref() {
                    if c2 == '%' {
                        closed = true;
                        break;
                    }
                    name.push(c2);
                }
                if closed {
                    if let Ok(value) = std::env::var(&name) {
                        result.push_str(&value);
                        continue;
                    }
                    result.push('%');
                    result.push_str(&name);
                    result.push('%');
                } else {
                    result.push('%');
                    result.push_str(&name);
                }
            }
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                let mut name = String::new();
                for c2 in chars.by_ref() {
                    if c2 == '}' {
                        break;
                    }
                    name.push(c2);
                }
                if let Ok(value) = std::env::var(&name) {
                    result.push_str(&value);
                } else {
                    result.push_str("${");
                    result.push_str(&name);
                    result.push('}');
                }
            }
            other => result.push(other),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_save_path_key_in_known_section() {
        let dir = tempfile::tempdir().unwrap();
        let save_dir = dir.path().join("MySaves");
        std::fs::create_dir_all(&save_dir).unwrap();

        std::fs::write(
            dir.path().join("game.ini"),
            format!("[Storage]\nSavePath={}\n", save_dir.to_string_lossy()),
        )
        .unwrap();

        let cancel = CancellationToken::new();
        let candidates = stage_ini_scan(dir.path(), &[], &[], &cancel);
        assert_eq!(candidates, vec![save_dir]);
    }

    #[test]
    fn falls_back_to_line_scan_marker() {
        let dir = tempfile::tempdir().unwrap();
        let save_dir = dir.path().join("EmuSaves");
        std::fs::create_dir_all(&save_dir).unwrap();

        std::fs::write(
            dir.path().join("steam_emu.ini"),
            format!(
                "[Settings]\nUnrelatedKey=1\n### Game data is stored at {}\n",
                save_dir.to_string_lossy()
            ),
        )
        .unwrap();

        let cancel = CancellationToken::new();
        let candidates = stage_ini_scan(dir.path(), &[], &[], &cancel);
        assert_eq!(candidates, vec![save_dir]);
    }

    #[test]
    fn respects_whitelist() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("X")).unwrap();
        std::fs::write(
            dir.path().join("other.ini"),
            "[Storage]\nSavePath=X\n",
        )
        .unwrap();

        let cancel = CancellationToken::new();
        let candidates = stage_ini_scan(
            dir.path(),
            &["allowed.ini".to_string()],
            &[],
            &cancel,
        );
        assert!(candidates.is_empty());
    }

    #[test]
    fn cancellation_stops_the_scan_early() {
        let dir = tempfile::tempdir().unwrap();
        let save_dir = dir.path().join("X");
        std::fs::create_dir_all(&save_dir).unwrap();
        std::fs::write(dir.path().join("a.ini"), "[Storage]\nSavePath=X\n").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let candidates = stage_ini_scan(dir.path(), &[], &[], &cancel);
        assert!(candidates.is_empty());
    }

    #[test]
    fn expand_env_vars_substitutes_percent_style() {
        std::env::set_var("SAVE_WARDEN_TEST_VAR", "expanded");
        assert_eq!(expand_env_vars("%SAVE_WARDEN_TEST_VAR%/x"), "expanded/x");
        std::env::remove_var("SAVE_WARDEN_TEST_VAR");
    }
}
