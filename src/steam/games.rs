//! `appmanifest_*.acf` enumeration for each discovered library.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::vdf::{self, VdfValue};

#[derive(Debug, Clone)]
pub struct InstalledGame {
    pub name: String,
    pub install_dir: PathBuf,
}

/// Scan every library's `steamapps/*.acf`, keyed by app id. An entry must
/// resolve a name and install dir, and is "installed" iff `StateFlags == 4`
/// or its computed install directory exists.
pub fn find_installed_games(libraries: &[PathBuf]) -> HashMap<String, InstalledGame> {
    let mut games = HashMap::new();

    for library in libraries {
        let steamapps = library.join("steamapps");
        let Ok(entries) = std::fs::read_dir(&steamapps) else {
            continue;
        };

        for entry in entries.filter_map(|e| e.ok()) {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let Some(app_id) = file_name
                .strip_prefix("appmanifest_")
                .and_then(|s| s.strip_suffix(".acf"))
            else {
                continue;
            };

            let Ok(content) = std::fs::read_to_string(entry.path()) else {
                continue;
            };

            if let Some(game) = parse_manifest(&content, &steamapps) {
                games.insert(app_id.to_string(), game);
            } else {
                log::debug!("skipping unparseable manifest {}", entry.path().display());
            }
        }
    }

    games
}

fn parse_manifest(content: &str, steamapps: &Path) -> Option<InstalledGame> {
    let root = vdf::parse(content)?;
    let state = find_app_state(&root)?;

    let name = match state.get("name") {
        Some(VdfValue::Leaf(n)) => strip_trademark(n),
        _ => return None,
    };
    let install_dir_name = match state.get("installdir") {
        Some(VdfValue::Leaf(d)) => d.clone(),
        _ => return None,
    };
    let state_flags = match state.get("StateFlags") {
        Some(VdfValue::Leaf(flags)) => flags.as_str(),
        _ => "",
    };

    let install_dir = steamapps.join("common").join(&install_dir_name);
    if state_flags != "4" && !install_dir.is_dir() {
        return None;
    }

    Some(InstalledGame { name, install_dir })
}

fn find_app_state(root: &HashMap<String, VdfValue>) -> Option<&HashMap<String, VdfValue>> {
    root.iter().find_map(|(key, value)| {
        if key.eq_ignore_ascii_case("AppState") {
            if let VdfValue::Block(block) = value {
                return Some(block);
            }
        }
        None
    })
}

fn strip_trademark(name: &str) -> String {
    name.chars().filter(|c| !matches!(c, '™' | '®' | '©')).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(steamapps: &Path, app_id: &str, body: &str) {
        std::fs::create_dir_all(steamapps).unwrap();
        std::fs::write(steamapps.join(format!("appmanifest_{app_id}.acf")), body).unwrap();
    }

    #[test]
    fn finds_game_installed_via_state_flags() {
        let dir = tempfile::tempdir().unwrap();
        let steamapps = dir.path().join("steamapps");
        write_manifest(
            &steamapps,
            "400",
            "\"AppState\"\n{\n    \"name\"\t\t\"Portal\"\n    \"StateFlags\"\t\t\"4\"\n    \"installdir\"\t\t\"Portal\"\n}\n",
        );

        let games = find_installed_games(&[dir.path().to_path_buf()]);
        let game = games.get("400").unwrap();
        assert_eq!(game.name, "Portal");
    }

    #[test]
    fn finds_game_installed_via_existing_install_dir_when_flags_absent() {
        let dir = tempfile::tempdir().unwrap();
        let steamapps = dir.path().join("steamapps");
        std::fs::create_dir_all(steamapps.join("common").join("Portal")).unwrap();
        write_manifest(
            &steamapps,
            "400",
            "\"AppState\"\n{\n    \"name\"\t\t\"Portal\"\n    \"installdir\"\t\t\"Portal\"\n}\n",
        );

        let games = find_installed_games(&[dir.path().to_path_buf()]);
        assert!(games.contains_key("400"));
    }

    #[test]
    fn skips_game_with_neither_flag_nor_install_dir() {
        let dir = tempfile::tempdir().unwrap();
        let steamapps = dir.path().join("steamapps");
        write_manifest(
            &steamapps,
            "400",
            "\"AppState\"\n{\n    \"name\"\t\t\"Portal\"\n    \"installdir\"\t\t\"Portal\"\n}\n",
        );

        let games = find_installed_games(&[dir.path().to_path_buf()]);
        assert!(!games.contains_key("400"));
    }

    #[test]
    fn strips_trademark_glyphs_from_name() {
        let dir = tempfile::tempdir().unwrap();
        let steamapps = dir.path().join("steamapps");
        write_manifest(
            &steamapps,
            "123",
            "\"AppState\"\n{\n    \"name\"\t\t\"Tomb Raider™\"\n    \"StateFlags\"\t\t\"4\"\n    \"installdir\"\t\t\"Tomb Raider\"\n}\n",
        );

        let games = find_installed_games(&[dir.path().to_path_buf()]);
        assert_eq!(games.get("123").unwrap().name, "Tomb Raider");
    }

    #[test]
    fn ignores_manifests_missing_required_keys() {
        let dir = tempfile::tempdir().unwrap();
        let steamapps = dir.path().join("steamapps");
        write_manifest(&steamapps, "1", "\"AppState\"\n{\n    \"appid\"\t\t\"1\"\n}\n");

        let games = find_installed_games(&[dir.path().to_path_buf()]);
        assert!(games.is_empty());
    }
}
