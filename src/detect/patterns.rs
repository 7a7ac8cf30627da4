//! Stage A: a small, hand-curated table mapping Steam app ids to a known
//! save-directory template. Data, not code — extend the table freely
//! without touching the detector's control flow.

use std::path::{Path, PathBuf};

use crate::paths::UserRoots;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseKind {
    SteamUserdata,
    AppdataRoaming,
    AppdataLocal,
    AppdataLocallow,
    Documents,
    MyGames,
    SavedGames,
    InstallDir,
    Absolute,
}

#[derive(Debug, Clone, Copy)]
pub struct KnownPattern {
    pub app_id: &'static str,
    pub base_kind: BaseKind,
    pub relative_path: &'static str,
}

pub const KNOWN_PATTERNS: &[KnownPattern] = &[
    KnownPattern {
        app_id: "413150",
        base_kind: BaseKind::AppdataRoaming,
        relative_path: "StardewValley/Saves",
    },
    KnownPattern {
        app_id: "105600",
        base_kind: BaseKind::AppdataRoaming,
        relative_path: "Terraria/Players",
    },
    KnownPattern {
        app_id: "570940",
        base_kind: BaseKind::SavedGames,
        relative_path: "DarkSoulsIII",
    },
    KnownPattern {
        app_id: "814380",
        base_kind: BaseKind::SavedGames,
        relative_path: "SekiroShadowsDieTwice",
    },
    KnownPattern {
        app_id: "1245620",
        base_kind: BaseKind::SteamUserdata,
        relative_path: "EldenRing",
    },
    KnownPattern {
        app_id: "292030",
        base_kind: BaseKind::Documents,
        relative_path: "The Witcher 3/gamesaves",
    },
    KnownPattern {
        app_id: "271590",
        base_kind: BaseKind::Documents,
        relative_path: "Rockstar Games/GTA V/Profiles",
    },
];

/// Resolve one pattern against the current roots/context. Returns `None`
/// if the relevant base is unavailable on this platform or the resulting
/// directory doesn't exist.
pub fn resolve(
    pattern: &KnownPattern,
    roots: &UserRoots,
    steam_userdata: Option<&Path>,
    install_dir: Option<&Path>,
) -> Option<PathBuf> {
    if pattern.base_kind == BaseKind::Absolute {
        let candidate = PathBuf::from(pattern.relative_path);
        return candidate.is_dir().then(|| crate::paths::normalize(&candidate));
    }

    let base = match pattern.base_kind {
        BaseKind::SteamUserdata => steam_userdata?.to_path_buf(),
        BaseKind::AppdataRoaming => roots.appdata_roaming.clone()?,
        BaseKind::AppdataLocal => roots.appdata_local.clone()?,
        BaseKind::AppdataLocallow => roots.appdata_locallow.clone()?,
        BaseKind::Documents => roots.documents.clone()?,
        BaseKind::MyGames => roots.my_games.clone()?,
        BaseKind::SavedGames => roots.saved_games.clone()?,
        BaseKind::InstallDir => install_dir?.to_path_buf(),
        BaseKind::Absolute => unreachable!(),
    };

    let candidate = base.join(pattern.relative_path);
    candidate.is_dir().then(|| crate::paths::normalize(&candidate))
}

pub fn stage_known_patterns(
    app_id: &str,
    roots: &UserRoots,
    steam_userdata: Option<&Path>,
    install_dir: Option<&Path>,
) -> Vec<PathBuf> {
    KNOWN_PATTERNS
        .iter()
        .filter(|pattern| pattern.app_id == app_id)
        .filter_map(|pattern| resolve(pattern, roots, steam_userdata, install_dir))
        .collect()
}
