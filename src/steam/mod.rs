//! Steam discovery (C6): registry/VDF/ACF parsing to enumerate installed
//! games, library folders, and the active userdata profile.

mod games;
mod libraries;
mod userdata;
mod vdf;

pub use games::{find_installed_games, InstalledGame};
pub use libraries::{find_libraries, find_steam_root};
pub use userdata::{find_userdata, UserdataInfo};

use std::collections::HashMap;
use std::path::PathBuf;

/// Discovered once per session and cached by the coordinator; cheap to
/// rebuild via [`SteamContext::discover`] on an explicit refresh.
#[derive(Debug, Clone, Default)]
pub struct SteamContext {
    pub steam_root: Option<PathBuf>,
    pub libraries: Vec<PathBuf>,
    pub userdata: Option<UserdataInfo>,
    pub installed_games: HashMap<String, InstalledGame>,
}

impl SteamContext {
    pub fn discover() -> Self {
        let Some(steam_root) = find_steam_root() else {
            log::info!("steam installation not found");
            return Self::default();
        };

        let libraries = find_libraries(&steam_root);
        let installed_games = find_installed_games(&libraries);
        let userdata = find_userdata(&steam_root);

        log::info!(
            "steam: {} libraries, {} installed games",
            libraries.len(),
            installed_games.len()
        );

        Self {
            steam_root: Some(steam_root),
            libraries,
            userdata,
            installed_games,
        }
    }
}
