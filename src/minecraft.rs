//! Minecraft (Java Edition) world discovery (C8).

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub folder_name: String,
    pub display_name: String,
    pub full_path: PathBuf,
}

/// Resolve the platform's default `.minecraft/saves` root, if present.
pub fn default_saves_root() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        dirs::config_dir().map(|d| d.join(".minecraft").join("saves"))
    }
    #[cfg(target_os = "macos")]
    {
        dirs::home_dir().map(|h| {
            h.join("Library")
                .join("Application Support")
                .join("minecraft")
                .join("saves")
        })
    }
    #[cfg(all(unix, not(target_os = "macos")))]
    {
        dirs::home_dir().map(|h| h.join(".minecraft").join("saves"))
    }
}

/// Every immediate subdirectory of `saves_root` is a world. When
/// `level.dat` is present, `display_name` comes from its `Data.LevelName`
/// NBT tag; malformed or unreadable NBT falls back to the folder name.
pub fn list_worlds(saves_root: &Path) -> Vec<World> {
    let Ok(entries) = std::fs::read_dir(saves_root) else {
        return Vec::new();
    };

    let mut worlds: Vec<World> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|entry| {
            let folder_name = entry.file_name().to_str()?.to_string();
            let full_path = entry.path();
            let display_name = read_level_name(&full_path).unwrap_or_else(|| folder_name.clone());
            Some(World {
                folder_name,
                display_name,
                full_path,
            })
        })
        .collect();

    worlds.sort_by(|a, b| {
        a.display_name
            .to_lowercase()
            .cmp(&b.display_name.to_lowercase())
            .then_with(|| a.folder_name.cmp(&b.folder_name))
    });
    worlds
}

fn read_level_name(world_dir: &Path) -> Option<String> {
    let level_dat = world_dir.join("level.dat");
    let file = std::fs::File::open(&level_dat)
        .inspect_err(|e| log::debug!("no level.dat in {}: {e}", world_dir.display()))
        .ok()?;

    let blob: nbt::Blob = nbt::Blob::from_gzip_reader(&mut std::io::BufReader::new(file))
        .inspect_err(|e| log::warn!("malformed level.dat in {}: {e}", world_dir.display()))
        .ok()?;

    let data = blob.get("Data")?;
    let nbt::Value::Compound(data) = data else {
        return None;
    };
    let name = data.get("LevelName")?;
    match name {
        nbt::Value::String(s) => Some(s.trim().to_string()),
        _ => None,
    }
}
