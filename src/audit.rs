//! Free-space and size auditing (C4).

use std::collections::HashSet;
use std::path::Path;

use rayon::prelude::*;
use sysinfo::Disks;
use walkdir::WalkDir;

use crate::error::{EngineError, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct Measurement {
    pub bytes: u64,
    pub skipped_entries: u64,
}

/// Sum the size of every regular file reachable from each source. Directory
/// symlinks that point outside their own source tree are not followed;
/// file symlinks are counted as files. Hardlinked files are counted once.
pub fn measure(sources: &[impl AsRef<Path>]) -> Measurement {
    let partials: Vec<Measurement> = sources
        .par_iter()
        .map(|src| measure_one(src.as_ref()))
        .collect();

    partials.into_iter().fold(Measurement::default(), |mut acc, m| {
        acc.bytes += m.bytes;
        acc.skipped_entries += m.skipped_entries;
        acc
    })
}

fn measure_one(source: &Path) -> Measurement {
    let mut bytes: u64 = 0;
    let mut skipped: u64 = 0;
    let mut seen_inodes: HashSet<(u64, u64)> = HashSet::new();

    let walker = WalkDir::new(source).follow_links(false).into_iter();
    for entry in walker.filter_map(|e| e.ok()) {
        let path = entry.path();
        if entry.file_type().is_symlink() && path.is_dir() {
            // Directory symlink escaping the source tree: don't descend.
            continue;
        }

        let is_file = if entry.file_type().is_symlink() {
            path.is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }

        match std::fs::metadata(path) {
            Ok(meta) => {
                if !dedupe_key(&meta).map(|key| !seen_inodes.insert(key)).unwrap_or(false) {
                    bytes += meta.len();
                }
            }
            Err(_) => skipped += 1,
        }
    }

    Measurement {
        bytes,
        skipped_entries: skipped,
    }
}

#[cfg(unix)]
fn dedupe_key(meta: &std::fs::Metadata) -> Option<(u64, u64)> {
    use std::os::unix::fs::MetadataExt;
    Some((meta.dev(), meta.ino()))
}

#[cfg(not(unix))]
fn dedupe_key(_meta: &std::fs::Metadata) -> Option<(u64, u64)> {
    None
}

/// Require that `dest_dir`'s volume has at least `required_bytes +
/// margin_bytes` free. Creates `dest_dir` if missing, to anchor the
/// measurement to the right volume.
pub fn check(dest_dir: &Path, required_bytes: u64, margin_bytes: u64) -> Result<()> {
    std::fs::create_dir_all(dest_dir)?;

    let needed = required_bytes.saturating_add(margin_bytes);
    let free = free_bytes(dest_dir);

    if free < needed {
        return Err(EngineError::InsufficientSpace {
            free,
            required: needed,
        });
    }

    Ok(())
}

fn free_bytes(dest_dir: &Path) -> u64 {
    let canonical = std::fs::canonicalize(dest_dir).unwrap_or_else(|_| dest_dir.to_path_buf());
    let disks = Disks::new_with_refreshed_list();

    let mut best_match_len = 0usize;
    let mut best_free = 0u64;
    for disk in disks.list() {
        let mount = disk.mount_point();
        if canonical.starts_with(mount) {
            let len = mount.as_os_str().len();
            if len >= best_match_len {
                best_match_len = len;
                best_free = disk.available_space();
            }
        }
    }

    best_free
}
