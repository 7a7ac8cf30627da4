use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::manifest::{self, Manifest, ManifestEntry, MANIFEST_NAME};
use super::{Archive, ARCHIVE_EXTENSION};
use crate::error::{EngineError, Result};
use crate::settings::CompressionMode;

/// Produce exactly one archive file reproducing the union of `sources`.
/// On failure, any partial archive file is removed before returning.
pub fn create(
    profile_name: &str,
    sources: &[PathBuf],
    dest_dir: &Path,
    compression: CompressionMode,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dest_dir)?;
    let archive_path = unique_archive_path(dest_dir, profile_name)?;

    match write_archive(&archive_path, sources, compression) {
        Ok(()) => Ok(archive_path),
        Err(e) => {
            let _ = std::fs::remove_file(&archive_path);
            Err(EngineError::ArchiveCreateFailed(e.to_string()))
        }
    }
}

fn write_archive(archive_path: &Path, sources: &[PathBuf], compression: CompressionMode) -> Result<()> {
    let file = File::create(archive_path)?;
    let mut writer = ZipWriter::new(file);
    let options = zip_options(compression);

    let mut manifest = Manifest::default();

    for (index, source) in sources.iter().enumerate() {
        let prefix = manifest::prefix_for(index, sources.len());
        manifest.entries.push(ManifestEntry {
            index,
            source: source.clone(),
            prefix: prefix.clone(),
        });

        write_source_tree(&mut writer, source, &prefix, options)?;
    }

    if sources.len() > 1 {
        let manifest_json = serde_json::to_vec_pretty(&manifest)
            .map_err(|e| EngineError::ArchiveCreateFailed(e.to_string()))?;
        writer
            .start_file(MANIFEST_NAME, options)
            .map_err(|e| EngineError::ArchiveCreateFailed(e.to_string()))?;
        writer
            .write_all(&manifest_json)
            .map_err(|e| EngineError::ArchiveCreateFailed(e.to_string()))?;
    }

    writer
        .finish()
        .map_err(|e| EngineError::ArchiveCreateFailed(e.to_string()))?;
    Ok(())
}

fn write_source_tree<W: Write + std::io::Seek>(
    writer: &mut ZipWriter<W>,
    source: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    for entry in WalkDir::new(source).follow_links(false) {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let path = entry.path();
        let is_file = if entry.file_type().is_symlink() {
            path.is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }

        let relative = path
            .strip_prefix(source)
            .map_err(|e| EngineError::ArchiveCreateFailed(e.to_string()))?;
        let entry_name = archive_entry_name(prefix, relative);

        writer
            .start_file(&entry_name, options)
            .map_err(|e| EngineError::ArchiveCreateFailed(e.to_string()))?;

        let mut file = File::open(path)?;
        std::io::copy(&mut file, writer)?;
    }
    Ok(())
}

fn archive_entry_name(prefix: &str, relative: &Path) -> String {
    let rel = relative.to_string_lossy().replace('\\', "/");
    if prefix.is_empty() {
        rel
    } else {
        format!("{prefix}/{rel}")
    }
}

fn zip_options(mode: CompressionMode) -> SimpleFileOptions {
    let base = SimpleFileOptions::default().unix_permissions(0o644);
    match mode {
        CompressionMode::Stored => base.compression_method(CompressionMethod::Stored),
        CompressionMode::Standard => base
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(6)),
        CompressionMode::Maximum => base
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9)),
    }
}

/// Build a unique `Backup_<name>_<timestamp>.<ext>` path, retrying with a
/// `-NN` suffix on a same-second collision.
fn unique_archive_path(dest_dir: &Path, profile_name: &str) -> Result<PathBuf> {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let base_name = format!("Backup_{profile_name}_{timestamp}");

    let plain = dest_dir.join(format!("{base_name}.{ARCHIVE_EXTENSION}"));
    if !plain.exists() {
        return Ok(plain);
    }

    for suffix in 1..100u32 {
        let candidate = dest_dir.join(format!("{base_name}-{suffix:02}.{ARCHIVE_EXTENSION}"));
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(EngineError::ArchiveCreateFailed(
        "could not allocate a unique archive name".to_string(),
    ))
}

/// Extract `archive` into `dest_dirs`. Overwrites colliding files; never
/// deletes anything present in `dest_dirs` but absent from the archive.
/// `dest_dirs` must be in the same order as the profile's source paths.
pub fn extract(archive: &Path, dest_dirs: &[PathBuf]) -> Result<()> {
    do_extract(archive, dest_dirs).map_err(|e| EngineError::ArchiveExtractFailed(e.to_string()))
}

fn do_extract(archive: &Path, dest_dirs: &[PathBuf]) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| EngineError::ArchiveExtractFailed(e.to_string()))?;

    let manifest = read_manifest(&mut zip);

    for i in 0..zip.len() {
        let mut entry = zip
            .by_index(i)
            .map_err(|e| EngineError::ArchiveExtractFailed(e.to_string()))?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        if name == MANIFEST_NAME {
            continue;
        }

        let Some((dest_root, relative)) = route_entry(&name, &manifest, dest_dirs) else {
            log::warn!("skipping archive entry with no destination: {name}");
            continue;
        };

        let out_path = dest_root.join(relative);
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out_file = File::create(&out_path)?;
        std::io::copy(&mut entry, &mut out_file)?;
    }

    Ok(())
}

fn read_manifest<R: Read + std::io::Seek>(zip: &mut ZipArchive<R>) -> Option<Manifest> {
    let mut entry = zip.by_name(MANIFEST_NAME).ok()?;
    let mut contents = String::new();
    entry.read_to_string(&mut contents).ok()?;
    serde_json::from_str(&contents).ok()
}

fn route_entry(
    name: &str,
    manifest: &Option<Manifest>,
    dest_dirs: &[PathBuf],
) -> Option<(PathBuf, PathBuf)> {
    match manifest {
        None => dest_dirs.first().map(|d| (d.clone(), PathBuf::from(name))),
        Some(manifest) => {
            for entry in &manifest.entries {
                if entry.prefix.is_empty() {
                    if !name.contains('/') || !name.starts_with("src_") {
                        if let Some(dest) = dest_dirs.get(entry.index) {
                            return Some((dest.clone(), PathBuf::from(name)));
                        }
                    }
                } else if let Some(rest) = name.strip_prefix(&format!("{}/", entry.prefix)) {
                    if let Some(dest) = dest_dirs.get(entry.index) {
                        return Some((dest.clone(), PathBuf::from(rest)));
                    }
                }
            }
            None
        }
    }
}

/// Enumerate a profile's archives, ordered by modification time ascending.
pub fn list(profile_dir: &Path) -> Result<Vec<Archive>> {
    if !profile_dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut archives = Vec::new();
    for entry in std::fs::read_dir(profile_dir)? {
        let entry = entry?;
        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !file_name.starts_with("Backup_") || !file_name.ends_with(&format!(".{ARCHIVE_EXTENSION}")) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        archives.push(Archive {
            path: path.clone(),
            modified: meta.modified()?,
            size: meta.len(),
        });
    }

    archives.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    Ok(archives)
}

/// Delete the oldest archives until at most `keep` remain. Deletion
/// failures are logged and skipped rather than aborting the whole pass;
/// the number of failures is returned.
pub fn prune(profile_dir: &Path, keep: u32) -> Result<usize> {
    let archives = list(profile_dir)?;
    let keep = keep as usize;
    if archives.len() <= keep {
        return Ok(0);
    }

    let to_remove = &archives[..archives.len() - keep];
    let mut failures = 0;
    for archive in to_remove {
        if let Err(e) = std::fs::remove_file(&archive.path) {
            log::warn!("failed to prune archive {}: {e}", archive.path.display());
            failures += 1;
        }
    }

    Ok(failures)
}
