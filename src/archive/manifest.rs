//! Embedded manifest routing multi-source archive subtrees back to their
//! originating source directories on restore.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const MANIFEST_NAME: &str = ".save_warden_manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub index: usize,
    pub source: PathBuf,
    /// Archive-internal subtree prefix for this source, empty for a
    /// single-source archive.
    pub prefix: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

/// The subtree prefix an entry at `index` should be written under inside
/// the archive. A lone source uses the archive root; additional sources get
/// a disambiguated `src_<index>` prefix.
pub fn prefix_for(index: usize, total_sources: usize) -> String {
    if total_sources <= 1 {
        String::new()
    } else {
        format!("src_{index}")
    }
}
