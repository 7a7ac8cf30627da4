//! Stage C: probe each standard user root for the profile name (and
//! publisher-prefixed variants of it), trying a curated suffix set.

use std::path::{Path, PathBuf};

use crate::paths::{normalize, sanitize_profile_name, UserRoots};
use crate::progress::CancellationToken;

const SUFFIXES: &[&str] = &["Saves", "Save", "SaveGame", "SaveGames", "Saved", "storage", "PlayerData"];

/// Treated as configurable data, not code: a caller-supplied list should
/// eventually replace this default.
const PUBLISHERS: &[&str] = &[
    "CD Projekt Red",
    "Rockstar Games",
    "Ubisoft",
    "Electronic Arts",
    "HelloGames",
    "FromSoftware",
];

pub fn stage_common_locations(
    profile_hint: &str,
    roots: &UserRoots,
    cancel: &CancellationToken,
) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let variants = name_variants(profile_hint);

    for (_label, root) in roots.available() {
        if cancel.is_cancelled() {
            return candidates;
        }

        for variant in &variants {
            probe_variant(&mut candidates, root, variant);
        }

        for publisher in PUBLISHERS {
            let publisher_root = root.join(publisher);
            for variant in &variants {
                probe_variant(&mut candidates, &publisher_root, variant);
            }
        }
    }

    candidates
}

fn probe_variant(out: &mut Vec<PathBuf>, root: &Path, variant: &str) {
    let base = root.join(variant);
    push_existing(out, &base);
    for suffix in SUFFIXES {
        push_existing(out, &base.join(suffix));
    }
}

fn push_existing(out: &mut Vec<PathBuf>, path: &Path) {
    if path.is_dir() {
        out.push(normalize(path));
    }
}

/// Sanitized, original, and whitespace-stripped spellings of the hint.
pub fn name_variants(profile_hint: &str) -> Vec<String> {
    let sanitized = sanitize_profile_name(profile_hint).unwrap_or_else(|_| profile_hint.to_string());
    let no_spaces: String = sanitized.chars().filter(|c| !c.is_whitespace()).collect();

    let mut variants = vec![sanitized, profile_hint.to_string(), no_spaces];
    variants.sort();
    variants.dedup();
    variants
}
