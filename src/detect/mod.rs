//! Save-path detector (C7): known patterns, INI scan, common-location
//! probe, and install-dir probe, merged into one ranked candidate list.
//! Runs as an interruptible worker-thread task; cancellation is checked
//! between stages and between files within a stage.

mod common;
mod ini;
mod installdir;
mod patterns;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub use patterns::{BaseKind, KnownPattern, KNOWN_PATTERNS};

use crate::error::Result;
use crate::paths::UserRoots;
use crate::progress::{CancellationToken, ProgressPublisher, StageProgress};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub profile_name_hint: String,
    pub app_id: Option<String>,
    pub game_install_dir: Option<PathBuf>,
    pub steam_userdata: Option<PathBuf>,
    pub ini_whitelist: Vec<String>,
    pub ini_blacklist: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionStatus {
    Found,
    NotFound,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub status: DetectionStatus,
    pub candidates: Vec<PathBuf>,
    pub message: Option<String>,
}

const PREFERRED_BASENAMES: &[&str] = &[
    "saves", "save", "savegame", "savegames", "saved", "storage", "playerdata", "profile",
    "profiles", "user", "data", "savedata",
];

/// Fails fast with `EngineError::Busy` if another detection for this
/// session is already in flight (§5: one detection task at a time).
pub fn detect(
    session: &Session,
    request: &DetectionRequest,
    cancel: &CancellationToken,
    publisher: &ProgressPublisher,
) -> Result<DetectionResult> {
    let _guard = session.enter_detection()?;

    let roots = UserRoots::resolve();
    let mut found = Vec::new();

    publisher.publish(StageProgress {
        stage: "known patterns".to_string(),
        percent: None,
    });
    if let Some(app_id) = &request.app_id {
        found.extend(patterns::stage_known_patterns(
            app_id,
            &roots,
            request.steam_userdata.as_deref(),
            request.game_install_dir.as_deref(),
        ));
    }
    if cancel.is_cancelled() {
        return Ok(cancelled());
    }

    if let Some(install_dir) = &request.game_install_dir {
        publisher.publish(StageProgress {
            stage: "ini scan".to_string(),
            percent: None,
        });
        found.extend(ini::stage_ini_scan(
            install_dir,
            &request.ini_whitelist,
            &request.ini_blacklist,
            cancel,
        ));
        if cancel.is_cancelled() {
            return Ok(cancelled());
        }
    }

    publisher.publish(StageProgress {
        stage: "common locations".to_string(),
        percent: None,
    });
    found.extend(common::stage_common_locations(
        &request.profile_name_hint,
        &roots,
        cancel,
    ));
    if cancel.is_cancelled() {
        return Ok(cancelled());
    }

    if let Some(install_dir) = &request.game_install_dir {
        publisher.publish(StageProgress {
            stage: "install dir probe".to_string(),
            percent: None,
        });
        found.extend(installdir::stage_install_dir_probe(install_dir, cancel));
        if cancel.is_cancelled() {
            return Ok(cancelled());
        }
    }

    let ranked = rank(found);
    log::info!("detector: {} candidate(s) for '{}'", ranked.len(), request.profile_name_hint);

    Ok(if ranked.is_empty() {
        DetectionResult {
            status: DetectionStatus::NotFound,
            candidates: ranked,
            message: None,
        }
    } else {
        DetectionResult {
            status: DetectionStatus::Found,
            candidates: ranked,
            message: None,
        }
    })
}

fn cancelled() -> DetectionResult {
    DetectionResult {
        status: DetectionStatus::Cancelled,
        candidates: Vec::new(),
        message: Some("detection was cancelled".to_string()),
    }
}

/// Deduplicate by normalized path (first-seen order wins), then stable-sort
/// so a preferred basename sorts first; ties break by lowercased path.
fn rank(candidates: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut deduped = Vec::new();
    for candidate in candidates {
        if seen.insert(candidate.clone()) {
            deduped.push(candidate);
        }
    }

    deduped.sort_by(|a, b| {
        let preferred_order = is_preferred(b).cmp(&is_preferred(a));
        preferred_order.then_with(|| lowercase(a).cmp(&lowercase(b)))
    });

    deduped
}

fn is_preferred(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| PREFERRED_BASENAMES.contains(&n.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn lowercase(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}
