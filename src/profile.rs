//! Profile: a named, sanitized label owning one or more source directories.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::paths::{sanitize_profile_name, validate_save_path};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub paths: Vec<PathBuf>,
}

impl Profile {
    /// Validate and construct a profile: sanitizes `name`, validates every
    /// path in `paths`, and requires at least one path.
    pub fn new(name: &str, paths: Vec<PathBuf>) -> Result<Self> {
        let name = sanitize_profile_name(name)?;

        if paths.is_empty() {
            return Err(crate::error::EngineError::InvalidPath(
                "profile must have at least one source path".to_string(),
            ));
        }

        let validated = paths
            .iter()
            .map(|p| validate_save_path(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            paths: validated,
        })
    }
}
