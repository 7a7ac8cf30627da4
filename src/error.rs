//! Crate-wide error taxonomy.
//!
//! Leaf components return one of these kinds plus a message; they never
//! format anything for display themselves. The orchestrator (`backup`)
//! aggregates failures into a single user-facing result.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    // -- Configuration --
    #[error("profile name is invalid: {0}")]
    InvalidProfileName(String),

    #[error("path is invalid: {0}")]
    InvalidPath(String),

    #[error("path is a filesystem root: {}", .0.display())]
    RootNotAllowed(PathBuf),

    #[error("path is not an existing directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("settings are invalid: {0}")]
    SettingsInvalid(String),

    // -- Store --
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("profile store I/O failure: {0}")]
    StoreIoFailure(String),

    #[error("profile store is corrupt, recovered as empty")]
    StoreCorrupt,

    // -- Audit --
    #[error("source size {measured} bytes exceeds the configured maximum of {limit} bytes")]
    SourceTooLarge { measured: u64, limit: u64 },

    #[error("insufficient destination free space: {free} bytes free, {required} bytes required")]
    InsufficientSpace { free: u64, required: u64 },

    // -- Archive --
    #[error("archive creation failed: {0}")]
    ArchiveCreateFailed(String),

    #[error("archive extraction failed: {0}")]
    ArchiveExtractFailed(String),

    #[error("archive path is not under the backup root: {}", .0.display())]
    ArchiveNotUnderBackupRoot(PathBuf),

    #[error("{failed} of {attempted} archives could not be pruned")]
    PruneFailedPartial { failed: usize, attempted: usize },

    // -- Discovery --
    #[error("steam installation root could not be located")]
    SteamRootNotFound,

    #[error("failed to parse VDF/ACF data: {0}")]
    VdfParseError(String),

    #[error("minecraft saves root could not be located")]
    MinecraftRootNotFound,

    #[error("failed to parse NBT data: {0}")]
    NbtParseError(String),

    // -- Concurrency --
    #[error("an operation of this kind is already in progress")]
    Busy,

    #[error("operation was cancelled")]
    Cancelled,

    // -- IPC --
    #[error("another instance already holds the single-instance lock")]
    LockHeldByOtherInstance,

    #[error("failed to send IPC message: {0}")]
    IpcSendFailed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
