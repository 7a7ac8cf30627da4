//! Session-level concurrency guards (§5): at most one backup/restore and
//! one detection task may be in flight per session. A second attempt of
//! the same class fails fast with `EngineError::Busy` rather than queuing
//! or blocking behind the first.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{EngineError, Result};

#[derive(Clone, Default)]
pub struct Session {
    backup_restore_active: Arc<AtomicBool>,
    detection_active: Arc<AtomicBool>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the backup/restore slot for the caller's scope. Dropping the
    /// returned guard releases it, so a guard should be held for exactly
    /// the duration of one backup or restore call.
    pub fn enter_backup_restore(&self) -> Result<OperationGuard> {
        claim(&self.backup_restore_active)
    }

    /// Claim the detection slot for the caller's scope.
    pub fn enter_detection(&self) -> Result<OperationGuard> {
        claim(&self.detection_active)
    }
}

fn claim(flag: &Arc<AtomicBool>) -> Result<OperationGuard> {
    flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .map_err(|_| EngineError::Busy)?;
    Ok(OperationGuard { flag: flag.clone() })
}

/// Releases its session slot when dropped, including on an early return
/// via `?` from the guarded call.
pub struct OperationGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
