//! Single-instance coordination (C9): one interactive holder at a time. A
//! newly launched instance either becomes the holder or forwards an
//! `activate` message to the existing one over a local named endpoint.

use std::io::{BufRead, BufReader, Write};

use interprocess::local_socket::traits::{Listener as _, Stream as _};
use interprocess::local_socket::{GenericNamespaced, Listener, ListenerOptions, Stream, ToNsName};

use crate::error::{EngineError, Result};

const ENDPOINT_NAME: &str = "save-warden-7c3f2b1a.sock";
pub const ACTIVATE_COMMAND: &str = "activate";

pub struct InstanceLock {
    listener: Listener,
}

pub enum AcquireOutcome {
    /// We now hold the lock and are listening for incoming commands.
    Acquired(InstanceLock),
    /// Another instance holds the lock; `activate` was forwarded to it.
    ForwardedToExisting,
}

/// Attempt to become the sole interactive instance. If one already holds
/// the endpoint, forward `activate` to it instead of failing outright.
pub fn acquire() -> Result<AcquireOutcome> {
    let name = ENDPOINT_NAME
        .to_ns_name::<GenericNamespaced>()
        .map_err(|e| EngineError::IpcSendFailed(e.to_string()))?;

    match ListenerOptions::new().name(name.clone()).create_sync() {
        Ok(listener) => Ok(AcquireOutcome::Acquired(InstanceLock { listener })),
        Err(_) => {
            send_command(ACTIVATE_COMMAND)?;
            Ok(AcquireOutcome::ForwardedToExisting)
        }
    }
}

fn send_command(command: &str) -> Result<()> {
    let name = ENDPOINT_NAME
        .to_ns_name::<GenericNamespaced>()
        .map_err(|e| EngineError::IpcSendFailed(e.to_string()))?;

    let mut stream = Stream::connect(name).map_err(|_| EngineError::LockHeldByOtherInstance)?;
    stream
        .write_all(format!("{command}\n").as_bytes())
        .map_err(|e| EngineError::IpcSendFailed(e.to_string()))
}

impl InstanceLock {
    /// Block on the next incoming connection and return its command line,
    /// if any (unknown commands are the caller's to ignore).
    pub fn accept_one(&self) -> Result<Option<String>> {
        let stream = self
            .listener
            .accept()
            .map_err(|e| EngineError::IpcSendFailed(e.to_string()))?;

        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| EngineError::IpcSendFailed(e.to_string()))?;

        let trimmed = line.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }
}
