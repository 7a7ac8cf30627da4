//! Cooperative cancellation and stage-progress plumbing shared by the
//! save-path detector (C7) and any other long-running worker-thread task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// A single progress message published from a worker thread to the UI
/// coordinator. `stage` is a short human label ("known patterns", "ini
/// scan: Foo.ini"); `percent` is indeterminate (`None`) unless the stage
/// knows its own item count.
#[derive(Debug, Clone)]
pub struct StageProgress {
    pub stage: String,
    pub percent: Option<u8>,
}

/// A bounded (capacity 1) progress publisher: only the newest snapshot is
/// ever queued, so a slow UI thread never backs up a fast worker. Keeps its
/// own clone of the receiver purely to drop a stale snapshot before pushing
/// a fresher one; the consumer's `Receiver` returned from `new` is never
/// touched by `publish`.
pub struct ProgressPublisher {
    tx: Sender<StageProgress>,
    peek_rx: Receiver<StageProgress>,
}

impl ProgressPublisher {
    pub fn new() -> (Self, Receiver<StageProgress>) {
        let (tx, rx) = bounded(1);
        let peek_rx = rx.clone();
        (Self { tx, peek_rx }, rx)
    }

    pub fn publish(&self, progress: StageProgress) {
        match self.tx.try_send(progress) {
            Ok(()) | Err(TrySendError::Disconnected(_)) => {}
            Err(TrySendError::Full(progress)) => {
                match self.peek_rx.try_recv() {
                    Ok(_) | Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => return,
                }
                let _ = self.tx.try_send(progress);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancellation_token_starts_uncancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancellation_token_is_shared_across_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn publish_never_blocks_on_a_full_channel() {
        let (publisher, rx) = ProgressPublisher::new();
        publisher.publish(StageProgress {
            stage: "a".into(),
            percent: None,
        });
        publisher.publish(StageProgress {
            stage: "b".into(),
            percent: Some(50),
        });
        let received = rx.try_recv().unwrap();
        assert_eq!(received.stage, "b");
    }
}
