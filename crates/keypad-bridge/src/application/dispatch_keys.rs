//! KeyDispatcher: turns decoded key events into queued action requests.
//!
//! [`KeyDispatcher::dispatch`] runs on the radio stack's event thread, so it
//! must never wait on the network.  It looks the key up in the
//! [`KeyActionTable`] and pushes the action onto a bounded queue with
//! `try_send`.  A separate sender task ([`run_sender`]) drains the queue and
//! performs the requests through an [`ActionSender`].
//!
//! ```text
//! stack thread                      tokio runtime
//! ────────────                      ─────────────
//! dispatch(KeyEvent)
//!   └─ table lookup
//!   └─ try_send ──► [bounded queue] ──► run_sender ──► ActionSender::send_action
//! ```
//!
//! When the queue is full the request is dropped and counted; the stack
//! thread is never stalled by a slow server.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;

use async_trait::async_trait;
use keypad_core::{KeyActionTable, KeyEvent};
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Error type for a single action request.
///
/// These never leave the sender task: they are logged and counted.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("action server unreachable: {0}")]
    Unreachable(String),
    #[error("action server answered with status {status}")]
    Rejected { status: u16 },
    #[error("action request failed: {0}")]
    Protocol(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

/// Trait for performing an action request against the remote server.
///
/// Fire-and-forget from the bridge's point of view: the result is only logged.
#[async_trait]
pub trait ActionSender: Send + Sync {
    async fn send_action(&self, action_path: &str) -> Result<(), SendError>;
}

/// A queued request: the action path plus the key that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub code: u8,
    pub action: String,
}

/// What `dispatch` did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The action was queued for the sender task.
    Queued,
    /// All keys released (code 0); nothing to do.
    Released,
    /// The key has no action.
    Unmapped,
    /// The queue was full; the request was dropped.
    QueueFull,
    /// The sender task is gone; the request was dropped.
    SenderGone,
}

/// Counters for diagnostics.
#[derive(Debug, Default)]
pub struct DispatchStats {
    queued: AtomicU64,
    unmapped: AtomicU64,
    dropped: AtomicU64,
    sent: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`DispatchStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSnapshot {
    pub queued: u64,
    pub unmapped: u64,
    pub dropped: u64,
    pub sent: u64,
    pub failed: u64,
}

impl DispatchStats {
    pub fn snapshot(&self) -> DispatchSnapshot {
        DispatchSnapshot {
            queued: self.queued.load(Ordering::Relaxed),
            unmapped: self.unmapped.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            sent: self.sent.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Maps key events to actions and hands them to the sender task.
#[derive(Clone)]
pub struct KeyDispatcher {
    table: Arc<KeyActionTable>,
    queue: mpsc::Sender<ActionRequest>,
    stats: Arc<DispatchStats>,
}

impl KeyDispatcher {
    /// Creates a dispatcher and returns it together with the queue receiver
    /// the sender task should drain.
    ///
    /// A `capacity` of zero is raised to one.
    pub fn new(
        table: Arc<KeyActionTable>,
        capacity: usize,
    ) -> (Self, mpsc::Receiver<ActionRequest>) {
        let (queue, rx) = mpsc::channel(capacity.max(1));
        let dispatcher = Self {
            table,
            queue,
            stats: Arc::new(DispatchStats::default()),
        };
        (dispatcher, rx)
    }

    /// Looks up `event` and queues its action.  Never blocks.
    pub fn dispatch(&self, event: KeyEvent) -> DispatchOutcome {
        if event.is_release() {
            debug!("keys released");
            return DispatchOutcome::Released;
        }

        let Some(action) = self.table.lookup(event.code) else {
            self.stats.unmapped.fetch_add(1, Ordering::Relaxed);
            warn!("received unknown key press: 0x{:02x}", event.code);
            return DispatchOutcome::Unmapped;
        };

        info!("received key press: 0x{:02x} -> '{action}'", event.code);
        let request = ActionRequest {
            code: event.code,
            action: action.to_string(),
        };
        match self.queue.try_send(request) {
            Ok(()) => {
                self.stats.queued.fetch_add(1, Ordering::Relaxed);
                DispatchOutcome::Queued
            }
            Err(TrySendError::Full(request)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(action = %request.action, "action queue full - dropping request");
                DispatchOutcome::QueueFull
            }
            Err(TrySendError::Closed(request)) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(action = %request.action, "sender task has stopped - dropping request");
                DispatchOutcome::SenderGone
            }
        }
    }

    pub fn stats(&self) -> DispatchSnapshot {
        self.stats.snapshot()
    }

    /// Shared handle to the counters, for the sender task.
    pub fn stats_handle(&self) -> Arc<DispatchStats> {
        Arc::clone(&self.stats)
    }
}

/// Drains the action queue until every dispatcher handle has been dropped.
pub async fn run_sender(
    mut queue: mpsc::Receiver<ActionRequest>,
    sender: Arc<dyn ActionSender>,
    stats: Arc<DispatchStats>,
) {
    while let Some(request) = queue.recv().await {
        match sender.send_action(&request.action).await {
            Ok(()) => {
                stats.sent.fetch_add(1, Ordering::Relaxed);
                debug!(action = %request.action, "action request completed");
            }
            Err(e) => {
                stats.failed.fetch_add(1, Ordering::Relaxed);
                warn!(action = %request.action, "action request failed: {e}");
            }
        }
    }
    debug!("action queue closed; sender task exiting");
}

/// Spawns [`run_sender`] on the current Tokio runtime.
pub fn spawn_sender_task(
    queue: mpsc::Receiver<ActionRequest>,
    sender: Arc<dyn ActionSender>,
    stats: Arc<DispatchStats>,
) -> JoinHandle<()> {
    tokio::spawn(run_sender(queue, sender, stats))
}
