//! LinkStateMachine: owns the keypad link state.
//!
//! The radio stack drives the transition handlers (`on_stack_ready`,
//! `on_link_opened`, `on_link_closed`) from its own thread.  A controller task
//! calls [`LinkStateMachine::initiate_connect`] once at startup and then
//! suspends in [`LinkStateMachine::wait_resolved`] until the link either comes
//! up, goes down, or the timeout expires.
//!
//! # Synchronization
//!
//! The state lives in a `tokio::sync::watch` channel.  Every handler performs
//! its read-modify-write inside `send_if_modified`, which holds the channel's
//! write lock for the duration of the closure and wakes waiters when it
//! returns.  Two handlers therefore never interleave, and there is no window
//! in which a state change is visible without its wake-up having been
//! issued.  Handlers never wait for anything else, so the stack thread is
//! never held up by a waiting controller.
//!
//! Waiters re-check the current value before sleeping (`wait_for`), so a
//! state that was reached before the wait started resolves immediately.

use std::time::Duration;

use keypad_core::{ConnectionState, PeerAddress, Resolution};
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::infrastructure::radio::{HidHost, RadioError};

/// The connection lifecycle state machine for the keypad link.
pub struct LinkStateMachine {
    state: watch::Sender<ConnectionState>,
}

impl LinkStateMachine {
    /// Creates a state machine in [`ConnectionState::Uninitialized`].
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Uninitialized);
        Self { state }
    }

    /// Moves the machine into its rest state, [`ConnectionState::Closed`].
    ///
    /// Only the first call has an effect; returns `true` if this call
    /// performed the initialization.
    pub fn initialize(&self) -> bool {
        let initialized = self.state.send_if_modified(|state| {
            if *state == ConnectionState::Uninitialized {
                *state = ConnectionState::Closed;
                true
            } else {
                false
            }
        });
        if initialized {
            debug!("link state initialized");
        }
        initialized
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change, for diagnostics.
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// The radio stack finished its internal bring-up.
    pub fn on_stack_ready(&self) {
        self.transition("stack ready", |_| ConnectionState::Ready);
    }

    /// The stack reported an open notification.
    ///
    /// Some stacks report "open" for attempts that did not connect; those
    /// carry `connected == false` and leave the state untouched.
    pub fn on_link_opened(&self, connected: bool) {
        if !connected {
            debug!(state = %self.state(), "ignoring open notification without a connection");
            return;
        }
        self.transition("link open", |_| ConnectionState::Connected);
    }

    /// The link went down.  Valid in any state, including repeated calls.
    pub fn on_link_closed(&self) {
        self.transition("link close", |_| ConnectionState::Closed);
    }

    /// Asks `host` to begin connecting to `peer`.
    ///
    /// Returns once the stack has accepted or rejected the attempt.  A
    /// rejection is logged and returned, but the link state is left in
    /// `Connecting`: the outcome of the attempt and the outcome of asking for
    /// it are independent, and a waiter will simply time out.
    ///
    /// # Errors
    ///
    /// Returns the stack's [`RadioError`] if it refused to start the attempt.
    pub fn initiate_connect(&self, host: &dyn HidHost, peer: &PeerAddress) -> Result<(), RadioError> {
        self.transition("connect request", |state| match state {
            ConnectionState::Connected => ConnectionState::Connected,
            _ => ConnectionState::Connecting,
        });

        info!(%peer, "connection attempt initializing");
        host.request_connect(peer).map_err(|e| {
            error!(%peer, "failed to initialize connection attempt: {e}");
            e
        })
    }

    /// Suspends the calling task until the link is `Connected` or `Closed`,
    /// or until `timeout` elapses.
    ///
    /// The state is a single value, so "connected" and "closed" can never be
    /// observed together; whichever the latest handler wrote is returned.
    pub async fn wait_resolved(&self, timeout: Duration) -> Resolution {
        let mut rx = self.state.subscribe();
        let resolution = match tokio::time::timeout(timeout, rx.wait_for(|s| s.is_resolved())).await
        {
            Ok(Ok(state)) => state.resolution().unwrap_or(Resolution::TimedOut),
            // The sender lives in `self`, so the channel cannot close while we wait.
            Ok(Err(_)) => Resolution::Closed,
            Err(_) => Resolution::TimedOut,
        };
        debug!(%resolution, "link wait finished");
        resolution
    }

    /// Applies `next` under the write lock and logs the change, if any.
    fn transition(
        &self,
        cause: &'static str,
        next: impl FnOnce(ConnectionState) -> ConnectionState,
    ) {
        let mut from = ConnectionState::Uninitialized;
        let mut to = ConnectionState::Uninitialized;
        let changed = self.state.send_if_modified(|state| {
            from = *state;
            to = next(*state);
            *state = to;
            from != to
        });

        if changed {
            info!(%from, %to, "link state changed on {cause}");
        } else {
            debug!(state = %to, "{cause}: link state unchanged");
        }
    }
}

impl Default for LinkStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
