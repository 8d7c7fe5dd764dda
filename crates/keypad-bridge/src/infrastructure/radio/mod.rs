//! Radio-stack seam: the Bluetooth HID host the bridge sits on top of.
//!
//! The HID host protocol implementation (controller bring-up, L2CAP, the HID
//! host profile itself) is an external collaborator.  The bridge only sees it
//! through two traits:
//!
//! - [`HidHost`] – imperative operations the bridge asks of the stack
//!   (start, connect, advertise settings).
//! - [`HostEventSink`] – the callback surface the stack drives.  The stack
//!   calls it from its own thread, in delivery order, one event at a time.
//!
//! # Implementations
//!
//! - [`event_feed::EventFeedHost`] – reads line-oriented events from stdin or
//!   a replay file on a dedicated thread.  Used by the binary when no radio
//!   hardware is attached.
//! - [`mock::MockHidHost`] – records calls and lets tests inject events.

use std::sync::Arc;

use keypad_core::{HidReport, PeerAddress};
use thiserror::Error;

pub mod event_feed;
pub mod mock;

/// An event delivered by the radio stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HidHostEvent {
    /// The HID host finished its internal bring-up.
    StackReady,
    /// The HID host was torn down.
    StackStopped,
    /// An open notification.  `connected` is `false` when the stack reports
    /// an "open" for an attempt that did not actually connect.
    LinkOpened { connected: bool },
    /// The link to the peripheral went down.
    LinkClosed,
    /// An input report arrived from the peripheral.
    DataIndication(HidReport),
    /// Any other notification (report get/set, protocol, idle, descriptor,
    /// add/remove device, virtual unplug, ...).  Logged only.
    Other { kind: String },
}

impl HidHostEvent {
    /// Short name used in log lines.
    pub fn kind(&self) -> &str {
        match self {
            HidHostEvent::StackReady => "stack-ready",
            HidHostEvent::StackStopped => "stack-stopped",
            HidHostEvent::LinkOpened { .. } => "link-open",
            HidHostEvent::LinkClosed => "link-close",
            HidHostEvent::DataIndication(_) => "data-indication",
            HidHostEvent::Other { kind } => kind,
        }
    }
}

/// Error type for radio host operations.
#[derive(Debug, Error)]
pub enum RadioError {
    #[error("radio host failed to start: {0}")]
    StartFailed(String),
    #[error("radio host has already been started")]
    AlreadyStarted,
    #[error("radio host is not running")]
    NotRunning,
    #[error("connect request to {peer} rejected: {reason}")]
    ConnectRejected { peer: PeerAddress, reason: String },
    #[error("failed to configure radio host: {0}")]
    Configure(String),
    #[error("line {line}: {reason}")]
    MalformedEvent { line: usize, reason: String },
}

/// Longest local name a Bluetooth controller accepts, in bytes.
pub const MAX_DEVICE_NAME_LEN: usize = 248;

/// Checks `name` against the controller's local-name limits.
///
/// # Errors
///
/// Returns [`RadioError::Configure`] for an empty name or one longer than
/// [`MAX_DEVICE_NAME_LEN`] bytes.
pub fn validate_device_name(name: &str) -> Result<(), RadioError> {
    if name.is_empty() {
        return Err(RadioError::Configure("device name is empty".to_string()));
    }
    if name.len() > MAX_DEVICE_NAME_LEN {
        return Err(RadioError::Configure(format!(
            "device name is {} bytes, limit is {MAX_DEVICE_NAME_LEN}",
            name.len()
        )));
    }
    Ok(())
}

/// Receives radio-stack events.  Implemented by the bridge core.
///
/// Called from the stack's own thread.  Implementations must return promptly
/// and must never block on anything the stack itself could be waiting for.
pub trait HostEventSink: Send + Sync {
    fn handle_event(&self, event: HidHostEvent);
}

/// Operations the bridge requests from the radio stack.
pub trait HidHost: Send + Sync {
    /// Starts event delivery to `sink`.
    ///
    /// # Errors
    ///
    /// Bring-up failures are fatal to the bridge.
    fn start(&self, sink: Arc<dyn HostEventSink>) -> Result<(), RadioError>;

    /// Asks the stack to begin connecting to `peer`.
    ///
    /// Returns as soon as the stack accepts or rejects the attempt; the
    /// outcome of the attempt arrives later as a link event.
    fn request_connect(&self, peer: &PeerAddress) -> Result<(), RadioError>;

    /// Sets the name this host advertises to peers.
    ///
    /// # Errors
    ///
    /// Names rejected by [`validate_device_name`] fail with
    /// [`RadioError::Configure`].
    fn set_device_name(&self, name: &str) -> Result<(), RadioError>;

    /// Makes the host connectable (but not discoverable) so previously paired
    /// peripherals can reconnect on their own.
    fn set_connectable(&self, connectable: bool) -> Result<(), RadioError>;
}
