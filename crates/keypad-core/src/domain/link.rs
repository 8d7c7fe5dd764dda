//! Link-state vocabulary for the keypad connection.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──initialize──► Closed
//!       │                          │
//!       └──────stack ready─────────┴──► Ready ──initiate──► Connecting
//!                                                              │
//!                                   ┌──────────────────────────┤
//!                                   ▼                          ▼
//!                               Connected ◄──── link ────► Closed
//! ```
//!
//! There is no terminal state: after the startup attempt resolves, the keypad
//! may drop and re-establish the link any number of times.

use std::fmt;

/// Current state of the peripheral link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    /// Nothing has been set up yet.
    #[default]
    Uninitialized,
    /// The radio stack finished its own bring-up.  No link exists yet.
    Ready,
    /// A connection attempt was handed to the stack and has not resolved.
    Connecting,
    /// The link is up and reports may arrive.
    Connected,
    /// The link is down (also the rest state after initialization).
    Closed,
}

impl ConnectionState {
    /// `true` once the link has either come up or gone down.
    pub fn is_resolved(self) -> bool {
        matches!(self, ConnectionState::Connected | ConnectionState::Closed)
    }

    /// Resolution this state corresponds to, if it is resolved.
    pub fn resolution(self) -> Option<Resolution> {
        match self {
            ConnectionState::Connected => Some(Resolution::Connected),
            ConnectionState::Closed => Some(Resolution::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Uninitialized => "uninitialized",
            ConnectionState::Ready => "ready",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Outcome of waiting for the link to settle.
///
/// A timeout is an ordinary outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    Connected,
    Closed,
    TimedOut,
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resolution::Connected => "connected",
            Resolution::Closed => "closed",
            Resolution::TimedOut => "timed out",
        };
        f.write_str(s)
    }
}
