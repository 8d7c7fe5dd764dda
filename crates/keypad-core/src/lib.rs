//! # keypad-core
//!
//! Shared domain types for keypad-bridge: input-report decoding, the key to
//! action table, peer addressing, and the link-state vocabulary used by the
//! connection state machine.
//!
//! This crate has no dependencies on a radio stack, a network socket, or an
//! async runtime.  Everything here is plain data plus pure functions, so it
//! can be tested on any host.
//!
//! # Architecture overview
//!
//! keypad-bridge turns key presses on a paired Bluetooth keypad into HTTP
//! requests against a small action server.  The moving parts are:
//!
//! - **`domain::report`** – Decodes the 9-byte input report the keypad sends
//!   into at most one [`KeyEvent`].
//!
//! - **`domain::actions`** – The [`KeyActionTable`]: which key code triggers
//!   which action path on the server.
//!
//! - **`domain::link`** – [`ConnectionState`] and [`Resolution`], the states
//!   and outcomes of the peripheral link.
//!
//! - **`domain::peer`** – [`PeerAddress`], the 6-byte Bluetooth device address
//!   of the keypad.
//!
//! - **`keymap`** – USB HID usage IDs for the keys the bridge cares about,
//!   with the names used in configuration files.

pub mod domain;
pub mod keymap;

pub use domain::actions::{KeyActionTable, KeyTableError};
pub use domain::link::{ConnectionState, Resolution};
pub use domain::peer::{PeerAddress, PeerAddressError};
pub use domain::report::{decode, HidReport, KeyEvent, ReportStatus};
pub use keymap::hid::HidKeyCode;
