//! Input-report decoding.
//!
//! # Report layout
//!
//! The keypad sends one 9-byte report on every key-down and key-up:
//!
//! ```text
//! offset  0     1     2     3     4     5     6     7     8
//!       +-----+-----+-----+-----+-----+-----+-----+-----+-----+
//!       | 01  | 00  | 00  | k0  | k1  | k2  | k3  | k4  | k5  |
//!       +-----+-----+-----+-----+-----+-----+-----+-----+-----+
//!        report id, modifiers,   keys currently held down
//!        reserved
//! ```
//!
//! The layout is dictated by the radio stack's report format; the bridge only
//! reads it.
//!
//! # Single-key assumption
//!
//! Only the first key slot (offset 3) is read.  With one key held the slot
//! holds that key; when it is released the slot goes back to `0x00`.  A chord
//! of several keys decodes as whichever key occupies the first slot, and the
//! rest are lost.  This is a known limitation of the bridge, not something to
//! paper over here.

use crate::keymap::hid::HidKeyCode;

/// Length of a qualifying keyboard input report.
pub const KEYBOARD_REPORT_LEN: usize = 9;

/// Offset of the first "currently pressed" key slot.
pub const KEY_SLOT_OFFSET: usize = 3;

/// Status code the radio stack attaches to each data indication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    /// The report was received intact.
    Ok,
    /// The stack flagged the report with a non-zero status code.
    Failed(u8),
}

impl ReportStatus {
    /// Maps a raw stack status code, where `0` means success.
    pub fn from_code(code: u8) -> Self {
        if code == 0 {
            ReportStatus::Ok
        } else {
            ReportStatus::Failed(code)
        }
    }
}

/// A raw input report as delivered by one data-indication event.
///
/// Transient: built per callback and dropped once decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HidReport {
    pub status: ReportStatus,
    pub data: Vec<u8>,
}

impl HidReport {
    pub fn new(status: ReportStatus, data: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            data: data.into(),
        }
    }

    /// Number of payload bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A single decoded key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: u8,
}

impl KeyEvent {
    pub fn new(code: u8) -> Self {
        Self { code }
    }

    /// Named key for this code, if the keymap knows it.
    pub fn key(&self) -> Option<HidKeyCode> {
        HidKeyCode::from_u8(self.code)
    }

    /// `true` for the all-keys-released report (first slot empty).
    pub fn is_release(&self) -> bool {
        self.code == 0
    }
}

/// Decodes a report into at most one key event.
///
/// Returns `Some` if and only if the report status is [`ReportStatus::Ok`] and
/// the report is exactly [`KEYBOARD_REPORT_LEN`] bytes long; the event carries
/// the byte at [`KEY_SLOT_OFFSET`].  Every other report decodes to `None`.
pub fn decode(report: &HidReport) -> Option<KeyEvent> {
    if report.status != ReportStatus::Ok || report.len() != KEYBOARD_REPORT_LEN {
        return None;
    }
    report.data.get(KEY_SLOT_OFFSET).copied().map(KeyEvent::new)
}
