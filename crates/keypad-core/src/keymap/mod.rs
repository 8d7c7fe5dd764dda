//! Key code tables.
//!
//! The keypad reports keys as USB HID Usage IDs (page 0x07, Keyboard/Keypad).
//! The bridge keeps them in that form end to end; names only exist so that
//! configuration files can say `Numpad0` instead of `0x62`.

pub mod hid;

pub use hid::HidKeyCode;

/// Resolves a configuration key into a raw HID usage code.
///
/// Accepts either a usage name (`"NumpadEnter"`, case-insensitive) or a hex
/// literal (`"0x58"`).  Returns `None` for anything else.
pub fn parse_key(key: &str) -> Option<u8> {
    let trimmed = key.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u8::from_str_radix(hex, 16).ok();
    }
    HidKeyCode::from_name(trimmed).map(HidKeyCode::as_u8)
}
