//! USB HID Usage IDs (page 0x07, Keyboard/Keypad page) for the keys a
//! numeric keypad can send.
//!
//! Reference: USB HID Usage Tables 1.3, Section 10.
//!
//! The keypad's input report carries these codes verbatim, so no translation
//! happens anywhere in the bridge.  The enum exists for readable names in
//! code and configuration; anything outside it is still a valid raw code and
//! simply has no name.

/// USB HID Usage ID for the keys a keypad is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HidKeyCode {
    // Digits row (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control keys
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,

    // Navigation
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    // Numpad (HID 0x53–0x63)
    NumLock = 0x53,
    NumpadDivide = 0x54,
    NumpadMultiply = 0x55,
    NumpadSubtract = 0x56,
    NumpadAdd = 0x57,
    NumpadEnter = 0x58,
    Numpad1 = 0x59,
    Numpad2 = 0x5A,
    Numpad3 = 0x5B,
    Numpad4 = 0x5C,
    Numpad5 = 0x5D,
    Numpad6 = 0x5E,
    Numpad7 = 0x5F,
    Numpad8 = 0x60,
    Numpad9 = 0x61,
    Numpad0 = 0x62,
    NumpadDecimal = 0x63,
}

/// Every named key with its configuration name.
const NAMED_KEYS: &[(HidKeyCode, &str)] = &[
    (HidKeyCode::Digit1, "Digit1"),
    (HidKeyCode::Digit2, "Digit2"),
    (HidKeyCode::Digit3, "Digit3"),
    (HidKeyCode::Digit4, "Digit4"),
    (HidKeyCode::Digit5, "Digit5"),
    (HidKeyCode::Digit6, "Digit6"),
    (HidKeyCode::Digit7, "Digit7"),
    (HidKeyCode::Digit8, "Digit8"),
    (HidKeyCode::Digit9, "Digit9"),
    (HidKeyCode::Digit0, "Digit0"),
    (HidKeyCode::Enter, "Enter"),
    (HidKeyCode::Escape, "Escape"),
    (HidKeyCode::Backspace, "Backspace"),
    (HidKeyCode::Tab, "Tab"),
    (HidKeyCode::Space, "Space"),
    (HidKeyCode::ArrowRight, "ArrowRight"),
    (HidKeyCode::ArrowLeft, "ArrowLeft"),
    (HidKeyCode::ArrowDown, "ArrowDown"),
    (HidKeyCode::ArrowUp, "ArrowUp"),
    (HidKeyCode::NumLock, "NumLock"),
    (HidKeyCode::NumpadDivide, "NumpadDivide"),
    (HidKeyCode::NumpadMultiply, "NumpadMultiply"),
    (HidKeyCode::NumpadSubtract, "NumpadSubtract"),
    (HidKeyCode::NumpadAdd, "NumpadAdd"),
    (HidKeyCode::NumpadEnter, "NumpadEnter"),
    (HidKeyCode::Numpad1, "Numpad1"),
    (HidKeyCode::Numpad2, "Numpad2"),
    (HidKeyCode::Numpad3, "Numpad3"),
    (HidKeyCode::Numpad4, "Numpad4"),
    (HidKeyCode::Numpad5, "Numpad5"),
    (HidKeyCode::Numpad6, "Numpad6"),
    (HidKeyCode::Numpad7, "Numpad7"),
    (HidKeyCode::Numpad8, "Numpad8"),
    (HidKeyCode::Numpad9, "Numpad9"),
    (HidKeyCode::Numpad0, "Numpad0"),
    (HidKeyCode::NumpadDecimal, "NumpadDecimal"),
];

impl HidKeyCode {
    /// Converts a raw usage code into a named key, if it has a name.
    pub fn from_u8(value: u8) -> Option<Self> {
        NAMED_KEYS
            .iter()
            .find(|(key, _)| key.as_u8() == value)
            .map(|(key, _)| *key)
    }

    /// Looks up a key by its configuration name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED_KEYS
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(key, _)| *key)
    }

    /// Returns the raw USB HID Usage ID.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Returns the configuration name of this key.
    pub fn name(self) -> &'static str {
        NAMED_KEYS
            .iter()
            .find(|(key, _)| *key == self)
            .map(|(_, n)| *n)
            .unwrap_or("Unnamed")
    }

    /// Returns `true` for keys on the numeric keypad block.
    pub fn is_numpad(self) -> bool {
        (HidKeyCode::NumLock.as_u8()..=HidKeyCode::NumpadDecimal.as_u8()).contains(&self.as_u8())
    }
}

impl std::fmt::Display for HidKeyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (0x{:02X})", self.name(), self.as_u8())
    }
}
