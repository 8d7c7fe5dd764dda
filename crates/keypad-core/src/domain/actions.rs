//! [`KeyActionTable`]: which key code triggers which action path.
//!
//! The table is built once at startup (from defaults or configuration) and
//! shared read-only afterwards.  There is no `insert` method on a
//! built table.

use std::collections::HashMap;

use thiserror::Error;

use crate::keymap::{self, hid::HidKeyCode};

/// Key assignments of the stock keypad layout.
pub const DEFAULT_KEYPAD_ACTIONS: &[(HidKeyCode, &str)] = &[
    (HidKeyCode::Numpad0, "0"),
    (HidKeyCode::Numpad1, "1"),
    (HidKeyCode::Numpad2, "2"),
    (HidKeyCode::Numpad3, "3"),
    (HidKeyCode::Numpad4, "4"),
    (HidKeyCode::Numpad5, "5"),
    (HidKeyCode::Numpad6, "6"),
    (HidKeyCode::Numpad7, "7"),
    (HidKeyCode::Numpad8, "8"),
    (HidKeyCode::Numpad9, "9"),
    (HidKeyCode::NumpadDecimal, "dot"),
    (HidKeyCode::NumpadDivide, "slash"),
    (HidKeyCode::NumpadMultiply, "asterisk"),
    (HidKeyCode::NumpadSubtract, "minus"),
    (HidKeyCode::NumpadAdd, "plus"),
    (HidKeyCode::NumpadEnter, "enter"),
    (HidKeyCode::Escape, "esc"),
    (HidKeyCode::Tab, "tab"),
    (HidKeyCode::Backspace, "backspace"),
];

/// Error raised while building a table from configuration entries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyTableError {
    #[error("unknown key '{0}' (expected a key name like Numpad0 or a hex code like 0x62)")]
    UnknownKey(String),
    #[error("key '{0}' maps to an empty action path")]
    EmptyAction(String),
    #[error("key code 0x{0:02X} is assigned more than once")]
    Duplicate(u8),
}

/// Mapping from key code to an opaque action path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyActionTable {
    actions: HashMap<u8, String>,
}

impl KeyActionTable {
    /// The stock keypad layout ([`DEFAULT_KEYPAD_ACTIONS`]).
    pub fn keypad_default() -> Self {
        DEFAULT_KEYPAD_ACTIONS
            .iter()
            .map(|(key, action)| (key.as_u8(), *action))
            .collect()
    }

    /// Builds a table from configuration entries of the form
    /// `key name or hex code -> action path`.
    ///
    /// # Errors
    ///
    /// Returns [`KeyTableError`] for unknown keys, empty actions, or two
    /// entries resolving to the same code (e.g. `Numpad0` and `0x62`).
    pub fn from_named<'a, I>(entries: I) -> Result<Self, KeyTableError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut actions = HashMap::new();
        for (key, action) in entries {
            let code = keymap::parse_key(key)
                .ok_or_else(|| KeyTableError::UnknownKey(key.to_string()))?;
            if action.trim().is_empty() {
                return Err(KeyTableError::EmptyAction(key.to_string()));
            }
            if actions.insert(code, action.trim().to_string()).is_some() {
                return Err(KeyTableError::Duplicate(code));
            }
        }
        Ok(Self { actions })
    }

    /// Returns the action path for `code`, or `None` if the key is unmapped.
    pub fn lookup(&self, code: u8) -> Option<&str> {
        self.actions.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(u8, S)> for KeyActionTable {
    fn from_iter<T: IntoIterator<Item = (u8, S)>>(iter: T) -> Self {
        Self {
            actions: iter
                .into_iter()
                .map(|(code, action)| (code, action.into()))
                .collect(),
        }
    }
}
