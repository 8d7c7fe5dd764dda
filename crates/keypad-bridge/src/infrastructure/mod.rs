//! Infrastructure layer for the keypad bridge.
//!
//! OS-facing adapters: the radio host seam and its implementations, the HTTP
//! action sender, and configuration storage.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `keypad_core`, but the domain crate never imports it.

pub mod http;
pub mod radio;
pub mod storage;
