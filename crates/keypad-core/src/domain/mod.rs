//! Domain entities for keypad-bridge.
//!
//! Pure data and pure functions only: no radio stack, no sockets, no async
//! runtime.  The application layer in `keypad-bridge` drives these types from
//! radio-stack callbacks; the types themselves never perform I/O.

/// Link-layer address of the paired keypad.
pub mod peer;

/// Input-report decoding: raw report bytes to at most one key event.
pub mod report;

/// Static key code to action path mapping.
pub mod actions;

/// Connection states and wait outcomes for the peripheral link.
pub mod link;
