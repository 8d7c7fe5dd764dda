//! Application layer use cases for the keypad bridge.
//!
//! Use cases in this layer orchestrate the domain types from `keypad_core`
//! and talk to the outside world only through traits (`HidHost`,
//! `HostEventSink`, `ActionSender`), so every piece can be driven from tests
//! with the mock radio host and a mock sender.
//!
//! # Sub-modules
//!
//! - **`link_state`** – The connection state machine.  Radio events move it
//!   between states; the startup task waits on it with a deadline.
//!
//! - **`route_events`** – The sink the radio stack calls into.  Sends link
//!   events to `link_state` and decoded key presses to `dispatch_keys`.
//!
//! - **`dispatch_keys`** – Maps key codes to actions and queues them for a
//!   background sender task, so the stack thread never waits on the network.
//!
//! - **`startup`** – Host bring-up and the initial pairing attempt.

pub mod dispatch_keys;
pub mod link_state;
pub mod route_events;
pub mod startup;
