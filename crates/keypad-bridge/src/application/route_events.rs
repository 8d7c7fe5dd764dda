//! HostEventRouter: the single entry point for radio-stack events.
//!
//! The stack calls [`HostEventRouter::handle_event`] from its own thread.
//! Link events drive the [`LinkStateMachine`]; data indications are decoded
//! and handed to the [`KeyDispatcher`].  Everything else is logged.
//!
//! Nothing here waits on the network or on the runtime, so the stack thread
//! is released as soon as the state update or the queue push is done.

use std::sync::Arc;

use keypad_core::decode;
use tracing::{debug, info};

use crate::application::dispatch_keys::KeyDispatcher;
use crate::application::link_state::LinkStateMachine;
use crate::infrastructure::radio::{HidHostEvent, HostEventSink};

/// Routes radio events to the link state machine and the key dispatcher.
pub struct HostEventRouter {
    link: Arc<LinkStateMachine>,
    dispatcher: KeyDispatcher,
}

impl HostEventRouter {
    pub fn new(link: Arc<LinkStateMachine>, dispatcher: KeyDispatcher) -> Self {
        Self { link, dispatcher }
    }
}

impl HostEventSink for HostEventRouter {
    fn handle_event(&self, event: HidHostEvent) {
        debug!(event = event.kind(), "radio event");

        match event {
            HidHostEvent::StackReady => self.link.on_stack_ready(),
            HidHostEvent::StackStopped => info!("HID host stopped"),
            HidHostEvent::LinkOpened { connected } => self.link.on_link_opened(connected),
            HidHostEvent::LinkClosed => self.link.on_link_closed(),
            HidHostEvent::DataIndication(report) => match decode(&report) {
                Some(key) => {
                    self.dispatcher.dispatch(key);
                }
                None => debug!(
                    status = ?report.status,
                    len = report.len(),
                    "ignoring input report that is not a keyboard report"
                ),
            },
            HidHostEvent::Other { kind } => debug!("unhandled radio event '{kind}'"),
        }
    }
}
