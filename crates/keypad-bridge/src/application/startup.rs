//! Startup use cases: radio host bring-up and the initial pairing attempt.

use std::sync::Arc;
use std::time::Duration;

use keypad_core::{PeerAddress, Resolution};
use tracing::{error, info, warn};

use crate::application::link_state::LinkStateMachine;
use crate::infrastructure::radio::{HidHost, HostEventSink, RadioError};

/// Starts the radio host and applies the advertised settings.
///
/// Order: start event delivery, set the device name, then the scan mode
/// (connectable, never discoverable).
///
/// # Errors
///
/// Any failure here is fatal to the bridge; the caller should exit.
pub fn bring_up_host(
    host: &dyn HidHost,
    sink: Arc<dyn HostEventSink>,
    device_name: &str,
    connectable: bool,
) -> Result<(), RadioError> {
    host.start(sink)?;
    host.set_device_name(device_name)?;
    host.set_connectable(connectable)?;
    info!(device_name, connectable, "radio host is up");
    Ok(())
}

/// Asks the host to connect to `peer` and waits up to `timeout` for the link
/// to resolve.
///
/// A rejected request is logged and the wait still runs, so a peripheral
/// that reconnects on its own within the window is picked up.  None of the
/// outcomes are fatal.
pub async fn pair_at_startup(
    link: &LinkStateMachine,
    host: &dyn HidHost,
    peer: &PeerAddress,
    timeout: Duration,
) -> Resolution {
    if link.initiate_connect(host, peer).is_err() {
        warn!(%peer, "continuing without an active connect attempt");
    }

    let resolution = link.wait_resolved(timeout).await;
    match resolution {
        Resolution::Connected => info!(%peer, "keypad connected"),
        Resolution::Closed => warn!(%peer, "keypad connection closed"),
        Resolution::TimedOut => error!(
            %peer,
            "keypad did not connect within {} ms",
            timeout.as_millis()
        ),
    }
    resolution
}
