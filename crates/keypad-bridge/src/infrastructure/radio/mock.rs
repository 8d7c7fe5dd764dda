//! Mock radio host for unit and integration testing.
//!
//! Lets tests play the role of the radio stack: inject events as if they came
//! from the stack's thread, reject connect requests, and inspect what the
//! bridge asked of the stack.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use keypad_core::PeerAddress;

use super::{validate_device_name, HidHost, HidHostEvent, HostEventSink, RadioError};

/// A mock implementation of [`HidHost`] that allows tests to inject events.
pub struct MockHidHost {
    sink: Mutex<Option<Arc<dyn HostEventSink>>>,
    connect_requests: Mutex<Vec<PeerAddress>>,
    device_name: Mutex<Option<String>>,
    connectable: Mutex<Option<bool>>,
    reject_connects: AtomicBool,
    fail_start: AtomicBool,
}

impl MockHidHost {
    /// Creates a new mock host that accepts every request.
    pub fn new() -> Self {
        Self {
            sink: Mutex::new(None),
            connect_requests: Mutex::new(Vec::new()),
            device_name: Mutex::new(None),
            connectable: Mutex::new(None),
            reject_connects: AtomicBool::new(false),
            fail_start: AtomicBool::new(false),
        }
    }

    /// Makes subsequent `request_connect` calls fail.
    pub fn reject_connects(&self) {
        self.reject_connects.store(true, Ordering::SeqCst);
    }

    /// Makes the next `start` call fail.
    pub fn fail_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    /// Delivers `event` to the registered sink on the calling thread.
    ///
    /// Panics if `start()` has not been called.
    pub fn emit(&self, event: HidHostEvent) {
        let sink = self
            .sink
            .lock()
            .expect("lock poisoned")
            .clone()
            .expect("MockHidHost::emit called before start()");
        sink.handle_event(event);
    }

    /// Peers passed to `request_connect`, in call order.
    pub fn connect_requests(&self) -> Vec<PeerAddress> {
        self.connect_requests.lock().expect("lock poisoned").clone()
    }

    pub fn device_name(&self) -> Option<String> {
        self.device_name.lock().expect("lock poisoned").clone()
    }

    pub fn connectable(&self) -> Option<bool> {
        *self.connectable.lock().expect("lock poisoned")
    }

    pub fn is_started(&self) -> bool {
        self.sink.lock().expect("lock poisoned").is_some()
    }
}

impl Default for MockHidHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HidHost for MockHidHost {
    fn start(&self, sink: Arc<dyn HostEventSink>) -> Result<(), RadioError> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(RadioError::StartFailed("injected failure".to_string()));
        }
        let mut guard = self.sink.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(RadioError::AlreadyStarted);
        }
        *guard = Some(sink);
        Ok(())
    }

    fn request_connect(&self, peer: &PeerAddress) -> Result<(), RadioError> {
        self.connect_requests
            .lock()
            .expect("lock poisoned")
            .push(*peer);
        if self.reject_connects.load(Ordering::SeqCst) {
            return Err(RadioError::ConnectRejected {
                peer: *peer,
                reason: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn set_device_name(&self, name: &str) -> Result<(), RadioError> {
        validate_device_name(name)?;
        *self.device_name.lock().expect("lock poisoned") = Some(name.to_string());
        Ok(())
    }

    fn set_connectable(&self, connectable: bool) -> Result<(), RadioError> {
        *self.connectable.lock().expect("lock poisoned") = Some(connectable);
        Ok(())
    }
}
