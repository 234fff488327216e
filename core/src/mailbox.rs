use std::sync::{Arc, Mutex};

/// Single-slot store for the most recent successfully decoded payload.
///
/// The capture thread publishes, the host polls. A new decode before the
/// previous value is consumed overwrites it silently; this is a slot, not a
/// queue. Cloning shares the slot.
#[derive(Clone)]
pub struct ResponseMailbox {
    slot: Arc<Mutex<Option<u16>>>,
}

impl ResponseMailbox {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    pub fn publish(&self, payload: u16) {
        *self.slot.lock().unwrap() = Some(payload);
    }

    /// True if a decoded payload is waiting to be consumed.
    pub fn is_pending(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    /// Return the pending payload and clear the slot.
    pub fn take(&self) -> Option<u16> {
        self.slot.lock().unwrap().take()
    }
}

impl Default for ResponseMailbox {
    fn default() -> Self {
        Self::new()
    }
}
