//! Single-slot inbound channel for the observer's "now" signal.
//!
//! The event source (a key handler, a simulated observer) holds a
//! [`SignalSender`]; the tick driver holds the [`SignalReceiver`] and
//! drains the slot exactly once per tick. Repeated signals between two
//! polls collapse into the first one. The receiver never blocks.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;

/// Create a connected sender/receiver pair over an empty slot.
pub fn signal_slot() -> (SignalSender, SignalReceiver) {
    let slot = Arc::new(Mutex::new(None));
    (SignalSender { slot: Arc::clone(&slot) }, SignalReceiver { slot })
}

/// Posting side. Cheap to clone; every clone feeds the same slot.
#[derive(Debug, Clone)]
pub struct SignalSender {
    slot: Arc<Mutex<Option<Instant>>>,
}

impl SignalSender {
    /// Post a signal stamped with the current wall-clock time.
    pub fn signal(&self) {
        self.signal_at(Instant::now());
    }

    /// Post a signal with an explicit stamp. Ignored if one is already pending.
    pub fn signal_at(&self, at: Instant) {
        let mut slot = self.slot.lock();
        if slot.is_none() {
            *slot = Some(at);
        }
    }
}

/// Polling side, owned by the tick driver.
#[derive(Debug)]
pub struct SignalReceiver {
    slot: Arc<Mutex<Option<Instant>>>,
}

impl SignalReceiver {
    /// Take the pending signal, leaving the slot empty.
    pub fn take(&self) -> Option<Instant> {
        self.slot.lock().take()
    }

    /// Make a new sender for this slot.
    pub fn sender(&self) -> SignalSender {
        SignalSender { slot: Arc::clone(&self.slot) }
    }
}
