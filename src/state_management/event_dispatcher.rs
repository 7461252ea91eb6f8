use std::sync::Arc;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use crate::models::DoorEvent;
use tracing::{debug, warn};

/// Receives the notifications a door controller pushes towards the host layer
pub trait NotificationSink: Send + Sync {
    fn notify(&self, event: DoorEvent);
}

/// Forwards door events to the host layer over a channel.
pub struct EventDispatcher {
    /// The sender end of a channel for dispatching events.
    event_sender: mpsc::UnboundedSender<DoorEvent>,
}

impl EventDispatcher {
    /// Creates a new `EventDispatcher`.
    ///
    /// # Arguments
    ///
    /// * `event_sender` - The sender end of a channel for dispatching events.
    pub fn new(event_sender: mpsc::UnboundedSender<DoorEvent>) -> Self {
        Self { event_sender }
    }

    /// Creates a dispatcher together with the receiver the host layer reads from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<DoorEvent>) {
        let (event_sender, event_receiver) = mpsc::unbounded_channel();
        (Self::new(event_sender), event_receiver)
    }
}

impl NotificationSink for EventDispatcher {
    /// Dispatches an event without waiting; a host that stopped listening is logged, not treated as a fault.
    fn notify(&self, event: DoorEvent) {
        debug!("Dispatching event: {:?}", event);
        if let Err(e) = self.event_sender.send(event) {
            warn!("Host layer is no longer listening, dropped event: {:?}", e.0);
        }
    }
}

/// Collects events in memory, for callers that inspect them directly
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<DoorEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DoorEvent> {
        self.events.lock().clone()
    }

    /// Returns the recorded events and clears the buffer
    pub fn take(&self) -> Vec<DoorEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, event: DoorEvent) {
        self.events.lock().push(event);
    }
}
