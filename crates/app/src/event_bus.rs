//! In-process HMI notification bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use appwake_domain::error::AppWakeError;
use appwake_domain::event::HmiEvent;

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<HmiEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to notifications on this bus.
    ///
    /// Returns a receiver that will get all notifications published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HmiEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: HmiEvent) -> impl Future<Output = Result<(), AppWakeError>> + Send {
        // Only fails when nobody listens.
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}
