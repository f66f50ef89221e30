//! Event bus port — publish HMI notifications to interested subscribers.

use std::future::Future;

use appwake_domain::error::AppWakeError;
use appwake_domain::event::HmiEvent;

/// Publishes HMI notifications to all current subscribers.
pub trait EventPublisher {
    /// Publish a notification to all current subscribers.
    fn publish(&self, event: HmiEvent) -> impl Future<Output = Result<(), AppWakeError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: HmiEvent) -> impl Future<Output = Result<(), AppWakeError>> + Send {
        (**self).publish(event)
    }
}
