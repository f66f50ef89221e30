//! Policy port — the collaborator that switches an app to the foreground.

use std::future::Future;

use appwake_domain::error::AppWakeError;
use appwake_domain::id::{AppId, CorrelationId};

/// Performs activation side effects and answers the original request.
pub trait PolicyHandler {
    /// Activate `app_id` and respond to the request tagged `correlation_id`.
    fn on_activate_app(
        &self,
        app_id: AppId,
        correlation_id: CorrelationId,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send;
}

impl<T: PolicyHandler + Send + Sync> PolicyHandler for std::sync::Arc<T> {
    fn on_activate_app(
        &self,
        app_id: AppId,
        correlation_id: CorrelationId,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
        (**self).on_activate_app(app_id, correlation_id)
    }
}
