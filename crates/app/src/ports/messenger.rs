//! Messenger port — outbound messages towards the HMI and companion apps.

use std::future::Future;

use appwake_domain::activation::ActivationResponse;
use appwake_domain::error::AppWakeError;
use appwake_domain::event::LaunchSignal;

/// Delivers launch signals and failure responses.
///
/// Delivery is fire-and-forget: an `Err` is logged by the caller and never
/// changes the outcome of an activation.
pub trait HmiMessenger {
    /// Ask a companion app to start the launch flow of another app.
    fn send_launch_app(
        &self,
        signal: LaunchSignal,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send;

    /// Answer an activation request.
    fn send_response(
        &self,
        response: ActivationResponse,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send;
}

impl<T: HmiMessenger + Send + Sync> HmiMessenger for std::sync::Arc<T> {
    fn send_launch_app(
        &self,
        signal: LaunchSignal,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
        (**self).send_launch_app(signal)
    }

    fn send_response(
        &self,
        response: ActivationResponse,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
        (**self).send_response(response)
    }
}
