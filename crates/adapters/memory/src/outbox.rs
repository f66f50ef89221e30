//! Outbound queue — implements the policy and messenger ports by pushing
//! records onto a channel that a transport drains.

use std::future::Future;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;

use appwake_app::ports::{HmiMessenger, PolicyHandler};
use appwake_domain::activation::ActivationResponse;
use appwake_domain::error::{AppWakeError, PortError};
use appwake_domain::event::LaunchSignal;
use appwake_domain::id::{AppId, CorrelationId};
use appwake_domain::message;

/// Something the activation core asked to send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outbound {
    Launch(LaunchSignal),
    Response(ActivationResponse),
    /// Handed to policy, which performs the switch and answers the request.
    Activate {
        app_id: AppId,
        correlation_id: CorrelationId,
    },
}

impl Outbound {
    /// Render as the message the HMI side expects.
    #[must_use]
    pub fn to_message(&self) -> Value {
        match self {
            Self::Launch(signal) => message::launch_message(signal),
            Self::Response(response) => message::response_message(response),
            Self::Activate {
                app_id,
                correlation_id,
            } => json!({
                "policy": "OnActivateApp",
                "app_id": app_id,
                "id": correlation_id,
            }),
        }
    }
}

/// Unbounded channel of [`Outbound`] records.
#[derive(Debug, Clone)]
pub struct ChannelOutbox {
    sender: mpsc::UnboundedSender<Outbound>,
}

impl ChannelOutbox {
    /// Create an outbox and the receiver a transport should drain.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn push(&self, outbound: Outbound) -> Result<(), AppWakeError> {
        self.sender
            .send(outbound)
            .map_err(|_| PortError::new("outbox", "transport stopped draining").into())
    }
}

impl PolicyHandler for ChannelOutbox {
    fn on_activate_app(
        &self,
        app_id: AppId,
        correlation_id: CorrelationId,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
        let result = self.push(Outbound::Activate {
            app_id,
            correlation_id,
        });
        async { result }
    }
}

impl HmiMessenger for ChannelOutbox {
    fn send_launch_app(
        &self,
        signal: LaunchSignal,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
        let result = self.push(Outbound::Launch(signal));
        async { result }
    }

    fn send_response(
        &self,
        response: ActivationResponse,
    ) -> impl Future<Output = Result<(), AppWakeError>> + Send {
        let result = self.push(Outbound::Response(response));
        async { result }
    }
}
