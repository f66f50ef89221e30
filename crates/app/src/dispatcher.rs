//! Activation dispatcher — the single task that drives an [`ActivationHandler`].
//!
//! Requests, HMI notifications and deadlines are consumed from one
//! `select!` loop, so the event path and the timeout path of a request can
//! never run concurrently.

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;

use appwake_domain::activation::{ActivationRequest, ActivationState};
use appwake_domain::event::HmiEvent;

use crate::activation_handler::ActivationHandler;
use crate::ports::{ApplicationRegistry, HmiMessenger, PolicyHandler};

/// An activation request queued for the dispatcher.
#[derive(Debug)]
pub struct ActivationCall {
    pub request: ActivationRequest,
    /// Receives the state the decision pass left the request in.
    pub reply: Option<oneshot::Sender<ActivationState>>,
}

impl From<ActivationRequest> for ActivationCall {
    fn from(request: ActivationRequest) -> Self {
        Self {
            request,
            reply: None,
        }
    }
}

/// Feeds an [`ActivationHandler`] from its inbound channels.
pub struct ActivationDispatcher<R, P, M> {
    handler: ActivationHandler<R, P, M>,
    requests: mpsc::Receiver<ActivationCall>,
    events: broadcast::Receiver<HmiEvent>,
}

impl<R, P, M> ActivationDispatcher<R, P, M>
where
    R: ApplicationRegistry,
    P: PolicyHandler,
    M: HmiMessenger,
{
    pub fn new(
        handler: ActivationHandler<R, P, M>,
        requests: mpsc::Receiver<ActivationCall>,
        events: broadcast::Receiver<HmiEvent>,
    ) -> Self {
        Self {
            handler,
            requests,
            events,
        }
    }

    /// Run until the request channel closes.
    ///
    /// Requests still waiting at that point are dropped without a response.
    /// Returns the handler so callers can inspect what was left behind.
    ///
    /// When several sources are ready at once, notifications go first, then
    /// requests, then deadlines. A notification published after a request was
    /// acknowledged can therefore never be overtaken by a later request.
    pub async fn run(mut self) -> ActivationHandler<R, P, M> {
        let mut events_open = true;
        loop {
            let deadline = self.handler.next_deadline();
            tokio::select! {
                biased;

                event = self.events.recv(), if events_open => match event {
                    Ok(event) => {
                        if let Err(err) = self.handler.on_event(&event).await {
                            tracing::warn!(%err, "failed to correlate HMI event");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event receiver lagged, notifications lost");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("event bus closed");
                        events_open = false;
                    }
                },
                call = self.requests.recv() => {
                    let Some(ActivationCall { request, reply }) = call else { break };
                    let correlation_id = request.correlation_id;
                    match self.handler.activate(request).await {
                        Ok(state) => {
                            if state.is_terminal() {
                                tracing::debug!(%correlation_id, ?state, "activation request finished");
                            }
                            if let Some(reply) = reply {
                                let _ = reply.send(state);
                            }
                        }
                        Err(err) => tracing::warn!(%err, %correlation_id, "activation request failed"),
                    }
                }
                () = sleep_until(deadline) => {
                    self.handler.expire_overdue(Instant::now()).await;
                }
            }
        }

        let dropped = self.handler.awaiting_count();
        if dropped > 0 {
            tracing::info!(dropped, "shutting down with activations still awaiting launch");
        }
        self.handler
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
