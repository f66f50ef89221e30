//! Newline-delimited JSON driver.
//!
//! Reads one HMI message per line, feeds activation requests to the
//! dispatcher and notifications to the event bus, and writes everything the
//! core sends back as one JSON object per line.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinError;

use appwake_adapter_memory::{ChannelOutbox, InMemoryApplicationRegistry, Outbound};
use appwake_app::activation_handler::ActivationHandler;
use appwake_app::dispatcher::{ActivationCall, ActivationDispatcher};
use appwake_app::event_bus::InProcessEventBus;
use appwake_app::ports::EventPublisher;
use appwake_domain::error::AppWakeError;
use appwake_domain::event::HmiEvent;
use appwake_domain::message::{self, Inbound};

use crate::config::{Config, ConfigError};

/// Counters reported when the input ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Activation requests handed to the dispatcher.
    pub requests: usize,
    /// Notifications published on the event bus.
    pub events: usize,
    /// Lines that could not be decoded.
    pub skipped: usize,
    /// Requests still awaiting a launched app when the input ended.
    pub abandoned: usize,
}

/// Errors that stop the driver.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    AppWake(#[from] AppWakeError),
    #[error("i/o failure on the message stream")]
    Io(#[from] std::io::Error),
    #[error("background task failed")]
    Join(#[from] JoinError),
    #[error("activation dispatcher stopped")]
    DispatcherStopped,
}

/// Run the activation core over `input` until it reaches end of stream.
///
/// # Errors
///
/// Returns [`DriverError`] if the registry seed is invalid, a stream fails,
/// or the dispatcher stops before the input ends.
pub async fn run<I, O>(config: &Config, input: I, output: O) -> Result<Summary, DriverError>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin + Send + 'static,
{
    let registry = Arc::new(InMemoryApplicationRegistry::with_applications(
        config.seed_applications()?,
    )?);
    let (outbox, outbound) = ChannelOutbox::new();
    let bus = InProcessEventBus::new(config.activation.event_bus_capacity);

    let handler = ActivationHandler::new(
        Arc::clone(&registry),
        outbox.clone(),
        outbox,
        config.launch_wait(),
    );
    let (requests, request_rx) = mpsc::channel(config.activation.request_queue_capacity);
    let dispatcher =
        tokio::spawn(ActivationDispatcher::new(handler, request_rx, bus.subscribe()).run());
    let writer = tokio::spawn(write_outbound(outbound, output, Arc::clone(&registry)));

    let mut summary = Summary::default();
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: serde_json::Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "skipping line that is not JSON");
                summary.skipped += 1;
                continue;
            }
        };
        let decoded = match message::decode(&value) {
            Ok(decoded) => decoded,
            Err(err) => {
                tracing::warn!(%err, "skipping undecodable message");
                summary.skipped += 1;
                continue;
            }
        };
        if let Some(reason) = decoded.degraded {
            tracing::debug!(%reason, "identifier missing, using 0");
        }

        match decoded.inbound {
            Inbound::Activate(request) => {
                let (reply, state) = oneshot::channel();
                requests
                    .send(ActivationCall {
                        request,
                        reply: Some(reply),
                    })
                    .await
                    .map_err(|_| DriverError::DispatcherStopped)?;
                // A request whose handling failed is logged by the dispatcher
                // and drops the reply sender.
                if let Ok(state) = state.await {
                    tracing::debug!(?state, "activation request handled");
                }
                summary.requests += 1;
            }
            Inbound::Event(event) => {
                if let HmiEvent::AppRegistered(registration) = &event {
                    registry.complete_registration(registration.hmi_app_id);
                }
                bus.publish(event).await?;
                summary.events += 1;
            }
        }
    }

    drop(requests);
    let handler = dispatcher.await?;
    summary.abandoned = handler.awaiting_count();
    // Releases the last outbox senders so the writer drains and stops.
    drop(handler);
    writer.await??;
    Ok(summary)
}

async fn write_outbound<O>(
    mut outbound: mpsc::UnboundedReceiver<Outbound>,
    mut output: O,
    registry: Arc<InMemoryApplicationRegistry>,
) -> Result<(), std::io::Error>
where
    O: AsyncWrite + Unpin,
{
    while let Some(record) = outbound.recv().await {
        if let Outbound::Activate { app_id, correlation_id } = &record {
            tracing::info!(%app_id, %correlation_id, "policy activating application");
            if !registry.bring_to_foreground(*app_id) {
                tracing::warn!(%app_id, "activated application is no longer registered");
            }
        }
        let mut line = serde_json::to_vec(&record.to_message())?;
        line.push(b'\n');
        output.write_all(&line).await?;
        output.flush().await?;
    }
    output.shutdown().await
}
