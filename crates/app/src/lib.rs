//! # appwake-app
//!
//! Application layer — the activation use-case and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ApplicationRegistry` — consistent snapshots of registered and pending apps
//!   - `PolicyHandler` — performs the actual foreground switch
//!   - `HmiMessenger` — delivers launch signals and activation responses
//!   - `EventPublisher` — publishes HMI notifications
//! - Define the **driving/inbound** use-case:
//!   - `ActivationHandler` — decides, signals, and correlates activations
//!   - `ActivationDispatcher` — feeds requests, events and deadlines to the handler
//! - Provide **in-process infrastructure** (event bus, correlation table) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `appwake-domain` only (plus `tokio::sync`/`tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod activation_handler;
pub mod correlation;
pub mod dispatcher;
pub mod event_bus;
pub mod ports;
