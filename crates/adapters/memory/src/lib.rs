//! # appwake-adapter-memory
//!
//! In-process adapters for the activation core.
//!
//! ## Responsibilities
//! - Implement `ApplicationRegistry` over in-memory registered/pending sets,
//!   including the registry owner's mutations (insert, complete registration, foreground,
//!   disconnect)
//! - Implement `PolicyHandler` and `HmiMessenger` by queueing [`outbox::Outbound`]
//!   records on a channel that a transport drains
//!
//! ## Dependency rule
//! Depends on `appwake-app` (for port traits) and `appwake-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

pub mod outbox;
pub mod registry;

pub use outbox::{ChannelOutbox, Outbound};
pub use registry::InMemoryApplicationRegistry;
