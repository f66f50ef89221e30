//! # appwake-domain
//!
//! Pure domain model for the appwake activation core.
//!
//! ## Responsibilities
//! - Foundational types: typed numeric identifiers, error conventions
//! - Define **Applications** (registered or pending mobile apps on a device)
//! - Define **Registry snapshots** and the device-scoped launch candidate rules
//! - Define **Activation** requests, result codes and responses
//! - Define **Events** consumed (registration) and signals produced (launch)
//! - Extract identifiers out of loosely-typed HMI messages
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod activation;
pub mod application;
pub mod event;
pub mod message;
pub mod registry;
