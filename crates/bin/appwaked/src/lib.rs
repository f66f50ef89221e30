//! # appwaked — app activation daemon
//!
//! Composition root: loads configuration, seeds the in-memory registry,
//! wires the activation handler to its dispatcher and event bus, and runs
//! the newline-delimited JSON driver.
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

pub mod config;
pub mod driver;
