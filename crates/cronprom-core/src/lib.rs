//! cronprom core: transport-agnostic contracts shared by the gateway, the push
//! client, and tests.
//!
//! This crate defines the update request wire format, the closed set of metric
//! kinds, and the error surface. It intentionally carries no transport or
//! runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `CronPromError`/`Result` so a malformed
//! push request can never take the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{CronPromError, Result};
pub use protocol::{LabelSet, MetricKind, MetricUpdate};
