//! cronprom gateway library entry.
//!
//! This crate wires the config loader, the metric collector (definition model,
//! registry, label normalizer, update router), the exposition adapter, and the
//! HTTP routes into one gateway stack. It also hosts the outbound push client
//! used by the `push` subcommand. It is consumed by the binary (`main.rs`) and
//! by integration tests.

pub mod api;
pub mod app_state;
pub mod build_info;
pub mod collector;
pub mod config;
pub mod obs;
pub mod ops;
pub mod push;
pub mod router;
