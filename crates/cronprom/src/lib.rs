//! cronprom: a push gateway that turns cron job updates into Prometheus metrics.
//!
//! One crate to depend on for both halves:
//! - [`core`]: wire types (`MetricUpdate`, `MetricKind`, label parsing) and the
//!   `CronPromError` taxonomy with its stable client codes.
//! - [`gateway`]: config loading, the collector and HTTP surface. Embedders
//!   usually start from `gateway::collector::MetricCollector::from_config`, or
//!   from `gateway::push::push` to send updates to a running gateway.

pub mod core {
    pub use cronprom_core::*;
}

pub mod gateway {
    pub use cronprom_gateway::*;
}
