//! Metric collector: definitions in, concurrent updates routed to the right
//! aggregation, exposition text out.
//!
//! - `definition`: validated metric definitions.
//! - `registry`: one aggregation per definition, keyed by sanitized name.
//! - `labels`: label set reconciliation.
//! - `update`: the per-kind update operations.

pub mod definition;
pub mod labels;
pub mod registry;
pub mod update;

use cronprom_core::error::Result;

use crate::config::CronpromConfig;

pub use definition::{MetricDefinition, MetricSpec};
pub use labels::MISSING_LABEL_VALUE;
pub use registry::{Aggregation, Registry};

/// Owns the registry; shared across request handlers via `Arc`.
pub struct MetricCollector {
    registry: Registry,
}

impl MetricCollector {
    pub fn new(namespace: &str, definitions: &[MetricDefinition]) -> Result<Self> {
        Ok(Self {
            registry: Registry::build(namespace, definitions)?,
        })
    }

    pub fn from_config(cfg: &CronpromConfig) -> Result<Self> {
        let definitions = definition::definitions(&cfg.metrics)?;
        Self::new(&cfg.global.namespace, &definitions)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Current state in Prometheus text format.
    pub fn render(&self) -> String {
        self.registry.snapshot()
    }
}
