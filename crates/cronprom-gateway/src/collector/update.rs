//! Update router.
//!
//! Every operation runs the same three steps: kind-checked lookup, label
//! normalization, then a mutation of exactly one label combination. The
//! mutation is a single exhaustive match over the aggregation kinds.

use cronprom_core::error::{CronPromError, Result, ValidationError};
use cronprom_core::{LabelSet, MetricKind, MetricUpdate};

use crate::collector::labels::label_values;
use crate::collector::registry::Aggregation;
use crate::collector::MetricCollector;

impl MetricCollector {
    pub fn update_gauge(&self, name: &str, value: f64, labels: LabelSet) -> Result<()> {
        self.route(name, MetricKind::Gauge, value, labels)
    }

    /// `delta` must be non-negative.
    pub fn increment_counter(&self, name: &str, delta: f64, labels: LabelSet) -> Result<()> {
        self.route(name, MetricKind::Counter, delta, labels)
    }

    /// Increment by one.
    pub fn inc_counter(&self, name: &str, labels: LabelSet) -> Result<()> {
        self.increment_counter(name, 1.0, labels)
    }

    pub fn observe_histogram(&self, name: &str, value: f64, labels: LabelSet) -> Result<()> {
        self.route(name, MetricKind::Histogram, value, labels)
    }

    pub fn observe_summary(&self, name: &str, value: f64, labels: LabelSet) -> Result<()> {
        self.route(name, MetricKind::Summary, value, labels)
    }

    /// Route a pushed update. For counters `value` is the delta.
    pub fn apply(&self, update: MetricUpdate) -> Result<()> {
        if update.name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        let kind = update.metric_kind()?;
        self.route(&update.name, kind, update.value, update.labels)
    }

    fn route(&self, name: &str, kind: MetricKind, value: f64, labels: LabelSet) -> Result<()> {
        let registry = self.registry();
        let aggregation = registry
            .get(name, kind)
            .ok_or_else(|| CronPromError::MetricNotFound(name.to_string()))?;
        let labels = registry.normalize(name, labels)?;
        let values = label_values(aggregation.label_names(), &labels);

        match aggregation {
            Aggregation::Gauge(g) => g.set(&values, value),
            Aggregation::Counter(c) => {
                if value.is_nan() {
                    return Err(CronPromError::InvalidValue {
                        metric: name.to_string(),
                        reason: "counter delta must be a number",
                    });
                }
                if value < 0.0 {
                    return Err(CronPromError::InvalidValue {
                        metric: name.to_string(),
                        reason: "counter cannot decrease in value",
                    });
                }
                c.add(&values, value)
            }
            Aggregation::Histogram(h) => h.observe(&values, value),
            Aggregation::Summary(s) => s.observe(&values, value),
        }
        Ok(())
    }
}
