//! Label normalizer.
//!
//! Aggregations are keyed by a complete, fixed label vector. Pushed label sets
//! are reconciled against the declared names first: absent labels get a
//! filler value and undeclared ones are dropped. Both adjustments are logged.

use cronprom_core::error::{CronPromError, Result};
use cronprom_core::LabelSet;

use crate::collector::registry::Registry;

/// Value stored for a declared label the caller did not send.
pub const MISSING_LABEL_VALUE: &str = "<missing>";

impl Registry {
    /// Reconcile `labels` against the declared labels of `metric_name`.
    pub fn normalize(&self, metric_name: &str, labels: LabelSet) -> Result<LabelSet> {
        let def = self
            .definition(metric_name)
            .ok_or_else(|| CronPromError::MetricNotFound(metric_name.to_string()))?;
        Ok(reconcile(metric_name, &def.labels, labels))
    }
}

/// Output keys are exactly `declared`.
pub fn reconcile(metric: &str, declared: &[String], mut labels: LabelSet) -> LabelSet {
    for label in declared {
        if !labels.contains_key(label) {
            tracing::info!(metric, label = %label, "adding missing label");
            labels.insert(label.clone(), MISSING_LABEL_VALUE.to_string());
        }
    }

    labels.retain(|key, _| {
        let keep = declared.iter().any(|l| l == key);
        if !keep {
            tracing::info!(metric, label = %key, "removing extra label");
        }
        keep
    });

    labels
}

/// Label values in declared order, the key shape aggregations use.
pub fn label_values(declared: &[String], labels: &LabelSet) -> Vec<String> {
    declared
        .iter()
        .map(|l| {
            labels
                .get(l)
                .cloned()
                .unwrap_or_else(|| MISSING_LABEL_VALUE.to_string())
        })
        .collect()
}
