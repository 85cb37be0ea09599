//! Metric definition model.
//!
//! `MetricConfig` is the raw YAML record; `MetricDefinition` is the validated,
//! immutable form the registry is built from. Kind-specific parameters live in
//! the closed `MetricSpec` enum, so a histogram without buckets or a summary
//! without objectives cannot exist past validation.

use std::collections::HashSet;

use cronprom_core::error::ValidationError;
use cronprom_core::MetricKind;

use crate::config::MetricConfig;

/// Summary objectives used when a summary omits `objectives`.
pub const DEFAULT_OBJECTIVES: [(f64, f64); 3] = [(0.5, 0.05), (0.9, 0.01), (0.99, 0.001)];

#[derive(Debug, Clone, PartialEq)]
pub enum MetricSpec {
    Gauge { default_value: Option<f64> },
    Counter,
    Histogram { buckets: Vec<f64> },
    /// Sorted by quantile.
    Summary { objectives: Vec<(f64, f64)> },
}

impl MetricSpec {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricSpec::Gauge { .. } => MetricKind::Gauge,
            MetricSpec::Counter => MetricKind::Counter,
            MetricSpec::Histogram { .. } => MetricKind::Histogram,
            MetricSpec::Summary { .. } => MetricKind::Summary,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    pub name: String,
    pub description: String,
    /// Declared label names, in exposition order.
    pub labels: Vec<String>,
    pub spec: MetricSpec,
}

impl MetricDefinition {
    pub fn new(name: impl Into<String>, spec: MetricSpec) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            labels: Vec::new(),
            spec,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    pub fn kind(&self) -> MetricKind {
        self.spec.kind()
    }

    /// Per-record validation. Duplicate names are checked by [`definitions`].
    pub fn from_config(cfg: &MetricConfig) -> Result<Self, ValidationError> {
        if cfg.name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let kind: MetricKind = cfg.kind.parse().map_err(|_| ValidationError::UnknownKind {
            name: cfg.name.clone(),
            kind: cfg.kind.clone(),
        })?;

        let spec = match kind {
            MetricKind::Gauge => MetricSpec::Gauge {
                default_value: cfg.default_value,
            },
            MetricKind::Counter => MetricSpec::Counter,
            MetricKind::Histogram => {
                if cfg.buckets.is_empty() {
                    return Err(ValidationError::MissingBuckets(cfg.name.clone()));
                }
                // `!(a < b)` also catches NaN bounds.
                if cfg.buckets.windows(2).any(|w| !(w[0] < w[1])) {
                    return Err(ValidationError::UnsortedBuckets(cfg.name.clone()));
                }
                MetricSpec::Histogram {
                    buckets: cfg.buckets.clone(),
                }
            }
            MetricKind::Summary => {
                let mut objectives = match &cfg.objectives {
                    None => DEFAULT_OBJECTIVES.to_vec(),
                    Some(o) if o.is_empty() => {
                        return Err(ValidationError::MissingObjectives(cfg.name.clone()))
                    }
                    Some(o) => o.clone(),
                };
                for &(quantile, error) in &objectives {
                    let quantile_ok = quantile > 0.0 && quantile < 1.0;
                    let error_ok = (0.0..1.0).contains(&error);
                    if !quantile_ok || !error_ok {
                        return Err(ValidationError::InvalidObjective {
                            name: cfg.name.clone(),
                            quantile,
                            error,
                        });
                    }
                }
                objectives.sort_by(|a, b| a.0.total_cmp(&b.0));
                MetricSpec::Summary { objectives }
            }
        };

        Ok(Self {
            name: cfg.name.clone(),
            description: cfg.description.clone(),
            labels: cfg.labels.clone(),
            spec,
        })
    }
}

/// Validate every record in order; the first failure wins.
pub fn validate(configs: &[MetricConfig]) -> Result<(), ValidationError> {
    definitions(configs).map(|_| ())
}

/// Validated, typed definitions in config order.
pub fn definitions(configs: &[MetricConfig]) -> Result<Vec<MetricDefinition>, ValidationError> {
    let mut seen = HashSet::with_capacity(configs.len());
    configs
        .iter()
        .map(|cfg| {
            let def = MetricDefinition::from_config(cfg)?;
            if !seen.insert(cfg.name.as_str()) {
                return Err(ValidationError::DuplicateName(cfg.name.clone()));
            }
            Ok(def)
        })
        .collect()
}
