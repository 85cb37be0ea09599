//! Metric registry: one kind-tagged aggregation per definition.
//!
//! The name -> aggregation map is built once and never changes afterwards;
//! only the per-combination state inside each aggregation is mutated. The
//! registry is shared behind an `Arc` and needs no lock of its own.

use std::collections::{HashMap, HashSet};

use cronprom_core::error::RegistrationError;
use cronprom_core::MetricKind;

use crate::build_info::BuildInfo;
use crate::collector::definition::{MetricDefinition, MetricSpec};
use crate::config::schema::is_identifier;
use crate::obs::{CounterVec, GaugeVec, HistogramVec, SummaryVec};

pub const BUILD_INFO_NAME: &str = "cronprom_build_info";
const BUILD_INFO_LABELS: [&str; 3] = ["version", "commit_hash", "build_time"];

/// Live accumulator for one metric.
pub enum Aggregation {
    Gauge(GaugeVec),
    Counter(CounterVec),
    Histogram(HistogramVec),
    Summary(SummaryVec),
}

impl Aggregation {
    fn new(def: &MetricDefinition) -> Self {
        let labels = def.labels.clone();
        match &def.spec {
            MetricSpec::Gauge { default_value } => {
                let gauge = GaugeVec::new(labels);
                // Only an unlabeled gauge has a series to seed before the first push.
                if let (Some(v), true) = (default_value, def.labels.is_empty()) {
                    gauge.set(&[], *v);
                }
                Aggregation::Gauge(gauge)
            }
            MetricSpec::Counter => Aggregation::Counter(CounterVec::new(labels)),
            MetricSpec::Histogram { buckets } => {
                Aggregation::Histogram(HistogramVec::new(labels, buckets.clone()))
            }
            MetricSpec::Summary { objectives } => {
                Aggregation::Summary(SummaryVec::new(labels, objectives.clone()))
            }
        }
    }

    pub fn kind(&self) -> MetricKind {
        match self {
            Aggregation::Gauge(_) => MetricKind::Gauge,
            Aggregation::Counter(_) => MetricKind::Counter,
            Aggregation::Histogram(_) => MetricKind::Histogram,
            Aggregation::Summary(_) => MetricKind::Summary,
        }
    }

    /// Declared label names, in the order label values are keyed.
    pub fn label_names(&self) -> &[String] {
        match self {
            Aggregation::Gauge(v) => v.labels(),
            Aggregation::Counter(v) => v.labels(),
            Aggregation::Histogram(v) => v.labels(),
            Aggregation::Summary(v) => v.labels(),
        }
    }

    fn render(&self, name: &str, help: &str, out: &mut String) {
        match self {
            Aggregation::Gauge(v) => v.render(name, help, out),
            Aggregation::Counter(v) => v.render(name, help, out),
            Aggregation::Histogram(v) => v.render(name, help, out),
            Aggregation::Summary(v) => v.render(name, help, out),
        }
    }
}

pub struct RegisteredMetric {
    pub definition: MetricDefinition,
    /// Namespace-qualified, sanitized name used in the exposition.
    pub exposed_name: String,
    pub aggregation: Aggregation,
}

impl RegisteredMetric {
    fn new(definition: MetricDefinition, exposed_name: String) -> Self {
        let aggregation = Aggregation::new(&definition);
        Self {
            definition,
            exposed_name,
            aggregation,
        }
    }
}

pub struct Registry {
    namespace: String,
    /// Keyed by sanitized name.
    metrics: HashMap<String, RegisteredMetric>,
    build_info: RegisteredMetric,
}

impl Registry {
    /// Build every aggregation up front. Fails on the first sanitized-name
    /// collision or invalid label declaration.
    pub fn build(namespace: &str, definitions: &[MetricDefinition]) -> Result<Self, RegistrationError> {
        let build_info = RegisteredMetric::new(
            MetricDefinition::new(BUILD_INFO_NAME, MetricSpec::Gauge { default_value: None })
                .with_description("Build information about the application")
                .with_labels(BUILD_INFO_LABELS),
            BUILD_INFO_NAME.to_string(),
        );

        let mut metrics = HashMap::with_capacity(definitions.len());
        for def in definitions {
            let key = sanitize_metric_name(&def.name);
            let exposed = exposed_name(namespace, &key);
            if metrics.contains_key(&key) || exposed == BUILD_INFO_NAME {
                return Err(RegistrationError::Duplicate {
                    name: def.name.clone(),
                    exposed,
                });
            }
            check_labels(def)?;

            tracing::debug!(metric = %def.name, exposed = %exposed, kind = %def.kind(), "registered metric");
            metrics.insert(key, RegisteredMetric::new(def.clone(), exposed));
        }

        Ok(Self {
            namespace: namespace.to_string(),
            metrics,
            build_info,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Lookup by raw or sanitized name.
    pub fn metric(&self, name: &str) -> Option<&RegisteredMetric> {
        self.metrics.get(&sanitize_metric_name(name))
    }

    pub fn definition(&self, name: &str) -> Option<&MetricDefinition> {
        self.metric(name).map(|m| &m.definition)
    }

    /// Kind-checked lookup. A kind mismatch reads the same as an absent name.
    pub fn get(&self, name: &str, kind: MetricKind) -> Option<&Aggregation> {
        self.metric(name)
            .map(|m| &m.aggregation)
            .filter(|agg| agg.kind() == kind)
    }

    /// Set the build-info gauge for this process. Called once at startup.
    pub fn seed_build_info(&self, info: &BuildInfo) {
        if let Aggregation::Gauge(g) = &self.build_info.aggregation {
            g.set(&[info.version.clone(), info.commit.clone(), info.date.clone()], 1.0);
        }
    }

    /// Render every family, sorted by exposed name.
    pub fn snapshot(&self) -> String {
        let mut families: Vec<&RegisteredMetric> = self
            .metrics
            .values()
            .chain(std::iter::once(&self.build_info))
            .collect();
        families.sort_by(|a, b| a.exposed_name.cmp(&b.exposed_name));

        let mut out = String::new();
        for m in families {
            m.aggregation
                .render(&m.exposed_name, &m.definition.description, &mut out);
        }
        out
    }
}

/// Replace anything outside `[A-Za-z0-9_]` with `_`; prefix a leading digit with `_`.
pub fn sanitize_metric_name(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// `namespace_name`, skipping empty parts.
pub fn exposed_name(namespace: &str, name: &str) -> String {
    match (namespace.is_empty(), name.is_empty()) {
        (true, _) => name.to_string(),
        (false, true) => namespace.to_string(),
        (false, false) => format!("{namespace}_{name}"),
    }
}

fn check_labels(def: &MetricDefinition) -> Result<(), RegistrationError> {
    let reserved = match def.kind() {
        MetricKind::Histogram => Some("le"),
        MetricKind::Summary => Some("quantile"),
        MetricKind::Gauge | MetricKind::Counter => None,
    };

    let mut seen = HashSet::with_capacity(def.labels.len());
    for label in &def.labels {
        let reason = if !is_identifier(label) {
            Some("must match [A-Za-z_][A-Za-z0-9_]*")
        } else if label.starts_with("__") {
            Some("names starting with __ are reserved")
        } else if reserved == Some(label.as_str()) {
            Some("reserved for this metric type")
        } else if !seen.insert(label.as_str()) {
            Some("declared more than once")
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(RegistrationError::InvalidLabel {
                name: def.name.clone(),
                label: label.clone(),
                reason,
            });
        }
    }
    Ok(())
}
