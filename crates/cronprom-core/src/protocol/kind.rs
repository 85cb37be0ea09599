//! Metric kinds.

use std::fmt;
use std::str::FromStr;

use crate::error::CronPromError;

/// The closed set of aggregation kinds a metric can be declared as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gauge,
    Counter,
    Histogram,
    Summary,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Gauge,
        MetricKind::Counter,
        MetricKind::Histogram,
        MetricKind::Summary,
    ];

    /// Lowercase name, also used as the `# TYPE` annotation in the exposition.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Gauge => "gauge",
            MetricKind::Counter => "counter",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = CronPromError;

    /// Case-insensitive; anything else is `UnsupportedKind`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        MetricKind::ALL
            .into_iter()
            .find(|k| k.as_str() == lower)
            .ok_or_else(|| CronPromError::UnsupportedKind(s.to_string()))
    }
}
