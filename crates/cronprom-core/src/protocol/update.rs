//! Update request (JSON) pushed by job runners.
//!
//! `name`, `type` and `labels` may be missing or `null` on the wire; both read
//! as the empty value.
//! `type` is kept as a raw string so an unknown kind surfaces as
//! `UnsupportedKind` rather than a generic parse failure.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CronPromError, Result};
use crate::protocol::kind::MetricKind;

/// Label name -> value, as supplied by a caller.
pub type LabelSet = HashMap<String, String>;

/// Body of `POST /api/v1/push`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricUpdate {
    /// Metric name as declared in the config.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Metric kind (field name is `type` in JSON).
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Gauge value, counter delta, or observation.
    pub value: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: LabelSet,
}

fn null_as_default<'de, D, T>(d: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(d).map(Option::unwrap_or_default)
}

impl MetricUpdate {
    /// Parsed kind, `UnsupportedKind` for anything outside the four.
    pub fn metric_kind(&self) -> Result<MetricKind> {
        self.kind.parse()
    }
}

/// Split a `key=value` label at the first `=`.
pub fn parse_label(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| CronPromError::InvalidLabelFormat(raw.to_string()))?;
    if key.is_empty() {
        return Err(CronPromError::InvalidLabelFormat(raw.to_string()));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Parse repeated `key=value` flags; later duplicates overwrite earlier ones.
pub fn parse_labels<S: AsRef<str>>(raw: &[S]) -> Result<LabelSet> {
    let mut out = LabelSet::with_capacity(raw.len());
    for s in raw {
        let (k, v) = parse_label(s.as_ref())?;
        out.insert(k, v);
    }
    Ok(out)
}
