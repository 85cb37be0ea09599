//! Protocol modules shared by the push endpoint and the push client.
//!
//! - `kind`: the closed set of metric kinds and their string form.
//! - `update`: the JSON update request plus `key=value` label parsing.
//!
//! Parsers are panic-free: malformed input is reported as `CronPromError`.

pub mod kind;
pub mod update;

pub use kind::MetricKind;
pub use update::{parse_label, parse_labels, LabelSet, MetricUpdate};
