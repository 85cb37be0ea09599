//! In-process aggregations and the Prometheus text exposition adapter.
//!
//! Each vec stores one accumulator per label combination in a `DashMap`, so
//! concurrent updates only contend on the shard that holds their combination.
//! Rendering is deterministic: series are sorted by label values.

pub mod exposition;
pub mod metrics;
pub mod summary;

pub use metrics::{CounterVec, GaugeVec, HistogramSnapshot, HistogramVec};
pub use summary::{SummarySnapshot, SummaryVec};
