//! Gauge, counter and histogram vecs with per-combination state.
//!
//! Keys are label values in declared order; the vec owns the label names.
//! Gauge and counter cells are `AtomicU64` holding `f64` bits, so updates take
//! only a shard read lock once the combination exists. Histogram state is
//! mutated through the entry's exclusive guard so buckets, count and sum
//! always move together.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use cronprom_core::MetricKind;

use super::exposition::{format_value, write_header, write_sample};

type LabelValues = Vec<String>;

/// `AtomicU64` cells holding `f64` bits, one per label combination.
struct FloatCells {
    labels: Vec<String>,
    map: DashMap<LabelValues, AtomicU64>,
}

impl FloatCells {
    fn new(labels: Vec<String>) -> Self {
        Self {
            labels,
            map: DashMap::new(),
        }
    }

    fn with_cell<R>(&self, values: &[String], f: impl FnOnce(&AtomicU64) -> R) -> R {
        if let Some(cell) = self.map.get(values) {
            return f(cell.value());
        }
        let cell = self
            .map
            .entry(values.to_vec())
            .or_insert_with(|| AtomicU64::new(0f64.to_bits()));
        f(cell.value())
    }

    fn set(&self, values: &[String], v: f64) {
        self.with_cell(values, |cell| cell.store(v.to_bits(), Ordering::Relaxed));
    }

    fn add(&self, values: &[String], v: f64) {
        self.with_cell(values, |cell| {
            let mut cur = cell.load(Ordering::Relaxed);
            loop {
                let next = (f64::from_bits(cur) + v).to_bits();
                match cell.compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed) {
                    Ok(_) => break,
                    Err(actual) => cur = actual,
                }
            }
        });
    }

    fn get(&self, values: &[String]) -> Option<f64> {
        self.map
            .get(values)
            .map(|cell| f64::from_bits(cell.value().load(Ordering::Relaxed)))
    }

    fn render(&self, name: &str, help: &str, kind: MetricKind, out: &mut String) {
        write_header(out, name, help, kind);
        let mut series: Vec<(LabelValues, f64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), f64::from_bits(r.value().load(Ordering::Relaxed))))
            .collect();
        series.sort_by(|a, b| a.0.cmp(&b.0));
        for (values, v) in series {
            write_sample(out, name, &self.labels, &values, None, v);
        }
    }
}

pub struct GaugeVec {
    cells: FloatCells,
}

impl GaugeVec {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            cells: FloatCells::new(labels),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.cells.labels
    }

    /// Last write wins.
    pub fn set(&self, values: &[String], v: f64) {
        self.cells.set(values, v);
    }

    pub fn get(&self, values: &[String]) -> Option<f64> {
        self.cells.get(values)
    }

    pub fn len(&self) -> usize {
        self.cells.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.map.is_empty()
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, name: &str, help: &str, out: &mut String) {
        self.cells.render(name, help, MetricKind::Gauge, out);
    }
}

pub struct CounterVec {
    cells: FloatCells,
}

impl CounterVec {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            cells: FloatCells::new(labels),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.cells.labels
    }

    /// Increment by 1.
    pub fn inc(&self, values: &[String]) {
        self.add(values, 1.0);
    }

    /// Increment by an arbitrary value. Callers reject negative deltas.
    pub fn add(&self, values: &[String], v: f64) {
        self.cells.add(values, v);
    }

    pub fn get(&self, values: &[String]) -> Option<f64> {
        self.cells.get(values)
    }

    pub fn len(&self) -> usize {
        self.cells.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.map.is_empty()
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, name: &str, help: &str, out: &mut String) {
        self.cells.render(name, help, MetricKind::Counter, out);
    }
}

struct HistogramState {
    /// Non-cumulative per-bucket counts; observations above the last bound only bump `count`.
    buckets: Vec<u64>,
    count: u64,
    sum: f64,
}

impl HistogramState {
    fn new(n: usize) -> Self {
        Self {
            buckets: vec![0; n],
            count: 0,
            sum: 0.0,
        }
    }

    fn cumulative(&self, bounds: &[f64]) -> Vec<(f64, u64)> {
        let mut acc = 0u64;
        bounds
            .iter()
            .zip(&self.buckets)
            .map(|(&le, &n)| {
                acc += n;
                (le, acc)
            })
            .collect()
    }
}

/// Point-in-time copy of one histogram series.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// (upper bound, cumulative count), without the implicit `+Inf` bucket.
    pub buckets: Vec<(f64, u64)>,
    pub count: u64,
    pub sum: f64,
}

pub struct HistogramVec {
    labels: Vec<String>,
    bounds: Vec<f64>,
    map: DashMap<LabelValues, HistogramState>,
}

impl HistogramVec {
    /// `bounds` must be strictly ascending (checked at definition validation).
    pub fn new(labels: Vec<String>, bounds: Vec<f64>) -> Self {
        Self {
            labels,
            bounds,
            map: DashMap::new(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn observe(&self, values: &[String], v: f64) {
        let bucket = self.bounds.iter().position(|&le| v <= le);

        let mut state = match self.map.get_mut(values) {
            Some(state) => state,
            None => self
                .map
                .entry(values.to_vec())
                .or_insert_with(|| HistogramState::new(self.bounds.len())),
        };

        if let Some(i) = bucket {
            state.buckets[i] += 1;
        }
        state.count += 1;
        state.sum += v;
    }

    pub fn snapshot(&self, values: &[String]) -> Option<HistogramSnapshot> {
        self.map.get(values).map(|state| HistogramSnapshot {
            buckets: state.cumulative(&self.bounds),
            count: state.count,
            sum: state.sum,
        })
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Render in Prometheus text exposition format (cumulative buckets).
    pub fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, MetricKind::Histogram);

        let mut series: Vec<(LabelValues, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| {
                let state = r.value();
                (
                    r.key().clone(),
                    HistogramSnapshot {
                        buckets: state.cumulative(&self.bounds),
                        count: state.count,
                        sum: state.sum,
                    },
                )
            })
            .collect();
        series.sort_by(|a, b| a.0.cmp(&b.0));

        let bucket_name = format!("{name}_bucket");
        let sum_name = format!("{name}_sum");
        let count_name = format!("{name}_count");
        for (values, snap) in series {
            for (le, n) in &snap.buckets {
                let le = format_value(*le);
                write_sample(out, &bucket_name, &self.labels, &values, Some(("le", le.as_str())), *n as f64);
            }
            write_sample(out, &bucket_name, &self.labels, &values, Some(("le", "+Inf")), snap.count as f64);
            write_sample(out, &sum_name, &self.labels, &values, None, snap.sum);
            write_sample(out, &count_name, &self.labels, &values, None, snap.count as f64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vals(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn gauge_last_write_wins() {
        let g = GaugeVec::new(vals(&["job"]));
        g.set(&vals(&["a"]), 3.0);
        g.set(&vals(&["a"]), -1.5);
        assert_eq!(g.get(&vals(&["a"])), Some(-1.5));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn counter_accumulates_fractions() {
        let c = CounterVec::new(vec![]);
        c.inc(&[]);
        c.add(&[], 0.5);
        assert_eq!(c.get(&[]), Some(1.5));
    }

    #[test]
    fn histogram_buckets_are_cumulative() {
        let h = HistogramVec::new(vals(&["job"]), vec![1.0, 5.0, 10.0]);
        let key = vals(&["etl"]);
        for v in [0.5, 1.0, 3.0, 7.0, 50.0] {
            h.observe(&key, v);
        }
        let snap = h.snapshot(&key).unwrap();
        assert_eq!(snap.buckets, vec![(1.0, 2), (5.0, 3), (10.0, 4)]);
        assert_eq!(snap.count, 5);
        assert_eq!(snap.sum, 61.5);
    }

    #[test]
    fn histogram_renders_inf_sum_and_count() {
        let h = HistogramVec::new(vals(&["job"]), vec![1.0, 2.5]);
        h.observe(&vals(&["etl"]), 2.0);

        let mut out = String::new();
        h.render("cron_job_duration_seconds", "Job duration", &mut out);
        let expected = "\
# HELP cron_job_duration_seconds Job duration
# TYPE cron_job_duration_seconds histogram
cron_job_duration_seconds_bucket{job=\"etl\",le=\"1\"} 0
cron_job_duration_seconds_bucket{job=\"etl\",le=\"2.5\"} 1
cron_job_duration_seconds_bucket{job=\"etl\",le=\"+Inf\"} 1
cron_job_duration_seconds_sum{job=\"etl\"} 2
cron_job_duration_seconds_count{job=\"etl\"} 1
";
        assert_eq!(out, expected);
    }

    #[test]
    fn series_render_sorted_by_label_values() {
        let g = GaugeVec::new(vals(&["job"]));
        g.set(&vals(&["zeta"]), 1.0);
        g.set(&vals(&["alpha"]), 2.0);

        let mut out = String::new();
        g.render("cron_last", "", &mut out);
        let alpha = out.find("alpha").unwrap();
        let zeta = out.find("zeta").unwrap();
        assert!(alpha < zeta);
    }
}
