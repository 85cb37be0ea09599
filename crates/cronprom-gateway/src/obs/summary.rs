//! Summary vec: running count/sum plus quantiles over a sliding window.
//!
//! Each combination keeps its most recent observations (at most
//! [`MAX_SAMPLES`], none older than the vec's max age). Quantiles are computed
//! exactly over that window at render time, which trivially satisfies any
//! configured error tolerance.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use cronprom_core::MetricKind;

use super::exposition::{format_value, write_header, write_sample};

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(10 * 60);
pub const MAX_SAMPLES: usize = 500;

type LabelValues = Vec<String>;

struct SummaryState {
    count: u64,
    sum: f64,
    window: VecDeque<(Instant, f64)>,
}

impl SummaryState {
    fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            window: VecDeque::new(),
        }
    }

    fn observe_at(&mut self, now: Instant, v: f64, max_age: Duration) {
        self.count += 1;
        self.sum += v;
        self.window.push_back((now, v));
        if self.window.len() > MAX_SAMPLES {
            self.window.pop_front();
        }
        while let Some(&(at, _)) = self.window.front() {
            if now.saturating_duration_since(at) <= max_age {
                break;
            }
            self.window.pop_front();
        }
    }

    /// Read-only: expired samples are skipped, not evicted.
    fn quantiles_at(&self, now: Instant, max_age: Duration, objectives: &[(f64, f64)]) -> Vec<(f64, f64)> {
        let mut live: Vec<f64> = self
            .window
            .iter()
            .filter(|(at, _)| now.saturating_duration_since(*at) <= max_age)
            .map(|&(_, v)| v)
            .collect();
        live.sort_by(f64::total_cmp);
        objectives.iter().map(|&(q, _)| (q, quantile(&live, q))).collect()
    }
}

/// Nearest-rank quantile of sorted samples; NaN when there are none.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let rank = (q * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Point-in-time copy of one summary series.
#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    /// (quantile, estimate) in objective order.
    pub quantiles: Vec<(f64, f64)>,
    pub count: u64,
    pub sum: f64,
}

pub struct SummaryVec {
    labels: Vec<String>,
    objectives: Vec<(f64, f64)>,
    max_age: Duration,
    map: DashMap<LabelValues, SummaryState>,
}

impl SummaryVec {
    /// `objectives` are (quantile, allowed error), sorted by quantile.
    pub fn new(labels: Vec<String>, objectives: Vec<(f64, f64)>) -> Self {
        Self {
            labels,
            objectives,
            max_age: DEFAULT_MAX_AGE,
            map: DashMap::new(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn observe(&self, values: &[String], v: f64) {
        let now = Instant::now();
        let mut state = match self.map.get_mut(values) {
            Some(state) => state,
            None => self.map.entry(values.to_vec()).or_insert_with(SummaryState::new),
        };
        state.observe_at(now, v, self.max_age);
    }

    pub fn snapshot(&self, values: &[String]) -> Option<SummarySnapshot> {
        let now = Instant::now();
        self.map.get(values).map(|state| SummarySnapshot {
            quantiles: state.quantiles_at(now, self.max_age, &self.objectives),
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

    /// Render in Prometheus text exposition format.
    pub fn render(&self, name: &str, help: &str, out: &mut String) {
        write_header(out, name, help, MetricKind::Summary);

        let now = Instant::now();
        let mut series: Vec<(LabelValues, SummarySnapshot)> = self
            .map
            .iter()
            .map(|r| {
                let state = r.value();
                (
                    r.key().clone(),
                    SummarySnapshot {
                        quantiles: state.quantiles_at(now, self.max_age, &self.objectives),
                        count: state.count,
                        sum: state.sum,
                    },
                )
            })
            .collect();
        series.sort_by(|a, b| a.0.cmp(&b.0));

        let sum_name = format!("{name}_sum");
        let count_name = format!("{name}_count");
        for (values, snap) in series {
            for (q, estimate) in &snap.quantiles {
                let q = format_value(*q);
                write_sample(out, name, &self.labels, &values, Some(("quantile", q.as_str())), *estimate);
            }
            write_sample(out, &sum_name, &self.labels, &values, None, snap.sum);
            write_sample(out, &count_name, &self.labels, &values, None, snap.count as f64);
        }
    }
}
