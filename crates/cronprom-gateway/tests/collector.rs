//! Metric collector behavior: registry build, label normalization, routing,
//! and concurrent updates.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use cronprom_core::error::{CronPromError, RegistrationError};
use cronprom_core::{LabelSet, MetricKind, MetricUpdate};
use cronprom_gateway::collector::{Aggregation, MetricCollector, MetricDefinition, MetricSpec};

fn labels(pairs: &[(&str, &str)]) -> LabelSet {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn key(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

fn collector() -> MetricCollector {
    let defs = [
        MetricDefinition::new("job_last_success", MetricSpec::Gauge { default_value: None })
            .with_description("Unix time of the last successful run")
            .with_labels(["job_name", "environment"]),
        MetricDefinition::new("job_failures_total", MetricSpec::Counter)
            .with_labels(["job_name", "environment", "error_type"]),
        MetricDefinition::new(
            "job_duration_seconds",
            MetricSpec::Histogram {
                buckets: vec![1.0, 10.0, 60.0],
            },
        )
        .with_labels(["job_name"]),
        MetricDefinition::new(
            "job_rows",
            MetricSpec::Summary {
                objectives: vec![(0.5, 0.05), (0.9, 0.01)],
            },
        )
        .with_labels(["job_name"]),
    ];
    MetricCollector::new("cron", &defs).unwrap()
}

fn gauge_value(c: &MetricCollector, name: &str, values: &[&str]) -> Option<f64> {
    match c.registry().get(name, MetricKind::Gauge) {
        Some(Aggregation::Gauge(g)) => g.get(&key(values)),
        _ => panic!("{name} is not a gauge"),
    }
}

fn counter_value(c: &MetricCollector, name: &str, values: &[&str]) -> Option<f64> {
    match c.registry().get(name, MetricKind::Counter) {
        Some(Aggregation::Counter(v)) => v.get(&key(values)),
        _ => panic!("{name} is not a counter"),
    }
}

#[test]
fn every_definition_is_reachable_by_kind() {
    let c = collector();
    assert_eq!(c.registry().len(), 4);
    assert!(c.registry().get("job_last_success", MetricKind::Gauge).is_some());
    assert!(c.registry().get("job_failures_total", MetricKind::Counter).is_some());
    assert!(c.registry().get("job_duration_seconds", MetricKind::Histogram).is_some());
    assert!(c.registry().get("job_rows", MetricKind::Summary).is_some());
}

#[test]
fn missing_labels_get_filler() {
    let c = collector();
    c.update_gauge("job_last_success", 1700000000.0, labels(&[("job_name", "backup")]))
        .unwrap();

    assert_eq!(
        gauge_value(&c, "job_last_success", &["backup", "<missing>"]),
        Some(1700000000.0)
    );
}

#[test]
fn extra_labels_are_dropped() {
    let c = collector();
    c.increment_counter(
        "job_failures_total",
        1.0,
        labels(&[
            ("job_name", "x"),
            ("environment", "prod"),
            ("error_type", "timeout"),
            ("extra", "drop-me"),
        ]),
    )
    .unwrap();

    assert_eq!(counter_value(&c, "job_failures_total", &["x", "prod", "timeout"]), Some(1.0));
    let text = c.render();
    assert!(text.contains(
        "cron_job_failures_total{job_name=\"x\",environment=\"prod\",error_type=\"timeout\"} 1\n"
    ));
    assert!(!text.contains("drop-me"));
}

#[test]
fn normalize_keeps_exactly_declared_keys() {
    let c = collector();
    let out = c
        .registry()
        .normalize(
            "job_failures_total",
            labels(&[("job_name", "x"), ("other", "y")]),
        )
        .unwrap();
    let mut keys: Vec<_> = out.keys().cloned().collect();
    keys.sort();
    assert_eq!(keys, ["environment", "error_type", "job_name"]);
}

#[test]
fn normalize_unknown_metric_fails() {
    let c = collector();
    let err = c.registry().normalize("nope", LabelSet::new()).unwrap_err();
    assert!(matches!(err, CronPromError::MetricNotFound(ref n) if n == "nope"));
}

#[test]
fn unknown_metric_is_not_found() {
    let c = collector();
    let err = c.update_gauge("unknown_metric", 1.0, LabelSet::new()).unwrap_err();
    assert!(matches!(err, CronPromError::MetricNotFound(_)));
}

#[test]
fn kind_mismatch_is_not_found() {
    let c = collector();
    let err = c
        .update_gauge("job_failures_total", 1.0, LabelSet::new())
        .unwrap_err();
    assert_eq!(err.client_code().as_str(), "METRIC_NOT_FOUND");
}

#[test]
fn repeated_gauge_updates_converge() {
    let c = collector();
    let l = labels(&[("job_name", "a"), ("environment", "prod")]);
    for _ in 0..5 {
        c.update_gauge("job_last_success", 42.0, l.clone()).unwrap();
    }
    assert_eq!(gauge_value(&c, "job_last_success", &["a", "prod"]), Some(42.0));
    match c.registry().get("job_last_success", MetricKind::Gauge) {
        Some(Aggregation::Gauge(g)) => assert_eq!(g.len(), 1),
        _ => unreachable!(),
    }
}

#[test]
fn counter_sums_non_negative_deltas() {
    let c = collector();
    let l = labels(&[("job_name", "a"), ("environment", "prod"), ("error_type", "io")]);
    let deltas = [0.0, 1.0, 2.5, 10.0, 0.5];
    for d in deltas {
        c.increment_counter("job_failures_total", d, l.clone()).unwrap();
    }
    c.inc_counter("job_failures_total", l).unwrap();

    assert_eq!(
        counter_value(&c, "job_failures_total", &["a", "prod", "io"]),
        Some(deltas.iter().sum::<f64>() + 1.0)
    );
}

#[test]
fn negative_counter_delta_is_rejected() {
    let c = collector();
    let l = labels(&[("job_name", "a"), ("environment", "prod"), ("error_type", "io")]);
    c.increment_counter("job_failures_total", 3.0, l.clone()).unwrap();

    let err = c.increment_counter("job_failures_total", -1.0, l).unwrap_err();
    assert_eq!(err.client_code().as_str(), "INVALID_VALUE");
    assert_eq!(counter_value(&c, "job_failures_total", &["a", "prod", "io"]), Some(3.0));
}

#[test]
fn nan_counter_delta_is_rejected() {
    let c = collector();
    let l = labels(&[("job_name", "a"), ("environment", "prod"), ("error_type", "io")]);
    c.increment_counter("job_failures_total", 5.0, l.clone()).unwrap();

    let err = c
        .increment_counter("job_failures_total", f64::NAN, l.clone())
        .unwrap_err();
    assert_eq!(err.client_code().as_str(), "INVALID_VALUE");
    assert_eq!(counter_value(&c, "job_failures_total", &["a", "prod", "io"]), Some(5.0));

    c.increment_counter("job_failures_total", 1.0, l).unwrap();
    assert_eq!(counter_value(&c, "job_failures_total", &["a", "prod", "io"]), Some(6.0));
}

#[test]
fn histogram_and_summary_observations() {
    let c = collector();
    for v in [0.5, 5.0, 120.0] {
        c.observe_histogram("job_duration_seconds", v, labels(&[("job_name", "etl")]))
            .unwrap();
        c.observe_summary("job_rows", v, labels(&[("job_name", "etl")])).unwrap();
    }

    match c.registry().get("job_duration_seconds", MetricKind::Histogram) {
        Some(Aggregation::Histogram(h)) => {
            let snap = h.snapshot(&key(&["etl"])).unwrap();
            assert_eq!(snap.buckets, vec![(1.0, 1), (10.0, 2), (60.0, 2)]);
            assert_eq!(snap.count, 3);
            assert_eq!(snap.sum, 125.5);
        }
        _ => panic!("histogram missing"),
    }

    match c.registry().get("job_rows", MetricKind::Summary) {
        Some(Aggregation::Summary(s)) => {
            let snap = s.snapshot(&key(&["etl"])).unwrap();
            assert_eq!(snap.count, 3);
            assert_eq!(snap.quantiles, vec![(0.5, 5.0), (0.9, 120.0)]);
        }
        _ => panic!("summary missing"),
    }
}

#[test]
fn apply_routes_by_kind_string() {
    let c = collector();
    c.apply(MetricUpdate {
        name: "job_failures_total".into(),
        kind: "COUNTER".into(),
        value: 2.0,
        labels: labels(&[("job_name", "x")]),
    })
    .unwrap();
    assert_eq!(
        counter_value(&c, "job_failures_total", &["x", "<missing>", "<missing>"]),
        Some(2.0)
    );

    let err = c
        .apply(MetricUpdate {
            name: "job_failures_total".into(),
            kind: "meter".into(),
            value: 1.0,
            labels: LabelSet::new(),
        })
        .unwrap_err();
    assert!(matches!(err, CronPromError::UnsupportedKind(_)));

    let err = c
        .apply(MetricUpdate {
            name: String::new(),
            kind: "gauge".into(),
            value: 1.0,
            labels: LabelSet::new(),
        })
        .unwrap_err();
    assert!(err.to_string().contains("metric name cannot be empty"));
}

#[test]
fn raw_and_sanitized_names_route_to_the_same_metric() {
    let defs = [MetricDefinition::new("backup-runs", MetricSpec::Counter)];
    let c = MetricCollector::new("cron", &defs).unwrap();
    c.inc_counter("backup-runs", LabelSet::new()).unwrap();
    c.inc_counter("backup_runs", LabelSet::new()).unwrap();
    assert!(c.render().contains("cron_backup_runs 2\n"));
}

#[test]
fn sanitized_collision_fails_build() {
    let defs = [
        MetricDefinition::new("job-a", MetricSpec::Counter),
        MetricDefinition::new("job.a", MetricSpec::Counter),
    ];
    let err = MetricCollector::new("cron", &defs).err().expect("must fail");
    assert!(matches!(
        err,
        CronPromError::Registration(RegistrationError::Duplicate { .. })
    ));
}

#[test]
fn concurrent_increments_lose_nothing() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 1000;

    let c = Arc::new(collector());
    let l = labels(&[("job_name", "a"), ("environment", "prod"), ("error_type", "io")]);

    thread::scope(|s| {
        for _ in 0..THREADS {
            let c = Arc::clone(&c);
            let l = l.clone();
            s.spawn(move || {
                for _ in 0..PER_THREAD {
                    c.inc_counter("job_failures_total", l.clone()).unwrap();
                }
            });
        }
    });

    assert_eq!(
        counter_value(&c, "job_failures_total", &["a", "prod", "io"]),
        Some((THREADS * PER_THREAD) as f64)
    );
}

#[test]
fn concurrent_histogram_observations_stay_consistent() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 500;

    let c = Arc::new(collector());

    thread::scope(|s| {
        for t in 0..THREADS {
            let c = Arc::clone(&c);
            s.spawn(move || {
                for i in 0..PER_THREAD {
                    let v = ((t + i) % 3) as f64 * 20.0; // 0, 20, 40
                    c.observe_histogram("job_duration_seconds", v, labels(&[("job_name", "etl")]))
                        .unwrap();
                }
            });
        }
    });

    match c.registry().get("job_duration_seconds", MetricKind::Histogram) {
        Some(Aggregation::Histogram(h)) => {
            let snap = h.snapshot(&key(&["etl"])).unwrap();
            let total = (THREADS * PER_THREAD) as u64;
            assert_eq!(snap.count, total);
            // Every value is <= 60, so the last finite bucket holds everything.
            assert_eq!(snap.buckets.last().unwrap().1, total);
        }
        _ => panic!("histogram missing"),
    }
}
