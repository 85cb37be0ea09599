//! Prometheus text exposition (format 0.0.4) helpers.

use std::fmt::Write;

use cronprom_core::MetricKind;

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Helper to escape label values.
pub fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// HELP text escapes backslash and newline only.
pub fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".into()
    } else if v == f64::INFINITY {
        "+Inf".into()
    } else if v == f64::NEG_INFINITY {
        "-Inf".into()
    } else {
        v.to_string()
    }
}

pub fn write_header(out: &mut String, name: &str, help: &str, kind: MetricKind) {
    let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
    let _ = writeln!(out, "# TYPE {} {}", name, kind.as_str());
}

/// One sample line. `extra` is appended after the declared labels (`le`, `quantile`).
pub fn write_sample(
    out: &mut String,
    name: &str,
    label_names: &[String],
    label_values: &[String],
    extra: Option<(&str, &str)>,
    value: f64,
) {
    let mut pairs: Vec<String> = label_names
        .iter()
        .zip(label_values)
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
        .collect();
    if let Some((k, v)) = extra {
        pairs.push(format!("{}=\"{}\"", k, escape_label(v)));
    }

    if pairs.is_empty() {
        let _ = writeln!(out, "{} {}", name, format_value(value));
    } else {
        let _ = writeln!(out, "{}{{{}}} {}", name, pairs.join(","), format_value(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_finite_values_use_prometheus_spelling() {
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
        assert_eq!(format_value(1700000000.0), "1700000000");
        assert_eq!(format_value(0.25), "0.25");
    }

    #[test]
    fn label_values_are_escaped() {
        assert_eq!(escape_label("a\"b\\c\nd"), "a\\\"b\\\\c\\nd");
    }

    #[test]
    fn unlabeled_sample_has_no_braces() {
        let mut out = String::new();
        write_sample(&mut out, "cron_up", &[], &[], None, 1.0);
        assert_eq!(out, "cron_up 1\n");
    }

    #[test]
    fn extra_label_follows_declared_labels() {
        let mut out = String::new();
        let names = vec!["job".to_string()];
        let values = vec!["etl".to_string()];
        write_sample(&mut out, "cron_d_bucket", &names, &values, Some(("le", "+Inf")), 3.0);
        assert_eq!(out, "cron_d_bucket{job=\"etl\",le=\"+Inf\"} 3\n");
    }
}
