use std::fmt;
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use cronprom_core::error::{CronPromError, Result};

use crate::collector::definition;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CronpromConfig {
    pub global: GlobalSection,

    #[serde(default)]
    pub web: WebSection,

    #[serde(default)]
    pub metrics: Vec<MetricConfig>,
}

impl CronpromConfig {
    pub fn validate(&self) -> Result<()> {
        self.global.validate()?;
        self.web.listen_addr()?;
        definition::validate(&self.metrics)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalSection {
    /// Prefix joined to every exposed metric name with `_`.
    pub namespace: String,

    #[serde(default = "default_refresh_interval", with = "humantime_serde")]
    pub refresh_interval: Duration,
}

impl GlobalSection {
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(CronPromError::Config("global.namespace cannot be empty".into()));
        }
        if !is_identifier(&self.namespace) {
            return Err(CronPromError::Config(format!(
                "global.namespace must match [A-Za-z_][A-Za-z0-9_]*: {}",
                self.namespace
            )));
        }
        if self.refresh_interval.is_zero() {
            return Err(CronPromError::Config(
                "global.refresh_interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

fn default_refresh_interval() -> Duration {
    Duration::from_secs(60)
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebSection {
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

impl WebSection {
    /// Bind target as `host:port`. The `:8080` shorthand binds all interfaces.
    /// Host names are kept as written and resolved when the listener binds.
    pub fn listen_addr(&self) -> Result<String> {
        let addr = if self.address.starts_with(':') {
            format!("0.0.0.0{}", self.address)
        } else {
            self.address.clone()
        };

        let valid = match addr.rsplit_once(':') {
            Some((host, port)) => !host.is_empty() && port.parse::<u16>().is_ok(),
            None => false,
        };
        if !valid {
            return Err(CronPromError::Config(format!(
                "web.address must be host:port or :port, got {}",
                self.address
            )));
        }
        Ok(addr)
    }
}

fn default_address() -> String {
    "0.0.0.0:8080".into()
}

/// One entry of `metrics:` exactly as written in the file.
///
/// Kind-specific fields are checked by `definition::validate`, which also
/// turns the record into a typed `MetricDefinition`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricConfig {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub labels: Vec<String>,

    #[serde(default)]
    pub default_value: Option<f64>,

    #[serde(default)]
    pub buckets: Vec<f64>,

    /// quantile -> allowed error. `None` when the key is absent.
    #[serde(default, deserialize_with = "deserialize_objectives")]
    pub objectives: Option<Vec<(f64, f64)>>,
}

fn deserialize_objectives<'de, D>(d: D) -> std::result::Result<Option<Vec<(f64, f64)>>, D::Error>
where
    D: Deserializer<'de>,
{
    struct ObjectivesVisitor;

    impl<'de> Visitor<'de> for ObjectivesVisitor {
        type Value = Vec<(f64, f64)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of quantile to allowed error")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<Self::Value, A::Error> {
            let mut out = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((quantile, error)) = map.next_entry::<f64, f64>()? {
                out.push((quantile, error));
            }
            Ok(out)
        }
    }

    d.deserialize_map(ObjectivesVisitor).map(Some)
}

pub(crate) fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
