//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use cronprom_core::error::{CronPromError, Result};

pub use schema::{CronpromConfig, GlobalSection, MetricConfig, WebSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<CronpromConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        CronPromError::Config(format!("read config failed ({}): {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<CronpromConfig> {
    let cfg: CronpromConfig = serde_yaml::from_str(s)
        .map_err(|e| CronPromError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
