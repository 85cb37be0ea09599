//! Shared application state for the cronprom gateway.
//!
//! The collector is fully built and seeded here, before the router exists, so
//! every request handler observes a complete registry.

use std::sync::Arc;

use cronprom_core::error::Result;

use crate::build_info::BuildInfo;
use crate::collector::MetricCollector;
use crate::config::CronpromConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    collector: Arc<MetricCollector>,
}

struct AppStateInner {
    cfg: CronpromConfig,
    build: BuildInfo,
}

impl AppState {
    /// Build application state.
    /// Returns Result so main can report startup errors instead of panicking.
    pub fn new(cfg: CronpromConfig, build: BuildInfo) -> Result<Self> {
        let collector = MetricCollector::from_config(&cfg)?;
        collector.registry().seed_build_info(&build);

        tracing::info!(
            namespace = %collector.registry().namespace(),
            metrics = collector.registry().len(),
            version = %build.version,
            "metric collector ready"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner { cfg, build }),
            collector: Arc::new(collector),
        })
    }

    pub fn cfg(&self) -> &CronpromConfig {
        &self.inner.cfg
    }

    pub fn build_info(&self) -> &BuildInfo {
        &self.inner.build
    }

    pub fn collector(&self) -> Arc<MetricCollector> {
        Arc::clone(&self.collector)
    }
}
