//! Outbound push client used by `cronprom push`.
//!
//! Builds a `MetricUpdate` from command-line flags and POSTs it to a running
//! gateway. Kind and label format are checked locally so a typo fails before
//! any request is sent.

use std::time::Duration;

use cronprom_core::error::{CronPromError, Result};
use cronprom_core::protocol::parse_labels;
use cronprom_core::{MetricKind, MetricUpdate};

pub const PUSH_TIMEOUT: Duration = Duration::from_secs(10);

/// Flags of the `push` subcommand.
#[derive(Debug, Clone)]
pub struct PushRequest {
    /// Full push endpoint, e.g. `http://localhost:8080/api/v1/push`.
    pub url: String,
    pub name: String,
    pub kind: String,
    pub value: f64,
    /// Raw `key=value` strings.
    pub labels: Vec<String>,
}

impl PushRequest {
    pub fn to_update(&self) -> Result<MetricUpdate> {
        let kind: MetricKind = self.kind.parse()?;
        let labels = parse_labels(&self.labels)?;
        Ok(MetricUpdate {
            name: self.name.clone(),
            kind: kind.as_str().to_string(),
            value: self.value,
            labels,
        })
    }
}

pub async fn push(req: &PushRequest) -> Result<()> {
    let update = req.to_update()?;
    let client = reqwest::Client::builder()
        .timeout(PUSH_TIMEOUT)
        .build()
        .map_err(|e| CronPromError::Transport(format!("failed to build http client: {e}")))?;
    send_update(&client, &req.url, &update).await
}

pub async fn send_update(client: &reqwest::Client, url: &str, update: &MetricUpdate) -> Result<()> {
    tracing::debug!(
        url,
        metric = %update.name,
        kind = %update.kind,
        value = update.value,
        labels = ?update.labels,
        "sending metric update"
    );

    let resp = client
        .post(url)
        .json(update)
        .send()
        .await
        .map_err(|e| CronPromError::Transport(format!("failed to send request: {e}")))?;

    let status = resp.status();
    if status != reqwest::StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(CronPromError::Transport(format!(
            "unexpected status code: {status} {body}"
        )));
    }

    tracing::info!(
        metric = %update.name,
        kind = %update.kind,
        value = update.value,
        "metric update sent successfully"
    );
    Ok(())
}
