//! Shared error types across cronprom crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// No metric is registered under the requested name and kind.
    MetricNotFound,
    /// Metric kind outside gauge/counter/histogram/summary.
    UnsupportedKind,
    /// Label not in `key=value` form.
    InvalidLabelFormat,
    /// Value rejected by the target aggregation.
    InvalidValue,
    /// Startup configuration rejected.
    InvalidConfig,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::MetricNotFound => "METRIC_NOT_FOUND",
            ClientCode::UnsupportedKind => "UNSUPPORTED_KIND",
            ClientCode::InvalidLabelFormat => "INVALID_LABEL_FORMAT",
            ClientCode::InvalidValue => "INVALID_VALUE",
            ClientCode::InvalidConfig => "INVALID_CONFIG",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Metric definition problems, detected before the registry is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("metric name cannot be empty")]
    EmptyName,
    #[error("histogram metric '{0}' must define buckets")]
    MissingBuckets(String),
    #[error("histogram metric '{0}' buckets must be strictly increasing")]
    UnsortedBuckets(String),
    #[error("summary metric '{0}' must define objectives")]
    MissingObjectives(String),
    #[error("summary metric '{name}' has invalid objective {quantile}: {error}")]
    InvalidObjective { name: String, quantile: f64, error: f64 },
    #[error("unknown metric type '{kind}' for metric '{name}'")]
    UnknownKind { name: String, kind: String },
    #[error("duplicate metric name: {0}")]
    DuplicateName(String),
}

/// Failures while instantiating aggregations in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("metric '{name}' collides with already registered '{exposed}'")]
    Duplicate { name: String, exposed: String },
    #[error("metric '{name}' has invalid label '{label}': {reason}")]
    InvalidLabel {
        name: String,
        label: String,
        reason: &'static str,
    },
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, CronPromError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum CronPromError {
    #[error("invalid metric definition: {0}")]
    Validation(#[from] ValidationError),
    #[error("registration failed: {0}")]
    Registration(#[from] RegistrationError),
    #[error("config: {0}")]
    Config(String),
    #[error("metric '{0}' not found")]
    MetricNotFound(String),
    #[error("unsupported metric type: {0}")]
    UnsupportedKind(String),
    #[error("invalid label format: {0} (expected key=value)")]
    InvalidLabelFormat(String),
    #[error("invalid value for metric '{metric}': {reason}")]
    InvalidValue { metric: String, reason: &'static str },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl CronPromError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            CronPromError::Validation(_) => ClientCode::BadRequest,
            CronPromError::Registration(_) | CronPromError::Config(_) => ClientCode::InvalidConfig,
            CronPromError::MetricNotFound(_) => ClientCode::MetricNotFound,
            CronPromError::UnsupportedKind(_) => ClientCode::UnsupportedKind,
            CronPromError::InvalidLabelFormat(_) => ClientCode::InvalidLabelFormat,
            CronPromError::InvalidValue { .. } => ClientCode::InvalidValue,
            CronPromError::BadRequest(_) => ClientCode::BadRequest,
            CronPromError::Transport(_) | CronPromError::Internal(_) => ClientCode::Internal,
        }
    }
}
