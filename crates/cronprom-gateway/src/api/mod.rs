//! Push API.
//!
//! `POST /api/v1/push` accepts one `MetricUpdate` per request. Errors are
//! reported as `{"status":"error","code":...,"msg":...}` with an HTTP status
//! derived from the client code.

pub mod push;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use cronprom_core::error::{ClientCode, CronPromError};

pub use push::push;

/// Error wrapper that renders a `CronPromError` as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub CronPromError);

impl From<CronPromError> for ApiError {
    fn from(e: CronPromError) -> Self {
        Self(e)
    }
}

pub fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest
        | ClientCode::UnsupportedKind
        | ClientCode::InvalidLabelFormat
        | ClientCode::InvalidValue => StatusCode::BAD_REQUEST,
        ClientCode::MetricNotFound => StatusCode::NOT_FOUND,
        ClientCode::InvalidConfig | ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.client_code();
        let body = json!({
            "status": "error",
            "code": code.as_str(),
            "msg": self.0.to_string(),
        });
        (status_for(code), Json(body)).into_response()
    }
}
