//! Axum router wiring.
//!
//! - `POST /api/v1/push` : metric updates
//! - `GET  /metrics`     : exposition
//! - `GET  /health`      : liveness

use axum::{
    routing::{get, post},
    Router,
};

use crate::{api, app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/push", post(api::push))
        .route("/metrics", get(ops::metrics))
        .route("/health", get(ops::health))
        .with_state(state)
}
