//! # nitaq-api — Axum API Service
//!
//! The thin HTTP surface over the derivation engine.
//!
//! ## API Surface
//!
//! | Method | Path                                  | Purpose                     |
//! |--------|---------------------------------------|-----------------------------|
//! | POST   | `/v1/tenants/{tenant_id}/derivations` | Trigger a derivation run    |
//! | GET    | `/v1/tenants/{tenant_id}/scope`       | Latest derived scope        |
//! | GET    | `/v1/tenants/{tenant_id}/derivations` | Run history, oldest first   |
//! | GET    | `/health`                             | Liveness probe              |
//! | GET    | `/openapi.json`                       | OpenAPI 3 spec              |
//!
//! Catalog and rule content is loaded once at startup; the service holds
//! one immutable snapshot and rule set for its lifetime. Content updates
//! ship as a restart with new files.

pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .route("/health", get(health))
        .route("/openapi.json", get(openapi::serve_openapi))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health — liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
