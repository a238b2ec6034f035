//! Route modules.

use axum::Router;

use crate::state::AppState;

pub mod derivations;

/// Assemble all versioned routes.
pub fn router() -> Router<AppState> {
    Router::new().merge(derivations::router())
}
