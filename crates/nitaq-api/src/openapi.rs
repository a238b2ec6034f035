//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::Json;
use utoipa::OpenApi;

/// Assembled OpenAPI spec for the derivation API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Nitaq API — Compliance Scope Derivation",
        version = "0.3.12",
        description = "Derives per-tenant compliance scope from an organization profile.\n\nProvides:\n- **Derivation runs**: evaluate the loaded rule set against a submitted profile and record the outcome\n- **Derived scope**: the latest completed run's per-item verdicts with reason traces\n- **Run history**: the append-only audit trail of runs per tenant\n\nCatalog and rule content is loaded at startup and immutable for the service lifetime.",
        license(name = "BUSL-1.1"),
        contact(name = "Momentum", url = "https://momentum.inc")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::derivations::trigger_derivation,
        crate::routes::derivations::get_scope,
        crate::routes::derivations::list_derivations,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::routes::derivations::ProfileRequest,
            crate::routes::derivations::DerivationResponse,
            crate::routes::derivations::RunSummary,
            crate::routes::derivations::ScopeResponse,
            crate::routes::derivations::ScopeItemView,
        ),
    ),
    tags(
        (name = "derivations", description = "Derivation runs, derived scope, and run history"),
    )
)]
pub struct ApiDoc;

/// GET /openapi.json — Return the generated OpenAPI specification.
pub async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
