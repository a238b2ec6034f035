//! # Derivation API
//!
//! Per-tenant derivation trigger, current derived scope, and run history.

use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use nitaq_core::{OrganizationProfile, TenantId};
use nitaq_engine::{DerivationRun, DerivedScope, DerivedScopeItem};
use nitaq_store::RunStore;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Build the derivation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/v1/tenants/:tenant_id/derivations",
            post(trigger_derivation).get(list_derivations),
        )
        .route("/v1/tenants/:tenant_id/scope", get(get_scope))
}

/// Profile answers submitted with a derivation request. Mirrors
/// [`OrganizationProfile`] minus the tenant id, which comes from the path.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ProfileRequest {
    /// Legal form of the organization.
    #[serde(default)]
    pub organization_type: Option<String>,
    /// Industry sector.
    #[serde(default)]
    pub sector: Option<String>,
    /// Country of primary operation.
    #[serde(default)]
    pub country: Option<String>,
    /// Where workloads run.
    #[serde(default)]
    pub hosting_model: Option<String>,
    /// Size band.
    #[serde(default)]
    pub size_tier: Option<String>,
    /// Self-assessed compliance maturity.
    #[serde(default)]
    pub maturity_level: Option<String>,
    /// Critical national infrastructure flag.
    #[serde(default)]
    pub is_critical_infrastructure: Option<bool>,
    /// Categories of data handled.
    #[serde(default)]
    pub data_types: Vec<String>,
    /// Material third-party vendors.
    #[serde(default)]
    pub vendors: Vec<String>,
    /// Free-form additional answers.
    #[serde(default)]
    pub custom: BTreeMap<String, String>,
}

impl ProfileRequest {
    fn into_profile(self, tenant_id: TenantId) -> OrganizationProfile {
        OrganizationProfile {
            tenant_id,
            organization_type: self.organization_type,
            sector: self.sector,
            country: self.country,
            hosting_model: self.hosting_model,
            size_tier: self.size_tier,
            maturity_level: self.maturity_level,
            is_critical_infrastructure: self.is_critical_infrastructure,
            data_types: self.data_types,
            vendors: self.vendors,
            custom: self.custom,
        }
    }
}

/// Summary of a recorded derivation run.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RunSummary {
    /// Run identifier.
    pub run_id: String,
    /// Run status: `pending`, `completed`, or `failed`.
    pub status: String,
    /// When the run was recorded (ISO8601, UTC).
    pub created_at: String,
    /// Catalog version evaluated.
    pub catalog_version: String,
    /// Items included in scope. Zero for failed runs.
    pub included: usize,
    /// Failure detail for failed runs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

impl RunSummary {
    fn from_run(run: &DerivationRun) -> Self {
        Self {
            run_id: run.id.to_string(),
            status: run.status.as_str().to_string(),
            created_at: run.created_at.to_iso8601(),
            catalog_version: run.catalog_version.to_string(),
            included: run.included_items().count(),
            failure: run.failure.clone(),
        }
    }
}

/// Response to a successful derivation trigger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DerivationResponse {
    /// Summary of the recorded run.
    #[serde(flatten)]
    pub summary: RunSummary,
    /// Result fingerprint (`sha256:<hex>`); equal fingerprints mean equal
    /// derived scopes.
    pub fingerprint: String,
}

/// One item verdict in a scope response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScopeItemView {
    /// Catalog item identifier.
    pub item_id: String,
    /// Hierarchy level of the item.
    pub item_type: String,
    /// Stable catalog code.
    pub code: String,
    /// Whether the item is in scope.
    pub included: bool,
    /// Natural-language reason trace.
    pub reasons: Vec<String>,
    /// Rules whose conditions were satisfied.
    pub matched_rule_ids: Vec<String>,
}

impl ScopeItemView {
    fn from_item(item: &DerivedScopeItem) -> Self {
        Self {
            item_id: item.item_id.to_string(),
            item_type: item.item_type.as_str().to_string(),
            code: item.code.clone(),
            included: item.included,
            reasons: item.reasons.clone(),
            matched_rule_ids: item.matched_rule_ids.iter().map(|r| r.to_string()).collect(),
        }
    }
}

/// A tenant's current derived scope.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ScopeResponse {
    /// Catalog version the scope was derived against.
    pub catalog_version: String,
    /// When the underlying run was recorded (ISO8601, UTC).
    pub derived_at: String,
    /// One verdict per catalog item, in catalog order.
    pub items: Vec<ScopeItemView>,
}

/// POST /v1/tenants/{tenant_id}/derivations — trigger a derivation run.
#[utoipa::path(
    post,
    path = "/v1/tenants/{tenant_id}/derivations",
    params(
        ("tenant_id" = Uuid, Path, description = "Tenant to derive scope for"),
    ),
    request_body = ProfileRequest,
    responses(
        (status = 201, description = "Run completed and recorded", body = DerivationResponse),
        (status = 409, description = "A derivation is already in flight for this tenant", body = ErrorBody),
        (status = 422, description = "Invalid profile", body = ErrorBody),
    ),
    tag = "derivations"
)]
pub async fn trigger_derivation(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
    Json(request): Json<ProfileRequest>,
) -> Result<(StatusCode, Json<DerivationResponse>), AppError> {
    let profile = request.into_profile(TenantId::from_uuid(tenant_id));

    let run = state
        .coordinator
        .derive_and_record(&profile, &state.snapshot, &state.rules)?;

    let fingerprint = run
        .fingerprint()
        .map_err(|e| AppError::Internal(format!("fingerprint failed: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(DerivationResponse {
            summary: RunSummary::from_run(&run),
            fingerprint: fingerprint.to_string(),
        }),
    ))
}

/// GET /v1/tenants/{tenant_id}/scope — the latest completed derived scope.
#[utoipa::path(
    get,
    path = "/v1/tenants/{tenant_id}/scope",
    params(
        ("tenant_id" = Uuid, Path, description = "Tenant to read scope for"),
    ),
    responses(
        (status = 200, description = "Current derived scope", body = ScopeResponse),
        (status = 404, description = "No completed derivation for this tenant", body = ErrorBody),
    ),
    tag = "derivations"
)]
pub async fn get_scope(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<Json<ScopeResponse>, AppError> {
    let tenant = TenantId::from_uuid(tenant_id);
    let scope = state
        .coordinator
        .store()
        .latest_completed(&tenant)
        .as_ref()
        .and_then(DerivedScope::from_run)
        .ok_or_else(|| AppError::NotFound(format!("no derived scope for tenant {tenant}")))?;

    Ok(Json(ScopeResponse {
        catalog_version: scope.catalog_version.to_string(),
        derived_at: scope.derived_at.to_iso8601(),
        items: scope.items.iter().map(ScopeItemView::from_item).collect(),
    }))
}

/// GET /v1/tenants/{tenant_id}/derivations — run history, oldest first.
#[utoipa::path(
    get,
    path = "/v1/tenants/{tenant_id}/derivations",
    params(
        ("tenant_id" = Uuid, Path, description = "Tenant to read history for"),
    ),
    responses(
        (status = 200, description = "Run history, oldest first", body = [RunSummary]),
    ),
    tag = "derivations"
)]
pub async fn list_derivations(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Json<Vec<RunSummary>> {
    let tenant = TenantId::from_uuid(tenant_id);
    let history = state.coordinator.store().history(&tenant);
    Json(history.iter().map(RunSummary::from_run).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use nitaq_catalog::{CatalogItem, CatalogSnapshot};
    use nitaq_core::{CatalogItemId, CatalogItemType, CatalogVersion, RuleId};
    use nitaq_rules::{ConditionNode, Operator, Rule, RuleOutcome, RuleSet};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let regulator = CatalogItemId::new();
        let framework = CatalogItemId::new();
        let items = vec![
            CatalogItem::root(regulator, CatalogItemType::Regulator, "SAMA", "Saudi Central Bank"),
            CatalogItem::child(
                framework,
                CatalogItemType::Framework,
                regulator,
                "SAMA-CSF",
                "Cyber Security Framework",
            ),
        ];
        let snapshot =
            CatalogSnapshot::new(CatalogVersion::new("v1").unwrap(), items).unwrap();
        let rules = RuleSet::load(
            vec![Rule {
                id: RuleId::new(),
                target: framework,
                outcome: RuleOutcome::Include,
                priority: 10,
                active: true,
                version: CatalogVersion::new("v1").unwrap(),
                condition: ConditionNode::leaf("sector", Operator::Equals, "Banking"),
                description: None,
            }],
            &snapshot,
        );
        AppState::new(snapshot, rules)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn trigger_then_read_scope() {
        let state = test_state();
        let app = crate::app(state);
        let tenant = Uuid::new_v4();

        let response = app
            .clone()
            .oneshot(
                Request::post(format!("/v1/tenants/{tenant}/derivations"))
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"sector":"Banking","country":"SA"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["status"], "completed");
        assert_eq!(body["included"], 2);
        assert!(body["fingerprint"].as_str().unwrap().starts_with("sha256:"));

        let response = app
            .oneshot(
                Request::get(format!("/v1/tenants/{tenant}/scope"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["catalog_version"], "v1");
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i["included"] == true));
    }

    #[tokio::test]
    async fn scope_before_any_run_is_not_found() {
        let app = crate::app(test_state());
        let tenant = Uuid::new_v4();
        let response = app
            .oneshot(
                Request::get(format!("/v1/tenants/{tenant}/scope"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn history_accumulates_runs() {
        let state = test_state();
        let app = crate::app(state);
        let tenant = Uuid::new_v4();

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(
                    Request::post(format!("/v1/tenants/{tenant}/derivations"))
                        .header("content-type", "application/json")
                        .body(Body::from(r#"{"sector":"Banking"}"#))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .oneshot(
                Request::get(format!("/v1/tenants/{tenant}/derivations"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn health_probe() {
        let app = crate::app(test_state());
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
