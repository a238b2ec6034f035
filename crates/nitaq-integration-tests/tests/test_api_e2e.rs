//! Full HTTP flow over the assembled API: trigger a derivation, read the
//! derived scope, page through history, and check the service endpoints.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use nitaq_api::state::AppState;
use nitaq_catalog::{CatalogItem, CatalogSnapshot};
use nitaq_core::{CatalogItemId, CatalogItemType, CatalogVersion, RuleId};
use nitaq_rules::{ConditionNode, Operator, Rule, RuleOutcome, RuleSet};

fn app() -> axum::Router {
    let regulator = CatalogItemId::new();
    let framework = CatalogItemId::new();
    let baseline = CatalogItemId::new();
    let items = vec![
        CatalogItem::root(regulator, CatalogItemType::Regulator, "SAMA", "Saudi Central Bank"),
        CatalogItem::child(
            framework,
            CatalogItemType::Framework,
            regulator,
            "SAMA-CSF",
            "Cyber Security Framework",
        ),
        CatalogItem::child(
            baseline,
            CatalogItemType::Baseline,
            framework,
            "SAMA-CSF-L1",
            "Level 1 Baseline",
        ),
    ];
    let snapshot = CatalogSnapshot::new(CatalogVersion::new("v1").unwrap(), items).unwrap();

    let version = CatalogVersion::new("v1").unwrap();
    let rules = RuleSet::load(
        vec![
            Rule {
                id: RuleId::new(),
                target: framework,
                outcome: RuleOutcome::Include,
                priority: 100,
                active: true,
                version: version.clone(),
                condition: ConditionNode::leaf("sector", Operator::Equals, "Banking"),
                description: None,
            },
            Rule {
                id: RuleId::new(),
                target: baseline,
                outcome: RuleOutcome::Exclude,
                priority: 100,
                active: true,
                version,
                condition: ConditionNode::leaf("maturity_level", Operator::Equals, "Initial"),
                description: None,
            },
        ],
        &snapshot,
    );

    nitaq_api::app(AppState::new(snapshot, rules))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_derivation(
    app: &axum::Router,
    tenant: Uuid,
    profile: &str,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/v1/tenants/{tenant}/derivations"))
                .header("content-type", "application/json")
                .body(Body::from(profile.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

#[tokio::test]
async fn derivation_flow_end_to_end() {
    let app = app();
    let tenant = Uuid::new_v4();

    // No scope before the first run.
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/v1/tenants/{tenant}/scope"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Banking tenant at Initial maturity: framework in, baseline out.
    let (status, body) = post_derivation(
        &app,
        tenant,
        r#"{"sector":"Banking","maturity_level":"Initial"}"#,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["catalog_version"], "v1");

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/v1/tenants/{tenant}/scope"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let scope = body_json(response).await;
    let items = scope["items"].as_array().unwrap();
    assert_eq!(items.len(), 3);

    let by_code = |code: &str| {
        items
            .iter()
            .find(|i| i["code"] == code)
            .unwrap_or_else(|| panic!("missing item {code}"))
    };
    assert_eq!(by_code("SAMA-CSF")["included"], true);
    assert_eq!(by_code("SAMA-CSF-L1")["included"], false);
    assert_eq!(by_code("SAMA")["included"], true);
    assert!(by_code("SAMA-CSF")["reasons"]
        .as_array()
        .unwrap()
        .iter()
        .any(|r| r == "Sector = Banking"));
}

#[tokio::test]
async fn identical_profiles_produce_identical_fingerprints() {
    let app = app();
    let tenant = Uuid::new_v4();
    let profile = r#"{"sector":"Banking"}"#;

    let (_, first) = post_derivation(&app, tenant, profile).await;
    let (_, second) = post_derivation(&app, tenant, profile).await;

    assert_ne!(first["run_id"], second["run_id"]);
    assert_eq!(first["fingerprint"], second["fingerprint"]);

    let response = app
        .oneshot(
            Request::get(format!("/v1/tenants/{tenant}/derivations"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let history = body_json(response).await;
    let runs = history.as_array().unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0]["run_id"], first["run_id"]);
    assert_eq!(runs[1]["run_id"], second["run_id"]);
}

#[tokio::test]
async fn tenants_are_isolated_over_http() {
    let app = app();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    post_derivation(&app, a, r#"{"sector":"Banking"}"#).await;

    let response = app
        .oneshot(
            Request::get(format!("/v1/tenants/{b}/scope"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn service_endpoints_respond() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");

    let response = app
        .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let spec = body_json(response).await;
    assert!(spec["paths"]
        .as_object()
        .unwrap()
        .contains_key("/v1/tenants/{tenant_id}/derivations"));
}
