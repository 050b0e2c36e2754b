//! Admin API behaviour through the Axum router.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use ingress_router::admin::{setup_admin_router, AppState};
use ingress_router::routing::{PathType, RuleSet, TableHandle, TableReconciler, TracingObserver};
use ingress_router::store::MemoryRuleStore;
use serde_json::Value;
use tower::ServiceExt;

mod common;
use common::backend;

fn state(api_key: Option<&str>) -> (AppState, Arc<MemoryRuleStore>) {
    let store = Arc::new(MemoryRuleStore::new());
    store.apply(
        RuleSet::new("test", "web", 1)
            .with_rule("shop.example", "/", PathType::Prefix, backend("web"))
            .with_rule("shop.example", "/", PathType::Exact, backend("home")),
    );

    let reconciler = Arc::new(TableReconciler::new(
        store.clone(),
        TableHandle::default(),
        Arc::new(TracingObserver),
    ));
    reconciler.reconcile().unwrap();

    (AppState::new(reconciler, api_key.map(String::from)), store)
}

async fn get_json(app: axum::Router, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header("Authorization", format!("Bearer {}", token));
    }
    let response = app.oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_health_reports_generation() {
    let (state, _) = state(None);
    let (status, json) = get_json(setup_admin_router(state), "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["generation"], 1);
}

#[tokio::test]
async fn test_match_lookup() {
    let (state, _) = state(None);
    let app = setup_admin_router(state);

    let (status, json) = get_json(app.clone(), "/admin/match?host=Shop.Example&path=/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matched"], true);
    assert_eq!(json["backend"]["service"], "home");
    assert_eq!(json["rule"]["path_type"], "Exact");

    let (_, json) = get_json(app.clone(), "/admin/match?host=shop.example&path=/cart", None).await;
    assert_eq!(json["backend"]["service"], "web");

    let (status, json) = get_json(app, "/admin/match?host=unknown&path=/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["matched"], false);
    assert!(json.get("backend").is_none());
}

#[tokio::test]
async fn test_table_dump_is_in_match_order() {
    let (state, _) = state(None);
    let (status, json) = get_json(setup_admin_router(state), "/admin/table", None).await;
    assert_eq!(status, StatusCode::OK);

    let rules = json["hosts"]["shop.example"].as_array().unwrap();
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0]["path_type"], "Exact");
    assert_eq!(rules[1]["path_type"], "Prefix");
}

#[tokio::test]
async fn test_auth_required_when_key_configured() {
    let (state, _) = state(Some("s3cret"));
    let app = setup_admin_router(state);

    let (status, _) = get_json(app.clone(), "/admin/table", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_json(app.clone(), "/admin/table", Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_json(app.clone(), "/admin/table", Some("s3cret")).await;
    assert_eq!(status, StatusCode::OK);

    // Liveness stays open.
    let (status, _) = get_json(app, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forced_reconcile_publishes_changes() {
    let (state, store) = state(None);
    let app = setup_admin_router(state.clone());

    store.withdraw("test", "web");
    let request = Request::builder()
        .method("POST")
        .uri("/admin/reconcile")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let summary: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(summary["generation"], 2);
    assert_eq!(summary["rules"], 0);
    assert!(state.handle.route("shop.example", "/").is_none());
}
