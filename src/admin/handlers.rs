use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AppState;
use crate::observability::metrics;
use crate::routing::{Backend, RoutingTable, Rule};
use crate::store::ChangeEvent;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub generation: u64,
}

#[derive(Debug, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub host: String,
    #[serde(default)]
    pub path: String,
}

#[derive(Serialize)]
pub struct MatchResponse {
    pub matched: bool,
    pub generation: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule: Option<Rule>,
}

pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        generation: state.handle.generation(),
    })
}

pub async fn get_table(State(state): State<AppState>) -> Json<RoutingTable> {
    let table = state.handle.snapshot();
    Json(RoutingTable::clone(&table))
}

pub async fn get_match(State(state): State<AppState>, Query(query): Query<MatchQuery>) -> Json<MatchResponse> {
    let table = state.handle.snapshot();
    let rule = table.route(&query.host, &query.path).rule().cloned();

    metrics::record_match(rule.is_some());
    tracing::debug!(
        host = %query.host,
        path = %query.path,
        generation = table.generation,
        matched = rule.is_some(),
        "Admin match lookup"
    );

    Json(MatchResponse {
        matched: rule.is_some(),
        generation: table.generation,
        backend: rule.as_ref().map(|r| r.backend.clone()),
        rule,
    })
}

pub async fn post_reconcile(State(state): State<AppState>) -> Response {
    let reconciler = state.reconciler.clone();
    let result = tokio::task::spawn_blocking(move || reconciler.on_rule_set_change(&ChangeEvent::resync())).await;

    match result {
        Ok(Ok(summary)) => Json(summary).into_response(),
        Ok(Err(e)) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Reconcile task panicked");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
