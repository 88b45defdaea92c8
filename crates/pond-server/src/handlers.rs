use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use pond_core::{PartnerId, RawMessage};
use pond_engine::ReportScope;
use pond_session::SessionError;
use pond_telemetry::LogQuery;

use crate::server::AppState;

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// One raw message event as posted by a transport bridge.
#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub partner_id: String,
    pub display_name: Option<String>,
    pub sender: Option<String>,
    pub timestamp: Option<i64>,
    pub kind: Option<String>,
    pub text: Option<String>,
}

/// POST /v1/messages — ingest one event through the live session.
pub async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> impl IntoResponse {
    let partner = PartnerId::from_raw(req.partner_id);
    let raw = RawMessage {
        sender: req.sender,
        timestamp: req.timestamp,
        kind: req.kind.unwrap_or_else(|| "text".to_string()),
        text: req.text,
    };

    match state.session.observe(&partner, req.display_name.as_deref(), &raw) {
        Ok(observation) => (StatusCode::OK, Json(json!(observation))),
        Err(SessionError::Malformed(e)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        ),
        Err(SessionError::Store(e)) => {
            error!(partner = %partner, error = %e, "ingest failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// GET /v1/scores — the raw score map, recomputed from the stored logs.
pub async fn scores(State(state): State<AppState>) -> impl IntoResponse {
    match state.aggregator.compute_scores(state.source.as_ref()) {
        Ok(scores) => (StatusCode::OK, Json(json!(scores))),
        Err(e) => {
            error!(error = %e, "score computation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReportParams {
    pub scope: Option<String>,
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ReportResponse {
    entries: Vec<pond_engine::ReportEntry>,
    text: String,
}

/// GET /v1/report?scope=all|top&n=N — ranked percentage summary.
pub async fn report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> impl IntoResponse {
    let scope = match params.scope.as_deref() {
        Some("all") => ReportScope::All,
        Some("top") | None => match params.n {
            Some(n) => ReportScope::Top(n),
            None => state.formatter.default_scope(),
        },
        Some(other) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": format!("unknown scope: {other}") })),
            )
        }
    };

    match state.aggregator.compute_scores(state.source.as_ref()) {
        Ok(scores) => {
            let report = state.formatter.build(&scores, scope, state.source.as_ref());
            let text = report.render();
            (
                StatusCode::OK,
                Json(json!(ReportResponse {
                    entries: report.entries,
                    text,
                })),
            )
        }
        Err(e) => {
            error!(error = %e, "report computation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// GET /v1/logs?partner_id=&level=&since=&limit=N — persisted warn+
/// records, most recent first. 503 when log persistence is disabled.
pub async fn logs(
    State(state): State<AppState>,
    Query(query): Query<LogQuery>,
) -> impl IntoResponse {
    let Some(sink) = &state.logs else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "log persistence is disabled" })),
        );
    };
    match sink.query(&query) {
        Ok(records) => (StatusCode::OK, Json(json!(records))),
        Err(e) => {
            error!(error = %e, "log query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}

/// GET /v1/partners — known partners with display names.
pub async fn partners(State(state): State<AppState>) -> impl IntoResponse {
    match state.partners.list() {
        Ok(rows) => (StatusCode::OK, Json(json!(rows))),
        Err(e) => {
            error!(error = %e, "partner listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
        }
    }
}
