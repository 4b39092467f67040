//! Route handlers, grounded on `api::handlers` from the teacher repo
//! (the `db_internal_error` helper, the `/health` DB-probe pattern) and on
//! `app/routers/v1.py` for the `/v1/decision`, `/v1/decision/history`, and
//! `/v1/plan/{plan_id}` surface.

use crate::error::{ApiError, ApiResult};
use crate::models::{DecisionHistoryEntry, DecisionRequest, DecisionResponse, PlanResponse};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

pub async fn health_check(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => {
            tracing::info!("health_check_ok");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "ok",
                    "uptime_secs": state.started_at.elapsed().as_secs(),
                    "version": env!("CARGO_PKG_VERSION"),
                    "timestamp": chrono::Utc::now(),
                })),
            )
        }
        Err(err) => {
            tracing::warn!(error = %err, "health_check_db_unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "uptime_secs": state.started_at.elapsed().as_secs(),
                    "version": env!("CARGO_PKG_VERSION"),
                    "timestamp": chrono::Utc::now(),
                })),
            )
        }
    }
}

pub async fn get_metrics(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = state.registry.gather();
    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %err, "metrics_encode_failed");
        return (StatusCode::INTERNAL_SERVER_ERROR, String::new());
    }
    (StatusCode::OK, String::from_utf8_lossy(&buffer).to_string())
}

pub async fn post_decision(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(request): Json<DecisionRequest>,
) -> ApiResult<Json<DecisionResponse>> {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| Some(Uuid::new_v4().to_string()));

    if request.user_id.trim().is_empty() {
        return Err(ApiError::bad_request("user_id must not be empty"));
    }
    if request.amount_requested_cents <= 0 {
        return Err(ApiError::bad_request("amount_requested_cents must be positive"));
    }

    let outcome = state
        .orchestrator
        .execute(&request.user_id, request.amount_requested_cents, request_id, None)
        .await
        .map_err(|err| match err {
            crate::orchestrator::OrchestratorError::BankApi(bank_err) => {
                tracing::warn!(error = %bank_err, "bank_api_error");
                ApiError::bank_api_error(bank_err.to_string())
            }
            crate::orchestrator::OrchestratorError::Repo(repo_err) => {
                tracing::error!(error = %repo_err, "orchestrator_repo_error");
                ApiError::internal("failed to persist decision")
            }
        })?;

    Ok(Json(DecisionResponse {
        approved: outcome.decision.approved,
        credit_limit_cents: outcome.decision.credit_limit_cents,
        amount_granted_cents: outcome.decision.amount_granted_cents,
        plan_id: DecisionResponse::plan_id_or_empty(outcome.plan.map(|p| p.id)),
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub user_id: String,
}

pub async fn get_decision_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Json<Vec<DecisionHistoryEntry>>> {
    let decisions = state
        .decision_store
        .get_decision_history(&query.user_id)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "decision_history_lookup_failed");
            ApiError::internal("failed to load decision history")
        })?;

    let mut entries = Vec::with_capacity(decisions.len());
    for d in decisions {
        let plan_id = if d.approved {
            state
                .plan_store
                .get_plan_by_decision_id(d.id)
                .await
                .map_err(|err| {
                    tracing::error!(error = %err, "decision_history_plan_lookup_failed");
                    ApiError::internal("failed to load decision history")
                })?
                .map(|plan| plan.id)
        } else {
            None
        };
        entries.push(DecisionHistoryEntry {
            decision_id: d.id,
            amount_requested_cents: d.amount_requested_cents,
            approved: d.approved,
            score: d.score,
            score_band: d.score_band,
            created_at: d.created_at,
            plan_id,
        });
    }

    Ok(Json(entries))
}

pub async fn get_plan(
    State(state): State<AppState>,
    Path(plan_id): Path<Uuid>,
) -> ApiResult<Json<PlanResponse>> {
    let found = state
        .plan_store
        .get_plan_by_id(plan_id)
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "plan_lookup_failed");
            ApiError::internal("failed to load plan")
        })?;

    let (plan, installments) = found.ok_or_else(|| ApiError::not_found("plan not found"))?;
    Ok(Json(PlanResponse::from_plan_and_installments(&plan, &installments)))
}

pub async fn route_not_found() -> ApiError {
    ApiError::not_found("no route matches this path")
}
