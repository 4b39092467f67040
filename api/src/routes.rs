//! Route-group constructors, grounded on `api::routes` from the teacher
//! repo: small functions returning `Router<AppState>` merged together in
//! `main.rs`.

use crate::handlers;
use crate::state::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::get_metrics))
}

pub fn decision_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/decision", post(handlers::post_decision))
        .route("/v1/decision/history", get(handlers::get_decision_history))
}

pub fn plan_routes() -> Router<AppState> {
    Router::new().route("/v1/plan/:plan_id", get(handlers::get_plan))
}
