//! Shared application state, grounded on `api::state::AppState` from the
//! teacher repo.

use crate::orchestrator::Orchestrator;
use crate::repo::{DecisionStore, PlanStore};
use prometheus::Registry;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub started_at: Instant,
    pub registry: Registry,
    pub decision_store: Arc<dyn DecisionStore>,
    pub plan_store: Arc<dyn PlanStore>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        registry: Registry,
        decision_store: Arc<dyn DecisionStore>,
        plan_store: Arc<dyn PlanStore>,
        orchestrator: Arc<Orchestrator>,
    ) -> Self {
        Self {
            db,
            started_at: Instant::now(),
            registry,
            decision_store,
            plan_store,
            orchestrator,
        }
    }
}
