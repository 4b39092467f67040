//! Request/response DTOs for the `/v1` HTTP surface, grounded on
//! `app/schemas/desicion_schema.py` and `app/routers/v1.py`'s response
//! construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Installment, InstallmentStatus, Plan};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct DecisionRequest {
    pub user_id: String,
    pub amount_requested_cents: i64,
}

#[derive(Debug, Serialize)]
pub struct DecisionResponse {
    pub approved: bool,
    pub credit_limit_cents: i64,
    pub amount_granted_cents: i64,
    pub plan_id: String,
}

impl DecisionResponse {
    pub fn plan_id_or_empty(plan_id: Option<Uuid>) -> String {
        plan_id.map(|id| id.to_string()).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct DecisionHistoryEntry {
    pub decision_id: Uuid,
    pub amount_requested_cents: i64,
    pub approved: bool,
    pub score: f64,
    pub score_band: String,
    pub created_at: DateTime<Utc>,
    pub plan_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    pub id: Uuid,
    pub due_date: DateTime<Utc>,
    pub amount_cents: i64,
    pub status: InstallmentStatus,
}

impl From<&Installment> for InstallmentResponse {
    fn from(installment: &Installment) -> Self {
        Self {
            id: installment.id,
            due_date: installment.due_date,
            amount_cents: installment.amount_cents,
            status: installment.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub plan_id: Uuid,
    pub total_cents: i64,
    pub installments: Vec<InstallmentResponse>,
}

impl PlanResponse {
    pub fn from_plan_and_installments(plan: &Plan, installments: &[Installment]) -> Self {
        Self {
            plan_id: plan.id,
            total_cents: plan.total_cents,
            installments: installments.iter().map(InstallmentResponse::from).collect(),
        }
    }
}
