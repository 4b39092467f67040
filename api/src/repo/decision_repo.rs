//! Decision persistence: an upsert on `(request_id)` keyed by a first-class
//! unique column (see DESIGN.md for why this departs from the original's
//! JSONB-embedded `_request_id`), read back immediately so a replayed
//! request returns the exact row created the first time.

use async_trait::async_trait;
use shared::Decision;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait DecisionStore: Send + Sync {
    async fn save_decision(
        &self,
        user_id: &str,
        amount_requested_cents: i64,
        approved: bool,
        credit_limit_cents: i64,
        amount_granted_cents: i64,
        score: f64,
        score_band: &str,
        risk_factors: serde_json::Value,
        request_id: Option<&str>,
    ) -> Result<Decision, RepoError>;

    async fn get_decision_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<Decision>, RepoError>;

    async fn get_decision_history(&self, user_id: &str) -> Result<Vec<Decision>, RepoError>;
}

pub struct PgDecisionRepo {
    pool: PgPool,
}

impl PgDecisionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DecisionStore for PgDecisionRepo {
    async fn save_decision(
        &self,
        user_id: &str,
        amount_requested_cents: i64,
        approved: bool,
        credit_limit_cents: i64,
        amount_granted_cents: i64,
        score: f64,
        score_band: &str,
        risk_factors: serde_json::Value,
        request_id: Option<&str>,
    ) -> Result<Decision, RepoError> {
        let id = Uuid::new_v4();
        let decision = sqlx::query_as::<_, Decision>(
            r#"
            INSERT INTO bnpl_decision (
                id, user_id, amount_requested_cents, approved, credit_limit_cents,
                amount_granted_cents, score, score_band, risk_factors, request_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now())
            ON CONFLICT (request_id) WHERE request_id IS NOT NULL
            DO UPDATE SET request_id = EXCLUDED.request_id
            RETURNING id, user_id, amount_requested_cents, approved, credit_limit_cents,
                      amount_granted_cents, score, score_band, risk_factors, request_id, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(amount_requested_cents)
        .bind(approved)
        .bind(credit_limit_cents)
        .bind(amount_granted_cents)
        .bind(score)
        .bind(score_band)
        .bind(risk_factors)
        .bind(request_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(decision)
    }

    async fn get_decision_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<Decision>, RepoError> {
        let decision = sqlx::query_as::<_, Decision>(
            "SELECT id, user_id, amount_requested_cents, approved, credit_limit_cents, \
             amount_granted_cents, score, score_band, risk_factors, request_id, created_at \
             FROM bnpl_decision WHERE request_id = $1",
        )
        .bind(request_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(decision)
    }

    async fn get_decision_history(&self, user_id: &str) -> Result<Vec<Decision>, RepoError> {
        let decisions = sqlx::query_as::<_, Decision>(
            "SELECT id, user_id, amount_requested_cents, approved, credit_limit_cents, \
             amount_granted_cents, score, score_band, risk_factors, request_id, created_at \
             FROM bnpl_decision WHERE user_id = $1 ORDER BY created_at DESC LIMIT 10",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(decisions)
    }
}
