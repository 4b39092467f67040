//! Outbound webhook audit trail: one row per plan recording delivery
//! status and attempt count, grounded on
//! `infrastructure/db/models/webhook_attempts.py`'s `OutboundWebhookModel`.

use async_trait::async_trait;
use serde_json::Value;
use shared::OutboundWebhook;
use sqlx::PgPool;
use uuid::Uuid;

use super::decision_repo::RepoError;

#[async_trait]
pub trait WebhookRepo: Send + Sync {
    async fn create_pending(
        &self,
        event_type: &str,
        payload: Value,
        target_url: &str,
        plan_id: Uuid,
    ) -> Result<OutboundWebhook, RepoError>;

    async fn record_attempt(&self, id: Uuid, success: bool) -> Result<(), RepoError>;
}

pub struct PgWebhookRepo {
    pool: PgPool,
}

impl PgWebhookRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WebhookRepo for PgWebhookRepo {
    async fn create_pending(
        &self,
        event_type: &str,
        payload: Value,
        target_url: &str,
        plan_id: Uuid,
    ) -> Result<OutboundWebhook, RepoError> {
        let id = Uuid::new_v4();
        let webhook = sqlx::query_as::<_, OutboundWebhook>(
            r#"
            INSERT INTO outbound_webhook (id, event_type, payload, target_url, status, attempts, created_at, plan_id)
            VALUES ($1, $2, $3, $4, 'pending', 0, now(), $5)
            RETURNING id, event_type, payload, target_url, status, attempts, last_attempt_at, created_at, plan_id
            "#,
        )
        .bind(id)
        .bind(event_type)
        .bind(payload)
        .bind(target_url)
        .bind(plan_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(webhook)
    }

    async fn record_attempt(&self, id: Uuid, success: bool) -> Result<(), RepoError> {
        let status = if success { "success" } else { "failed" };
        sqlx::query(
            "UPDATE outbound_webhook SET attempts = attempts + 1, last_attempt_at = now(), status = $2 WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
