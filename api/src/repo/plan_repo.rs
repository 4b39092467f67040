//! Plan and installment persistence. A plan is written together with all
//! of its installments in a single transaction so a reader never observes
//! a plan with a partial installment set.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use risk::PlanSchedule;
use shared::{Installment, Plan};
use sqlx::PgPool;
use uuid::Uuid;

use super::decision_repo::RepoError;

#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn save_plan(
        &self,
        decision_id: Uuid,
        user_id: &str,
        schedule: &PlanSchedule,
        created_at: DateTime<Utc>,
    ) -> Result<Plan, RepoError>;

    async fn get_plan_by_id(&self, plan_id: Uuid) -> Result<Option<(Plan, Vec<Installment>)>, RepoError>;

    async fn get_plan_by_decision_id(&self, decision_id: Uuid) -> Result<Option<Plan>, RepoError>;
}

pub struct PgPlanRepo {
    pool: PgPool,
}

impl PgPlanRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlanStore for PgPlanRepo {
    async fn save_plan(
        &self,
        decision_id: Uuid,
        user_id: &str,
        schedule: &PlanSchedule,
        created_at: DateTime<Utc>,
    ) -> Result<Plan, RepoError> {
        let mut tx = self.pool.begin().await?;

        let plan_id = Uuid::new_v4();
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            INSERT INTO bnpl_plan (id, decision_id, user_id, total_cents, installments_count, days_between_installments, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, decision_id, user_id, total_cents, installments_count, days_between_installments, created_at
            "#,
        )
        .bind(plan_id)
        .bind(decision_id)
        .bind(user_id)
        .bind(schedule.total_cents)
        .bind(schedule.installments_count)
        .bind(schedule.days_between_installments)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;

        for installment in &schedule.installments {
            sqlx::query(
                r#"
                INSERT INTO bnpl_installment (id, plan_id, due_date, amount_cents, status, created_at)
                VALUES ($1, $2, $3, $4, 'pending', $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(plan_id)
            .bind(installment.due_date)
            .bind(installment.amount_cents)
            .bind(created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(plan)
    }

    async fn get_plan_by_id(
        &self,
        plan_id: Uuid,
    ) -> Result<Option<(Plan, Vec<Installment>)>, RepoError> {
        let plan = sqlx::query_as::<_, Plan>(
            "SELECT id, decision_id, user_id, total_cents, installments_count, days_between_installments, created_at \
             FROM bnpl_plan WHERE id = $1",
        )
        .bind(plan_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(plan) = plan else {
            return Ok(None);
        };

        let installments = sqlx::query_as::<_, Installment>(
            "SELECT id, plan_id, due_date, amount_cents, status, created_at \
             FROM bnpl_installment WHERE plan_id = $1 ORDER BY due_date ASC",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((plan, installments)))
    }

    async fn get_plan_by_decision_id(&self, decision_id: Uuid) -> Result<Option<Plan>, RepoError> {
        let plan = sqlx::query_as::<_, Plan>(
            "SELECT id, decision_id, user_id, total_cents, installments_count, days_between_installments, created_at \
             FROM bnpl_plan WHERE decision_id = $1",
        )
        .bind(decision_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(plan)
    }
}
