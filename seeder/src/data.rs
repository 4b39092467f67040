//! Synthetic decision/plan/installment generation for local development,
//! grounded on `seeder::data`'s `create_publishers`/`create_contracts`
//! shape (const sample arrays driving an `StdRng`-seeded loop of inserts).

use chrono::Utc;
use rand::rngs::StdRng;
use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

const SAMPLE_USER_IDS: &[&str] = &[
    "user_alvarez", "user_chen", "user_okafor", "user_singh", "user_petrov",
    "user_nguyen", "user_garcia", "user_kowalski", "user_silva", "user_ahmed",
];

const SCORE_BANDS: &[&str] = &["A", "B", "C", "D"];

pub async fn create_decisions_with_plans(pool: &PgPool, rng: &mut StdRng, count: u32) -> anyhow::Result<()> {
    for i in 0..count {
        let user_id = SAMPLE_USER_IDS[i as usize % SAMPLE_USER_IDS.len()];
        let approved = rng.gen_bool(0.7);
        let score: f64 = if approved {
            rng.gen_range(35.0..100.0)
        } else {
            rng.gen_range(0.0..35.0)
        };
        let score_band = if approved {
            SCORE_BANDS[rng.gen_range(0..3)]
        } else {
            "deny"
        };
        let amount_requested_cents: i64 = rng.gen_range(1_000..20_000);
        let credit_limit_cents: i64 = if approved { rng.gen_range(2_000..20_000) } else { 0 };
        let amount_granted_cents = amount_requested_cents.min(credit_limit_cents);

        let decision_id = Uuid::new_v4();
        let risk_factors = serde_json::json!({ "reasons": [] });

        sqlx::query(
            r#"
            INSERT INTO bnpl_decision (
                id, user_id, amount_requested_cents, approved, credit_limit_cents,
                amount_granted_cents, score, score_band, risk_factors, request_id, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NULL, now())
            "#,
        )
        .bind(decision_id)
        .bind(user_id)
        .bind(amount_requested_cents)
        .bind(approved)
        .bind(credit_limit_cents)
        .bind(amount_granted_cents)
        .bind(score)
        .bind(score_band)
        .bind(risk_factors)
        .execute(pool)
        .await?;

        if approved {
            let plan_id = Uuid::new_v4();
            let created_at = Utc::now();
            sqlx::query(
                r#"
                INSERT INTO bnpl_plan (id, decision_id, user_id, total_cents, installments_count, days_between_installments, created_at)
                VALUES ($1, $2, $3, $4, 4, 14, $5)
                "#,
            )
            .bind(plan_id)
            .bind(decision_id)
            .bind(user_id)
            .bind(amount_granted_cents)
            .bind(created_at)
            .execute(pool)
            .await?;

            let base_amount = amount_granted_cents / 4;
            let remainder = amount_granted_cents - base_amount * 4;
            for installment_index in 1..=4i64 {
                let amount_cents = if installment_index == 4 {
                    base_amount + remainder
                } else {
                    base_amount
                };
                let due_date = created_at + chrono::Duration::days(14 * installment_index);
                sqlx::query(
                    r#"
                    INSERT INTO bnpl_installment (id, plan_id, due_date, amount_cents, status, created_at)
                    VALUES ($1, $2, $3, $4, 'pending', $5)
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(plan_id)
                .bind(due_date)
                .bind(amount_cents)
                .bind(created_at)
                .execute(pool)
                .await?;
            }
        }
    }

    Ok(())
}
