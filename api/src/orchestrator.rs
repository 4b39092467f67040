//! Orchestrates a single decision request end to end: fetch transactions,
//! run the risk pipeline, persist the decision, persist the plan if
//! approved, then dispatch the webhook. Grounded on
//! `application/service/validate_decision.py`'s `ValidateDecisionService`.
//!
//! Ordering is load-bearing (spec §5 "Strict ordering"): the decision is
//! persisted before the plan, and the webhook is only ever sent after both
//! are durably written. A webhook failure never rolls back the decision —
//! it is recorded and left for a retry sweep, not undone.

use crate::bank_client::{BankClientError, TransactionSource};
use crate::metrics::{CREDIT_LIMIT_BUCKET_TOTAL, DECISIONS_TOTAL, DECISION_DURATION_SECONDS};
use crate::repo::{DecisionStore, PlanStore, WebhookRepo};
use crate::webhook::{WebhookPayload, WebhookSink};
use chrono::Utc;
use risk::{
    compute_cooldown, compute_payback_capacity, FeatureExtractor, PaycheckInfo, PlanBuilder,
    RiskConfig, RiskEngine, RiskTier, UtilizationAnalyzer, UserEvent,
};
use shared::{Decision, Plan, Transaction, TransactionType};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("bank API error: {0}")]
    BankApi(#[from] BankClientError),
    #[error("persistence error: {0}")]
    Repo(#[from] crate::repo::decision_repo::RepoError),
}

pub struct DecisionOutcome {
    pub decision: Decision,
    pub plan: Option<Plan>,
}

pub struct Orchestrator {
    pub transaction_source: Arc<dyn TransactionSource>,
    pub decision_store: Arc<dyn DecisionStore>,
    pub plan_store: Arc<dyn PlanStore>,
    pub webhook_repo: Arc<dyn WebhookRepo>,
    pub webhook_sink: Arc<dyn WebhookSink>,
    pub risk_config: RiskConfig,
    pub ledger_webhook_url: String,
}

impl Orchestrator {
    pub async fn execute(
        &self,
        user_id: &str,
        amount_requested_cents: i64,
        request_id: Option<String>,
        user_events: Option<Vec<UserEvent>>,
    ) -> Result<DecisionOutcome, OrchestratorError> {
        if let Some(request_id) = &request_id {
            if let Some(existing) = self
                .decision_store
                .get_decision_by_request_id(request_id)
                .await?
            {
                let plan = if existing.approved {
                    self.find_plan_for_decision(existing.id).await?
                } else {
                    None
                };
                tracing::info!(request_id, user_id, "decision_replayed_from_idempotency_key");
                return Ok(DecisionOutcome {
                    decision: existing,
                    plan,
                });
            }
        }

        let started = Instant::now();

        let transactions = self.transaction_source.fetch_transactions(user_id).await?;

        let (decision, plan_schedule) = match FeatureExtractor::extract(&transactions) {
            Err(_empty) => {
                tracing::warn!(user_id, "empty_transaction_history");
                let decision = self
                    .decision_store
                    .save_decision(
                        user_id,
                        amount_requested_cents,
                        false,
                        0,
                        0,
                        0.0,
                        "$0",
                        serde_json::json!({ "reasons": ["empty_transactions"] }),
                        request_id.as_deref(),
                    )
                    .await?;
                DECISIONS_TOTAL.with_label_values(&["error"]).inc();
                CREDIT_LIMIT_BUCKET_TOTAL.with_label_values(&["$0"]).inc();
                (decision, None)
            }
            Ok(features) => {
                let last_day = transactions
                    .last()
                    .map(|t| t.date)
                    .unwrap_or_else(|| Utc::now().date_naive());
                let paycheck_info = detect_paycheck(&transactions);

                let analyzer = UtilizationAnalyzer::new(&self.risk_config.utilization);
                let utilization = analyzer.calculate(
                    &transactions,
                    last_day,
                    features.period_days,
                    paycheck_info,
                );

                let avg_daily_spend = if features.period_days > 0 {
                    features.avg_monthly_spend_cents / 30
                } else {
                    0
                };
                let payback = compute_payback_capacity(
                    features.avg_daily_balance_cents,
                    utilization.burn_days,
                    avg_daily_spend,
                    paycheck_info.map(|p| p.avg_paycheck_cents),
                );

                let cooldown = compute_cooldown(
                    user_events.as_deref(),
                    Some(&transactions),
                    Utc::now(),
                    self.risk_config.cooldown.cooldown_hours,
                );

                let engine = RiskEngine::new(&self.risk_config);
                let outcome = engine.evaluate(&features, &utilization, &payback, &cooldown);

                let amount_granted_cents = if outcome.approved {
                    amount_requested_cents.min(outcome.credit_limit_cents)
                } else {
                    0
                };

                let risk_factors = serde_json::to_value(&outcome.factors)
                    .unwrap_or(serde_json::Value::Null);

                let decision = self
                    .decision_store
                    .save_decision(
                        user_id,
                        amount_requested_cents,
                        outcome.approved,
                        outcome.credit_limit_cents,
                        amount_granted_cents,
                        outcome.score,
                        &outcome.tier.to_string(),
                        risk_factors,
                        request_id.as_deref(),
                    )
                    .await?;

                let plan_schedule = if outcome.approved {
                    Some(PlanBuilder::build(
                        amount_granted_cents,
                        decision.created_at,
                        risk::plan::DEFAULT_INSTALLMENTS_COUNT,
                        risk::plan::DEFAULT_DAYS_BETWEEN_INSTALLMENTS,
                    ))
                } else {
                    None
                };

                DECISIONS_TOTAL
                    .with_label_values(&[if outcome.approved { "approved" } else { "declined" }])
                    .inc();
                CREDIT_LIMIT_BUCKET_TOTAL
                    .with_label_values(&[&outcome.tier.to_string()])
                    .inc();

                (decision, plan_schedule)
            }
        };

        let plan = match plan_schedule {
            Some(schedule) => {
                let plan = self
                    .plan_store
                    .save_plan(decision.id, user_id, &schedule, decision.created_at)
                    .await?;

                let payload = WebhookPayload {
                    event: "BNPL_APPROVED",
                    plan_id: plan.id.to_string(),
                    decision_id: decision.id.to_string(),
                    user_id: user_id.to_string(),
                    amount_granted_cents: decision.amount_granted_cents,
                    request_id: request_id.clone(),
                };

                let webhook_record = self
                    .webhook_repo
                    .create_pending(
                        "BNPL_APPROVED",
                        serde_json::to_value(&payload).unwrap_or(serde_json::Value::Null),
                        &self.ledger_webhook_url,
                        plan.id,
                    )
                    .await?;

                let (success, _attempts) = self
                    .webhook_sink
                    .send_webhook(webhook_record.id, payload, self.webhook_repo.as_ref())
                    .await;
                if !success {
                    tracing::error!(plan_id = %plan.id, "webhook_failed_after_retries");
                }

                Some(plan)
            }
            None => None,
        };

        DECISION_DURATION_SECONDS
            .with_label_values(&[if decision.approved { "approved" } else { "declined" }])
            .observe(started.elapsed().as_secs_f64());

        Ok(DecisionOutcome { decision, plan })
    }

    async fn find_plan_for_decision(
        &self,
        decision_id: Uuid,
    ) -> Result<Option<Plan>, OrchestratorError> {
        Ok(self.plan_store.get_plan_by_decision_id(decision_id).await?)
    }
}

/// A minimal paycheck detector: treats recurring credits as paycheck
/// signal, with confidence growing with the number of observed credits.
/// There is no dedicated paycheck-detection module upstream of the risk
/// pipeline in this system, so the gateway derives it directly from the
/// same transaction window (see DESIGN.md).
fn detect_paycheck(transactions: &[Transaction]) -> Option<PaycheckInfo> {
    let credits: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Credit)
        .collect();

    if credits.is_empty() {
        return None;
    }

    let total: i64 = credits.iter().map(|t| t.amount_cents.abs()).sum();
    let avg_paycheck_cents = total / credits.len() as i64;

    let period_days = match (credits.first(), credits.last()) {
        (Some(first), Some(last)) if credits.len() > 1 => {
            ((last.date - first.date).num_days() / (credits.len() as i64 - 1)).max(1)
        }
        _ => 30,
    };

    let confidence = (credits.len() as f64 / 3.0).min(1.0);

    Some(PaycheckInfo {
        avg_paycheck_cents,
        period_days,
        confidence,
    })
}
