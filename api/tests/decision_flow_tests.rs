//! End-to-end orchestrator scenarios using fake in-process implementations
//! of the capability traits, grounded on `api/tests/regression_tests.rs`'s
//! test style and in place of a database for fast, deterministic tests.

use api::bank_client::{BankClientError, TransactionSource};
use api::orchestrator::{Orchestrator, OrchestratorError};
use api::repo::decision_repo::RepoError;
use api::repo::{DecisionStore, PlanStore};
use api::webhook::{WebhookPayload, WebhookSink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use risk::PlanSchedule;
use shared::{Decision, Installment, Plan, Transaction, TransactionType};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

struct FakeTransactionSource {
    transactions: Vec<Transaction>,
    fail: bool,
}

#[async_trait]
impl TransactionSource for FakeTransactionSource {
    async fn fetch_transactions(&self, _user_id: &str) -> Result<Vec<Transaction>, BankClientError> {
        if self.fail {
            Err(BankClientError::RequestFailed("bank is down".to_string()))
        } else {
            Ok(self.transactions.clone())
        }
    }
}

#[derive(Default)]
struct FakeDecisionStore {
    by_request_id: Mutex<std::collections::HashMap<String, Decision>>,
}

#[async_trait]
impl DecisionStore for FakeDecisionStore {
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
        let decision = Decision {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            amount_requested_cents,
            approved,
            credit_limit_cents,
            amount_granted_cents,
            score,
            score_band: score_band.to_string(),
            risk_factors,
            request_id: request_id.map(str::to_string),
            created_at: Utc::now(),
        };
        if let Some(request_id) = request_id {
            self.by_request_id
                .lock()
                .unwrap()
                .insert(request_id.to_string(), decision.clone());
        }
        Ok(decision)
    }

    async fn get_decision_by_request_id(
        &self,
        request_id: &str,
    ) -> Result<Option<Decision>, RepoError> {
        Ok(self.by_request_id.lock().unwrap().get(request_id).cloned())
    }

    async fn get_decision_history(&self, _user_id: &str) -> Result<Vec<Decision>, RepoError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct FakePlanStore;

#[async_trait]
impl PlanStore for FakePlanStore {
    async fn save_plan(
        &self,
        decision_id: Uuid,
        user_id: &str,
        schedule: &PlanSchedule,
        created_at: DateTime<Utc>,
    ) -> Result<Plan, RepoError> {
        Ok(Plan {
            id: Uuid::new_v4(),
            decision_id,
            user_id: user_id.to_string(),
            total_cents: schedule.total_cents,
            installments_count: schedule.installments_count,
            days_between_installments: schedule.days_between_installments,
            created_at,
        })
    }

    async fn get_plan_by_id(
        &self,
        _plan_id: Uuid,
    ) -> Result<Option<(Plan, Vec<Installment>)>, RepoError> {
        Ok(None)
    }

    async fn get_plan_by_decision_id(&self, _decision_id: Uuid) -> Result<Option<Plan>, RepoError> {
        Ok(None)
    }
}

#[derive(Default)]
struct FakeWebhookRepo;

#[async_trait]
impl api::repo::WebhookRepo for FakeWebhookRepo {
    async fn create_pending(
        &self,
        event_type: &str,
        payload: serde_json::Value,
        target_url: &str,
        plan_id: Uuid,
    ) -> Result<shared::OutboundWebhook, RepoError> {
        Ok(shared::OutboundWebhook {
            id: Uuid::new_v4(),
            event_type: event_type.to_string(),
            payload,
            target_url: target_url.to_string(),
            status: shared::WebhookStatus::Pending,
            attempts: 0,
            last_attempt_at: None,
            created_at: Utc::now(),
            plan_id: Some(plan_id),
        })
    }

    async fn record_attempt(&self, _id: Uuid, _success: bool) -> Result<(), RepoError> {
        Ok(())
    }
}

struct FakeWebhookSink {
    succeed: bool,
    calls: Arc<Mutex<Vec<WebhookPayload>>>,
}

#[async_trait]
impl WebhookSink for FakeWebhookSink {
    async fn send_webhook(
        &self,
        _webhook_id: Uuid,
        payload: WebhookPayload,
        _repo: &(dyn api::repo::WebhookRepo + Send + Sync),
    ) -> (bool, u32) {
        self.calls.lock().unwrap().push(payload);
        (self.succeed, if self.succeed { 1 } else { 6 })
    }
}

fn txn(date: &str, amount_cents: i64, kind: TransactionType, balance_cents: i64) -> Transaction {
    Transaction {
        transaction_id: format!("t-{date}-{amount_cents}"),
        date: date.parse().unwrap(),
        amount_cents,
        kind,
        balance_cents: Some(balance_cents),
        nsf: false,
        description: String::new(),
        category: String::new(),
        merchant: String::new(),
    }
}

fn healthy_history() -> Vec<Transaction> {
    vec![
        txn("2026-06-01", 250_000, TransactionType::Credit, 260_000),
        txn("2026-06-08", 250_000, TransactionType::Credit, 480_000),
        txn("2026-06-15", 250_000, TransactionType::Credit, 690_000),
        txn("2026-06-20", -10_000, TransactionType::Debit, 680_000),
        txn("2026-06-29", 250_000, TransactionType::Credit, 905_000),
    ]
}

fn build_orchestrator(
    transaction_source: FakeTransactionSource,
    webhook_succeeds: bool,
) -> (Arc<Orchestrator>, Arc<Mutex<Vec<WebhookPayload>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let orchestrator = Arc::new(Orchestrator {
        transaction_source: Arc::new(transaction_source),
        decision_store: Arc::new(FakeDecisionStore::default()),
        plan_store: Arc::new(FakePlanStore),
        webhook_repo: Arc::new(FakeWebhookRepo),
        webhook_sink: Arc::new(FakeWebhookSink {
            succeed: webhook_succeeds,
            calls: calls.clone(),
        }),
        risk_config: risk::RiskConfig::from_env().unwrap(),
        ledger_webhook_url: "http://localhost:9999".to_string(),
    });
    (orchestrator, calls)
}

#[tokio::test]
async fn healthy_history_is_approved_and_dispatches_a_webhook() {
    let (orchestrator, calls) =
        build_orchestrator(FakeTransactionSource { transactions: healthy_history(), fail: false }, true);

    let outcome = orchestrator
        .execute("user-1", 15_000, Some("req-1".to_string()), None)
        .await
        .unwrap();

    assert!(outcome.decision.approved);
    assert!(outcome.plan.is_some());
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn empty_transaction_history_is_denied_without_persisting_a_plan() {
    let (orchestrator, calls) =
        build_orchestrator(FakeTransactionSource { transactions: Vec::new(), fail: false }, true);

    let outcome = orchestrator
        .execute("user-2", 10_000, None, None)
        .await
        .unwrap();

    assert!(!outcome.decision.approved);
    assert!(outcome.plan.is_none());
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn bank_api_failure_surfaces_as_an_orchestrator_error() {
    let (orchestrator, _calls) =
        build_orchestrator(FakeTransactionSource { transactions: Vec::new(), fail: true }, true);

    let err = orchestrator
        .execute("user-3", 10_000, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, OrchestratorError::BankApi(_)));
}

#[tokio::test]
async fn replaying_the_same_request_id_returns_the_original_decision_without_refetching() {
    let (orchestrator, calls) =
        build_orchestrator(FakeTransactionSource { transactions: healthy_history(), fail: false }, true);

    let first = orchestrator
        .execute("user-4", 15_000, Some("req-replay".to_string()), None)
        .await
        .unwrap();
    let second = orchestrator
        .execute("user-4", 15_000, Some("req-replay".to_string()), None)
        .await
        .unwrap();

    assert_eq!(first.decision.id, second.decision.id);
    // Only the first call should have dispatched a webhook.
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_failure_does_not_roll_back_the_already_persisted_decision() {
    let (orchestrator, calls) =
        build_orchestrator(FakeTransactionSource { transactions: healthy_history(), fail: false }, false);

    let outcome = orchestrator
        .execute("user-5", 15_000, None, None)
        .await
        .unwrap();

    assert!(outcome.decision.approved);
    assert!(outcome.plan.is_some());
    assert_eq!(calls.lock().unwrap().len(), 1);
}
