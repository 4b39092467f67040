//! End-to-end tests exercising the full risk pipeline composition, as the
//! orchestrator in the `api` crate would call it.

use chrono::{DateTime, Utc};
use risk::{
    compute_cooldown, compute_payback_capacity, CooldownResult, FeatureExtractor, PaycheckInfo,
    PlanBuilder, RiskConfig, RiskEngine, RiskTier, UtilizationAnalyzer,
};
use shared::{Transaction, TransactionType};

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
        txn("2026-06-05", -15_000, TransactionType::Debit, 245_000),
        txn("2026-06-12", -20_000, TransactionType::Debit, 225_000),
        txn("2026-06-20", -10_000, TransactionType::Debit, 215_000),
        txn("2026-06-29", 250_000, TransactionType::Credit, 465_000),
    ]
}

#[test]
fn healthy_history_produces_an_approved_tiered_outcome() {
    let config = RiskConfig::from_env().unwrap();
    let transactions = healthy_history();

    let features = FeatureExtractor::extract(&transactions).unwrap();
    let last_day = transactions.last().unwrap().date;

    let analyzer = UtilizationAnalyzer::new(&config.utilization);
    let utilization = analyzer.calculate(
        &transactions,
        last_day,
        features.period_days,
        Some(PaycheckInfo {
            avg_paycheck_cents: 250_000,
            period_days: 28,
            confidence: 0.9,
        }),
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
        Some(250_000),
    );

    let now: DateTime<Utc> = "2026-06-30T00:00:00Z".parse().unwrap();
    let cooldown = compute_cooldown(None, Some(&transactions), now, config.cooldown.cooldown_hours);

    let engine = RiskEngine::new(&config);
    let outcome = engine.evaluate(&features, &utilization, &payback, &cooldown);

    assert!(outcome.approved);
    assert!(matches!(outcome.tier, RiskTier::A | RiskTier::B | RiskTier::C));
    assert!(outcome.credit_limit_cents > 0);

    if outcome.approved {
        let schedule = PlanBuilder::build(
            outcome.credit_limit_cents.min(outcome.credit_limit_cents),
            now,
            risk::plan::DEFAULT_INSTALLMENTS_COUNT,
            risk::plan::DEFAULT_DAYS_BETWEEN_INSTALLMENTS,
        );
        let sum: i64 = schedule.installments.iter().map(|i| i.amount_cents).sum();
        assert_eq!(sum, outcome.credit_limit_cents);
    }
}

#[test]
fn active_cooldown_overrides_an_otherwise_healthy_score() {
    let config = RiskConfig::from_env().unwrap();
    let transactions = healthy_history();
    let features = FeatureExtractor::extract(&transactions).unwrap();

    let analyzer = UtilizationAnalyzer::new(&config.utilization);
    let last_day = transactions.last().unwrap().date;
    let utilization = analyzer.calculate(
        &transactions,
        last_day,
        features.period_days,
        None,
    );
    let payback = compute_payback_capacity(features.avg_daily_balance_cents, None, 0, None);

    let cooldown = CooldownResult {
        is_in_cooldown: true,
        remaining_hours: 5.0,
        last_advance_at: None,
        explanation: "test".to_string(),
    };

    let engine = RiskEngine::new(&config);
    let outcome = engine.evaluate(&features, &utilization, &payback, &cooldown);

    assert!(!outcome.approved);
    assert_eq!(outcome.tier, RiskTier::Deny);
    assert_eq!(outcome.credit_limit_cents, 0);
}

#[test]
fn empty_transaction_history_is_rejected_before_scoring() {
    let err = FeatureExtractor::extract(&[]).unwrap_err();
    assert_eq!(err, risk::FeatureError::EmptyTransactions);
}
