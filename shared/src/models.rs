use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single bank transaction, read-only and sourced externally via the bank client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub amount_cents: i64,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub balance_cents: Option<i64>,
    #[serde(default)]
    pub nsf: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub merchant: String,
}

/// Whether a transaction moved money out of the account (debit) or in (credit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Debit => write!(f, "debit"),
            TransactionType::Credit => write!(f, "credit"),
        }
    }
}

/// An immutable decision record: the outcome of running the risk pipeline
/// once for a given `(request_id, user_id)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Decision {
    pub id: Uuid,
    pub user_id: String,
    pub amount_requested_cents: i64,
    pub approved: bool,
    pub credit_limit_cents: i64,
    pub amount_granted_cents: i64,
    pub score: f64,
    pub score_band: String,
    pub risk_factors: serde_json::Value,
    pub request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A four-installment repayment plan, created iff its decision is approved.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Plan {
    pub id: Uuid,
    pub decision_id: Uuid,
    pub user_id: String,
    pub total_cents: i64,
    pub installments_count: i32,
    pub days_between_installments: i32,
    pub created_at: DateTime<Utc>,
}

/// A single scheduled repayment within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Installment {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub due_date: DateTime<Utc>,
    pub amount_cents: i64,
    pub status: InstallmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "installment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

impl std::fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallmentStatus::Pending => write!(f, "pending"),
            InstallmentStatus::Paid => write!(f, "paid"),
            InstallmentStatus::Overdue => write!(f, "overdue"),
        }
    }
}

/// An at-least-once notification to the downstream ledger service. Weakly
/// references a Plan (lookup relation, not ownership).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OutboundWebhook {
    pub id: Uuid,
    pub event_type: String,
    pub payload: serde_json::Value,
    pub target_url: String,
    pub status: WebhookStatus,
    pub attempts: i32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub plan_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "webhook_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Pending,
    Success,
    Failed,
}

impl std::fmt::Display for WebhookStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebhookStatus::Pending => write!(f, "pending"),
            WebhookStatus::Success => write!(f, "success"),
            WebhookStatus::Failed => write!(f, "failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_type_round_trips_through_serde() {
        let json = serde_json::to_string(&TransactionType::Debit).unwrap();
        assert_eq!(json, "\"debit\"");
        let back: TransactionType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TransactionType::Debit);
    }

    #[test]
    fn installment_status_display_matches_schema_values() {
        assert_eq!(InstallmentStatus::Pending.to_string(), "pending");
        assert_eq!(InstallmentStatus::Paid.to_string(), "paid");
        assert_eq!(InstallmentStatus::Overdue.to_string(), "overdue");
    }
}
