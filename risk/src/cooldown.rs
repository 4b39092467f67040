//! Cooldown Check: blocks a new advance while a prior cash-advance-like
//! event is still within its cooldown window.
//!
//! Grounded on `domain/services/cooldown.py`. User events (when supplied)
//! take priority over scanning raw transactions, since they carry an
//! explicit `event_type` rather than relying on description sniffing.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shared::{Transaction, TransactionType};

const ADVANCE_EVENT_TYPES: &[&str] = &["advance_taken", "cash_advance", "disbursement"];
const ADVANCE_DESCRIPTION_MARKERS: &[&str] = &["advance", "gerald", "disbursement"];

/// An account event reported by an upstream system, distinct from a bank
/// transaction. Accepts either `timestamp` or `created_at` as the time key,
/// mirroring the two shapes the original event feed used interchangeably.
#[derive(Debug, Clone, Deserialize)]
pub struct UserEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(alias = "created_at")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CooldownResult {
    pub is_in_cooldown: bool,
    pub remaining_hours: f64,
    pub last_advance_at: Option<DateTime<Utc>>,
    pub explanation: String,
}

impl CooldownResult {
    fn clear() -> Self {
        Self {
            is_in_cooldown: false,
            remaining_hours: 0.0,
            last_advance_at: None,
            explanation: "no prior advance-like event found".to_string(),
        }
    }
}

/// Determines whether `user_id` is still inside the cooldown window from
/// their most recent cash-advance-like event. `user_events` is checked
/// first; `transactions` is only scanned when no events were supplied.
pub fn compute_cooldown(
    user_events: Option<&[UserEvent]>,
    transactions: Option<&[Transaction]>,
    now: DateTime<Utc>,
    cooldown_hours: i64,
) -> CooldownResult {
    let last_advance_at = match user_events {
        Some(events) if !events.is_empty() => last_advance_from_events(events),
        _ => transactions
            .map(last_advance_from_transactions)
            .unwrap_or(None),
    };

    let Some(last_advance_at) = last_advance_at else {
        return CooldownResult::clear();
    };

    let elapsed_hours = (now - last_advance_at).num_seconds() as f64 / 3600.0;
    let remaining_hours = (cooldown_hours as f64 - elapsed_hours).max(0.0);
    let is_in_cooldown = remaining_hours > 0.0;

    let explanation = if is_in_cooldown {
        format!(
            "last advance at {last_advance_at} is within the {cooldown_hours}h cooldown window, {remaining_hours:.1}h remaining"
        )
    } else {
        format!("last advance at {last_advance_at} is outside the {cooldown_hours}h cooldown window")
    };

    CooldownResult {
        is_in_cooldown,
        remaining_hours,
        last_advance_at: Some(last_advance_at),
        explanation,
    }
}

fn last_advance_from_events(events: &[UserEvent]) -> Option<DateTime<Utc>> {
    events
        .iter()
        .filter(|e| ADVANCE_EVENT_TYPES.contains(&e.event_type.as_str()))
        .map(|e| e.timestamp)
        .max()
}

fn last_advance_from_transactions(transactions: &[Transaction]) -> Option<DateTime<Utc>> {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Credit && is_advance_like(t))
        .map(|t| t.date.and_hms_opt(0, 0, 0).unwrap().and_utc())
        .max()
}

fn is_advance_like(txn: &Transaction) -> bool {
    if txn.category.eq_ignore_ascii_case("cash_advance") {
        return true;
    }
    let description = txn.description.to_lowercase();
    ADVANCE_DESCRIPTION_MARKERS
        .iter()
        .any(|marker| description.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(kind: &str, timestamp: DateTime<Utc>) -> UserEvent {
        UserEvent {
            event_type: kind.to_string(),
            timestamp,
        }
    }

    #[test]
    fn no_events_or_transactions_clears_cooldown() {
        let now = "2026-07-28T00:00:00Z".parse().unwrap();
        let result = compute_cooldown(None, None, now, 72);
        assert!(!result.is_in_cooldown);
    }

    #[test]
    fn recent_advance_event_triggers_cooldown() {
        let now: DateTime<Utc> = "2026-07-28T00:00:00Z".parse().unwrap();
        let events = vec![event("advance_taken", now - Duration::hours(10))];
        let result = compute_cooldown(Some(&events), None, now, 72);
        assert!(result.is_in_cooldown);
        assert!((result.remaining_hours - 62.0).abs() < 0.01);
    }

    #[test]
    fn expired_advance_event_clears_cooldown() {
        let now: DateTime<Utc> = "2026-07-28T00:00:00Z".parse().unwrap();
        let events = vec![event("advance_taken", now - Duration::hours(100))];
        let result = compute_cooldown(Some(&events), None, now, 72);
        assert!(!result.is_in_cooldown);
    }

    #[test]
    fn irrelevant_event_types_are_ignored() {
        let now: DateTime<Utc> = "2026-07-28T00:00:00Z".parse().unwrap();
        let events = vec![event("login", now - Duration::hours(1))];
        let result = compute_cooldown(Some(&events), None, now, 72);
        assert!(!result.is_in_cooldown);
    }

    #[test]
    fn transactions_are_only_scanned_when_no_events_supplied() {
        let now: DateTime<Utc> = "2026-07-28T00:00:00Z".parse().unwrap();
        let transactions = vec![Transaction {
            transaction_id: "t1".to_string(),
            date: (now - Duration::hours(5)).date_naive(),
            amount_cents: 5000,
            kind: TransactionType::Credit,
            balance_cents: Some(5000),
            nsf: false,
            description: "Gerald cash advance".to_string(),
            category: String::new(),
            merchant: String::new(),
        }];
        let result = compute_cooldown(Some(&[]), Some(&transactions), now, 72);
        assert!(result.is_in_cooldown);
    }
}
