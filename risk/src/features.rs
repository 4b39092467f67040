//! Feature extraction from a user's raw transaction history.
//!
//! Grounded on `domain/services/basics_features.py` and
//! `domain/services/normalization.py`. The carry-forward day-balance
//! algorithm uses a FIRST-value-per-day policy: the balance recorded for a
//! calendar day is the first transaction-reported `balance_cents` seen for
//! that day, and days with no transactions inherit the last known balance.

use chrono::NaiveDate;
use shared::{Transaction, TransactionType};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("cannot extract features from an empty transaction list")]
    EmptyTransactions,
}

/// Derived, scale-free inputs to the Risk Engine's component scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub avg_daily_balance_cents: i64,
    pub avg_monthly_income_cents: i64,
    pub avg_monthly_spend_cents: i64,
    pub nsf_count: u32,
    pub period_days: i64,
}

pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Runs the full extraction pipeline: sort, carry-forward balances,
    /// income/spend monthly averages, and NSF counting.
    pub fn extract(transactions: &[Transaction]) -> Result<Features, FeatureError> {
        if transactions.is_empty() {
            return Err(FeatureError::EmptyTransactions);
        }

        let sorted = Self::normalize_and_sort(transactions);
        let day_balances = Self::fill_days_with_carry_forward(&sorted);
        let avg_daily_balance_cents = Self::calculate_avg_daily_balance(&day_balances);

        let period_days = match (sorted.first(), sorted.last()) {
            (Some(first), Some(last)) => (last.date - first.date).num_days().max(1),
            _ => 1,
        };

        let (avg_monthly_income_cents, avg_monthly_spend_cents) =
            Self::calculate_monthly_income_vs_spend(&sorted, period_days);
        let nsf_count = Self::calculate_nsf_count(&sorted);

        Ok(Features {
            avg_daily_balance_cents,
            avg_monthly_income_cents,
            avg_monthly_spend_cents,
            nsf_count,
            period_days,
        })
    }

    fn normalize_and_sort<'a>(transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        let mut sorted: Vec<&Transaction> = transactions.iter().collect();
        sorted.sort_by_key(|t| t.date);
        sorted
    }

    /// Builds a complete per-day balance series between the first and last
    /// transaction date, inclusive. A day's balance is the first
    /// transaction-reported balance seen on it; days without a reported
    /// balance inherit the previous day's value.
    fn fill_days_with_carry_forward(sorted: &[&Transaction]) -> Vec<(NaiveDate, i64)> {
        let mut day_first_balance: BTreeMap<NaiveDate, i64> = BTreeMap::new();
        for txn in sorted {
            if let Some(balance) = txn.balance_cents {
                day_first_balance.entry(txn.date).or_insert(balance);
            }
        }

        let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
            return Vec::new();
        };

        let mut filled = Vec::new();
        let mut last_known: i64 = day_first_balance
            .values()
            .next()
            .copied()
            .unwrap_or(0);

        let mut day = first.date;
        loop {
            if let Some(balance) = day_first_balance.get(&day) {
                last_known = *balance;
            }
            filled.push((day, last_known));
            if day >= last.date {
                break;
            }
            day = match day.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }
        filled
    }

    fn calculate_avg_daily_balance(day_balances: &[(NaiveDate, i64)]) -> i64 {
        if day_balances.is_empty() {
            return 0;
        }
        let sum: i64 = day_balances.iter().map(|(_, bal)| *bal).sum();
        sum / day_balances.len() as i64
    }

    /// Returns `(avg_monthly_income_cents, avg_monthly_spend_cents)`.
    /// `months` is `period_days / 30`, floored to a minimum of `1/30` of a
    /// month so a single-day history still produces a defined average.
    fn calculate_monthly_income_vs_spend(
        sorted: &[&Transaction],
        period_days: i64,
    ) -> (i64, i64) {
        let months = (period_days as f64 / 30.0).max(1.0 / 30.0);

        let total_income: i64 = sorted
            .iter()
            .filter(|t| t.kind == TransactionType::Credit)
            .map(|t| t.amount_cents.abs())
            .sum();
        let total_spend: i64 = sorted
            .iter()
            .filter(|t| t.kind == TransactionType::Debit)
            .map(|t| t.amount_cents.abs())
            .sum();

        (
            (total_income as f64 / months).round() as i64,
            (total_spend as f64 / months).round() as i64,
        )
    }

    /// Counts NSF events: either the transaction is explicitly flagged, or
    /// it is a debit that drove the reported balance negative. The two
    /// conditions are mutually exclusive per transaction to avoid
    /// double-counting a single event.
    fn calculate_nsf_count(sorted: &[&Transaction]) -> u32 {
        let mut count = 0u32;
        for txn in sorted {
            if txn.nsf {
                count += 1;
            } else if txn.kind == TransactionType::Debit
                && txn.balance_cents.map(|b| b < 0).unwrap_or(false)
            {
                count += 1;
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn empty_transactions_is_an_error() {
        let err = FeatureExtractor::extract(&[]).unwrap_err();
        assert_eq!(err, FeatureError::EmptyTransactions);
    }

    #[test]
    fn carry_forward_fills_gaps_with_last_known_balance() {
        let transactions = vec![
            txn("2026-01-01", -500, TransactionType::Debit, 1000),
            txn("2026-01-03", 2000, TransactionType::Credit, 3000),
        ];
        let sorted = FeatureExtractor::normalize_and_sort(&transactions);
        let filled = FeatureExtractor::fill_days_with_carry_forward(&sorted);
        assert_eq!(filled.len(), 3);
        assert_eq!(filled[0].1, 1000);
        assert_eq!(filled[1].1, 1000);
        assert_eq!(filled[2].1, 3000);
    }

    #[test]
    fn first_value_per_day_wins_when_multiple_transactions_share_a_day() {
        let transactions = vec![
            txn("2026-01-01", -500, TransactionType::Debit, 1000),
            txn("2026-01-01", -200, TransactionType::Debit, 800),
        ];
        let sorted = FeatureExtractor::normalize_and_sort(&transactions);
        let filled = FeatureExtractor::fill_days_with_carry_forward(&sorted);
        assert_eq!(filled[0].1, 1000);
    }

    #[test]
    fn nsf_counts_flagged_and_negative_balance_debits_without_double_counting() {
        let mut flagged = txn("2026-01-01", -100, TransactionType::Debit, -50);
        flagged.nsf = true;
        let negative_debit = txn("2026-01-02", -100, TransactionType::Debit, -50);
        let healthy_debit = txn("2026-01-03", -100, TransactionType::Debit, 900);

        let transactions = vec![flagged, negative_debit, healthy_debit];
        let sorted = FeatureExtractor::normalize_and_sort(&transactions);
        assert_eq!(FeatureExtractor::calculate_nsf_count(&sorted), 2);
    }

    #[test]
    fn extract_produces_defined_output_for_single_day_history() {
        let transactions = vec![txn("2026-01-01", 5000, TransactionType::Credit, 5000)];
        let features = FeatureExtractor::extract(&transactions).unwrap();
        assert_eq!(features.avg_daily_balance_cents, 5000);
        assert!(features.avg_monthly_income_cents > 0);
    }
}
