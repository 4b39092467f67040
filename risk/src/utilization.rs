//! Utilization Analyzer: scores how a user's recent spending compares to
//! their paycheck, using three Gaussian-shaped component scores composited
//! into a single 0-100 value.
//!
//! Grounded on `domain/services/utilizations.py`. The utilization and
//! burn-days components use an asymmetric Gaussian (different spread to the
//! left and right of the peak) because overspending and underspending are
//! not equally risky; the daily-spend component uses a single symmetric
//! Gaussian.

use crate::config::{UtilizationConfig, BURN_SIGMA_LEFT, BURN_SIGMA_RIGHT, UTIL_SIGMA_LEFT, UTIL_SIGMA_RIGHT};
use chrono::NaiveDate;
use shared::{Transaction, TransactionType};

/// Minimum confidence in the detected paycheck cadence required to run
/// utilization scoring at all (spec §4.2 "low-confidence paycheck").
pub const MIN_PAYCHECK_CONFIDENCE: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaycheckInfo {
    pub avg_paycheck_cents: i64,
    pub period_days: i64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationResult {
    pub utilization_ratio: f64,
    pub burn_days: Option<f64>,
    pub daily_spend_ratio: f64,
    pub composite_score: f64,
    pub label: &'static str,
}

impl UtilizationResult {
    fn empty() -> Self {
        Self {
            utilization_ratio: 0.0,
            burn_days: None,
            daily_spend_ratio: 0.0,
            composite_score: 0.0,
            label: "unscored",
        }
    }
}

pub struct UtilizationAnalyzer<'a> {
    config: &'a UtilizationConfig,
}

impl<'a> UtilizationAnalyzer<'a> {
    pub fn new(config: &'a UtilizationConfig) -> Self {
        Self { config }
    }

    /// Computes the composite utilization score. Returns an unscored,
    /// zeroed result when there is no paycheck detected or the detector's
    /// confidence is too low to trust.
    pub fn calculate(
        &self,
        transactions: &[Transaction],
        last_day: NaiveDate,
        period_days: i64,
        paycheck_info: Option<PaycheckInfo>,
    ) -> UtilizationResult {
        let paycheck = match paycheck_info {
            Some(p) if p.confidence >= MIN_PAYCHECK_CONFIDENCE => p,
            _ => return UtilizationResult::empty(),
        };

        let cycle_start = last_day - chrono::Duration::days(period_days);
        let total_debits: i64 = transactions
            .iter()
            .filter(|t| t.kind == TransactionType::Debit && t.date > cycle_start && t.date <= last_day)
            .map(|t| t.amount_cents.abs())
            .sum();

        let utilization_ratio = if paycheck.avg_paycheck_cents > 0 {
            total_debits as f64 / paycheck.avg_paycheck_cents as f64
        } else {
            0.0
        };

        let avg_daily_spend = if period_days > 0 {
            total_debits as f64 / period_days as f64
        } else {
            0.0
        };

        let burn_days = if avg_daily_spend > 0.0 {
            Some(paycheck.avg_paycheck_cents as f64 / avg_daily_spend)
        } else {
            None
        };

        let daily_spend_ratio = if paycheck.avg_paycheck_cents > 0 {
            avg_daily_spend / paycheck.avg_paycheck_cents as f64
        } else {
            0.0
        };

        let util_score = Self::asymmetric_gaussian_score(
            utilization_ratio,
            self.config.util_mu,
            UTIL_SIGMA_LEFT,
            UTIL_SIGMA_RIGHT,
        );
        let burn_score = match burn_days {
            Some(days) => Self::asymmetric_gaussian_score(
                days,
                self.config.burn_mu,
                BURN_SIGMA_LEFT,
                BURN_SIGMA_RIGHT,
            ),
            None => 0.0,
        };
        let spend_score = Self::gaussian_score(
            daily_spend_ratio,
            self.config.spend_mu,
            self.config.spend_sigma,
        );

        let composite_score = Self::composite(
            self.config.util_weight,
            util_score,
            self.config.burn_weight,
            burn_score,
            self.config.spend_weight,
            spend_score,
        );

        UtilizationResult {
            utilization_ratio,
            burn_days,
            daily_spend_ratio,
            composite_score,
            label: self.score_to_label(composite_score),
        }
    }

    fn gaussian_score(value: f64, mu: f64, sigma: f64) -> f64 {
        if sigma <= 0.0 {
            return 0.0;
        }
        (-((value - mu).powi(2)) / (2.0 * sigma * sigma)).exp() * 100.0
    }

    fn asymmetric_gaussian_score(value: f64, mu: f64, sigma_left: f64, sigma_right: f64) -> f64 {
        let sigma = if value <= mu { sigma_left } else { sigma_right };
        Self::gaussian_score(value, mu, sigma)
    }

    fn composite(
        w_util: f64,
        s_util: f64,
        w_burn: f64,
        s_burn: f64,
        w_spend: f64,
        s_spend: f64,
    ) -> f64 {
        let raw = w_util * s_util + w_burn * s_burn + w_spend * s_spend;
        (raw * 10.0).round() / 10.0
    }

    fn score_to_label(&self, score: f64) -> &'static str {
        for (threshold, label) in self.config.label_thresholds() {
            if score >= threshold {
                return label;
            }
        }
        "critical-risk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paycheck(avg_cents: i64, period_days: i64, confidence: f64) -> PaycheckInfo {
        PaycheckInfo {
            avg_paycheck_cents: avg_cents,
            period_days,
            confidence,
        }
    }

    #[test]
    fn gaussian_peak_is_one_hundred_at_mu() {
        let score = UtilizationAnalyzer::gaussian_score(0.6, 0.6, UTIL_SIGMA_LEFT);
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn asymmetric_gaussian_uses_left_sigma_below_mu_and_right_above() {
        let below = UtilizationAnalyzer::asymmetric_gaussian_score(0.1, 0.6, 0.5, 0.25);
        let above = UtilizationAnalyzer::asymmetric_gaussian_score(1.1, 0.6, 0.5, 0.25);
        let below_symmetric = UtilizationAnalyzer::gaussian_score(0.1, 0.6, 0.5);
        let above_symmetric = UtilizationAnalyzer::gaussian_score(1.1, 0.6, 0.25);
        assert!((below - below_symmetric).abs() < 1e-9);
        assert!((above - above_symmetric).abs() < 1e-9);
    }

    #[test]
    fn low_confidence_paycheck_yields_empty_result() {
        let config = UtilizationConfig::default();
        let analyzer = UtilizationAnalyzer::new(&config);
        let result = analyzer.calculate(
            &[],
            "2026-01-31".parse().unwrap(),
            30,
            Some(paycheck(200_000, 14, 0.1)),
        );
        assert_eq!(result.label, "unscored");
        assert_eq!(result.composite_score, 0.0);
    }

    #[test]
    fn missing_paycheck_yields_empty_result() {
        let config = UtilizationConfig::default();
        let analyzer = UtilizationAnalyzer::new(&config);
        let result = analyzer.calculate(&[], "2026-01-31".parse().unwrap(), 30, None);
        assert_eq!(result.label, "unscored");
    }

    #[test]
    fn zero_spend_yields_no_burn_days() {
        let config = UtilizationConfig::default();
        let analyzer = UtilizationAnalyzer::new(&config);
        let result = analyzer.calculate(
            &[],
            "2026-01-31".parse().unwrap(),
            30,
            Some(paycheck(200_000, 14, 0.9)),
        );
        assert_eq!(result.burn_days, None);
    }
}
