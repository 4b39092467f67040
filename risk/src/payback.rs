//! Payback Capacity: projects how much of the available balance survives
//! the user's typical burn rate, as a sanity check independent of the
//! Gaussian utilization score.
//!
//! Grounded on `domain/services/payback_capacity.py`.

/// Burn-days fallback when the Feature Extractor could not derive one
/// (zero or negative average daily spend).
const DEFAULT_EFFECTIVE_BURN_DAYS: f64 = 30.0;

/// Fallback payback threshold when no paycheck amount is known.
const DEFAULT_THRESHOLD_CENTS: i64 = 5_000;

/// Fraction of the average paycheck used as the payback threshold when a
/// paycheck amount is known.
const THRESHOLD_PAYCHECK_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaybackLabel {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for PaybackLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaybackLabel::Positive => write!(f, "positive"),
            PaybackLabel::Neutral => write!(f, "neutral"),
            PaybackLabel::Negative => write!(f, "negative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaybackOutcome {
    pub payback_capacity_cents: i64,
    pub label: PaybackLabel,
    pub explanation: String,
}

/// Projects remaining balance after `effective_burn_days` of spending at
/// `avg_daily_spend_cents`, and compares it against a threshold derived
/// from the user's paycheck (or a flat fallback when no paycheck is known).
pub fn compute_payback_capacity(
    avg_daily_balance_cents: i64,
    burn_days: Option<f64>,
    avg_daily_spend_cents: i64,
    avg_paycheck_cents: Option<i64>,
) -> PaybackOutcome {
    let effective_burn_days = match burn_days {
        Some(days) if days > 0.0 => days,
        _ => DEFAULT_EFFECTIVE_BURN_DAYS,
    };

    let projected_spending = (effective_burn_days * avg_daily_spend_cents as f64) as i64;
    let payback_capacity_cents = avg_daily_balance_cents - projected_spending;

    let threshold = match avg_paycheck_cents {
        Some(paycheck) if paycheck > 0 => {
            (paycheck as f64 * THRESHOLD_PAYCHECK_FRACTION) as i64
        }
        _ => DEFAULT_THRESHOLD_CENTS,
    };

    let (label, explanation) = if payback_capacity_cents > 0 {
        (
            PaybackLabel::Positive,
            format!(
                "projected balance of {payback_capacity_cents} cents after {effective_burn_days:.1} days stays positive"
            ),
        )
    } else if payback_capacity_cents >= -threshold {
        (
            PaybackLabel::Neutral,
            format!(
                "projected balance of {payback_capacity_cents} cents after {effective_burn_days:.1} days falls within the {threshold} cent threshold of zero"
            ),
        )
    } else {
        (
            PaybackLabel::Negative,
            format!(
                "projected balance of {payback_capacity_cents} cents after {effective_burn_days:.1} days exceeds the {threshold} cent threshold below zero"
            ),
        )
    };

    PaybackOutcome {
        payback_capacity_cents,
        label,
        explanation,
    }
}
