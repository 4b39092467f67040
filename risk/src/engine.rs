//! Risk Engine: composes the Feature Extractor, Utilization Analyzer,
//! Payback Capacity, and Cooldown Check into a single approve/deny decision
//! with a numeric score, a tier, and a structured list of reasons.
//!
//! Grounded on `domain/services/risk_calculation.py`'s composition shape and
//! `application/service/decision.py`'s `reasons` construction, but the
//! bucket/tier scheme follows the named tiers (A/B/C/D/Deny), not the
//! legacy `"$0"`/`"$100 - $400"` string buckets.

use crate::config::RiskConfig;
use crate::cooldown::CooldownResult;
use crate::features::Features;
use crate::payback::{PaybackLabel, PaybackOutcome};
use crate::utilization::UtilizationResult;
use serde::{Deserialize, Serialize};

/// A single, machine-checkable reason contributing to a decision, used for
/// explainability instead of free-form text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskReason {
    NegativeAverageBalance { avg_daily_balance_cents: i64 },
    SpendExceedsIncome { spend_cents: i64, income_cents: i64 },
    NsfEventsDetected { count: u32 },
    UtilizationElevated { label: String, score: f64 },
    PaybackCapacityNegative { payback_capacity_cents: i64 },
    CooldownActive { remaining_hours: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTier {
    A,
    B,
    C,
    D,
    Deny,
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskTier::A => write!(f, "A"),
            RiskTier::B => write!(f, "B"),
            RiskTier::C => write!(f, "C"),
            RiskTier::D => write!(f, "D"),
            RiskTier::Deny => write!(f, "deny"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactors {
    pub balance_score: f64,
    pub income_spend_score: f64,
    pub nsf_score: f64,
    pub utilization_score: f64,
    pub payback_label: String,
    pub reasons: Vec<RiskReason>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskOutcome {
    pub approved: bool,
    pub tier: RiskTier,
    pub score: f64,
    pub credit_limit_cents: i64,
    pub factors: RiskFactors,
}

pub struct RiskEngine<'a> {
    config: &'a RiskConfig,
}

impl<'a> RiskEngine<'a> {
    pub fn new(config: &'a RiskConfig) -> Self {
        Self { config }
    }

    /// Runs the full scoring composition. `cooldown` is checked first and,
    /// when active, short-circuits straight to a `Deny` outcome: an
    /// in-cooldown user should never see a tier or credit limit.
    pub fn evaluate(
        &self,
        features: &Features,
        utilization: &UtilizationResult,
        payback: &PaybackOutcome,
        cooldown: &CooldownResult,
    ) -> RiskOutcome {
        let mut reasons = Vec::new();

        if cooldown.is_in_cooldown {
            reasons.push(RiskReason::CooldownActive {
                remaining_hours: cooldown.remaining_hours,
            });
            return RiskOutcome {
                approved: false,
                tier: RiskTier::Deny,
                score: 0.0,
                credit_limit_cents: 0,
                factors: RiskFactors {
                    balance_score: 0.0,
                    income_spend_score: 0.0,
                    nsf_score: 0.0,
                    utilization_score: utilization.composite_score,
                    payback_label: payback.label.to_string(),
                    reasons,
                },
            };
        }

        let weights = &self.config.weights;

        let balance_score = Self::balance_score(
            features.avg_daily_balance_cents,
            weights.balance_neg_cap_cents,
        );
        if features.avg_daily_balance_cents < 0 {
            reasons.push(RiskReason::NegativeAverageBalance {
                avg_daily_balance_cents: features.avg_daily_balance_cents,
            });
        }

        let income_spend_score = Self::income_spend_score(
            features.avg_monthly_income_cents,
            features.avg_monthly_spend_cents,
        );
        if features.avg_monthly_spend_cents > features.avg_monthly_income_cents {
            reasons.push(RiskReason::SpendExceedsIncome {
                spend_cents: features.avg_monthly_spend_cents,
                income_cents: features.avg_monthly_income_cents,
            });
        }

        let nsf_score = Self::nsf_score(features.nsf_count, weights.nsf_penalty);
        if features.nsf_count > 0 {
            reasons.push(RiskReason::NsfEventsDetected {
                count: features.nsf_count,
            });
        }

        let base_score = weights.balance_weight * balance_score
            + weights.income_spend_weight * income_spend_score
            + weights.nsf_weight * nsf_score;

        let mut penalty = 0.0;
        match utilization.label {
            "high-risk" | "very-high-risk" | "critical-risk" => {
                penalty += weights.util_penalty_high_risk;
                reasons.push(RiskReason::UtilizationElevated {
                    label: utilization.label.to_string(),
                    score: utilization.composite_score,
                });
            }
            "medium-risk" => {
                penalty += weights.util_penalty_medium_risk;
            }
            _ => {}
        }

        if payback.label == PaybackLabel::Negative {
            penalty += weights.payback_penalty;
            reasons.push(RiskReason::PaybackCapacityNegative {
                payback_capacity_cents: payback.payback_capacity_cents,
            });
        }

        let score = (base_score - penalty).clamp(0.0, 100.0);
        let (tier, credit_limit_cents) = self.select_tier(score, utilization.label, payback.label);
        let approved = !matches!(tier, RiskTier::Deny);

        RiskOutcome {
            approved,
            tier,
            score,
            credit_limit_cents,
            factors: RiskFactors {
                balance_score,
                income_spend_score,
                nsf_score,
                utilization_score: utilization.composite_score,
                payback_label: payback.label.to_string(),
                reasons,
            },
        }
    }

    fn balance_score(avg_daily_balance_cents: i64, neg_cap_cents: i64) -> f64 {
        if avg_daily_balance_cents >= 0 || neg_cap_cents <= 0 {
            return 100.0;
        }
        let ratio = avg_daily_balance_cents.unsigned_abs() as f64 / neg_cap_cents as f64;
        (100.0 * (1.0 - ratio)).clamp(0.0, 100.0)
    }

    fn income_spend_score(income_cents: i64, spend_cents: i64) -> f64 {
        if spend_cents <= 0 || income_cents >= spend_cents {
            return 100.0;
        }
        (100.0 * income_cents as f64 / spend_cents as f64).clamp(0.0, 100.0)
    }

    fn nsf_score(nsf_count: u32, nsf_penalty: f64) -> f64 {
        (100.0 - nsf_count as f64 * nsf_penalty).clamp(0.0, 100.0)
    }

    /// Tier A and B require more than just a score threshold: A additionally
    /// requires a healthy-or-medium utilization label and a non-negative
    /// payback label, and B requires a non-negative payback label. A
    /// qualifying score that fails those conjunctions falls through to the
    /// next tier down rather than being denied outright.
    fn select_tier(
        &self,
        score: f64,
        util_label: &str,
        payback_label: PaybackLabel,
    ) -> (RiskTier, i64) {
        let tiers = &self.config.tiers;
        let payback_ok = !matches!(payback_label, PaybackLabel::Negative);
        let utilization_ok = matches!(util_label, "healthy" | "medium-risk");

        if score >= tiers.tier_a_min_score && utilization_ok && payback_ok {
            (RiskTier::A, tiers.tier_a_limit_cents)
        } else if score >= tiers.tier_b_min_score && payback_ok {
            (RiskTier::B, tiers.tier_b_limit_cents)
        } else if score >= tiers.tier_c_min_score {
            (RiskTier::C, tiers.tier_c_limit_cents)
        } else {
            (RiskTier::D, tiers.tier_d_limit_cents)
        }
    }
}
