//! Environment-loaded configuration for the risk pipeline.
//!
//! Mirrors the `domain/config.py` dataclasses of the original system one to
//! one: every field has a documented default and an environment variable
//! name from spec §6.4. Validation (weights summing to 1.0) happens once at
//! construction so a bad deployment fails at start-up rather than mid-request
//! (`ConfigInvalid` in spec §7 is fatal, not per-request).

use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("{component} weights must sum to 1.0 (±0.01), got {sum}")]
    WeightsInvalid { component: &'static str, sum: f64 },
}

fn get_f64(key: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<f64>()
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value: raw,
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

fn get_i64(key: &'static str, default: i64) -> Result<i64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .parse::<i64>()
            .map_err(|e| ConfigError::InvalidValue {
                key,
                value: raw,
                reason: e.to_string(),
            }),
        Err(_) => Ok(default),
    }
}

/// BNPL tier limits and minimum scores (spec §4.5 "Tier selection").
#[derive(Debug, Clone, PartialEq)]
pub struct BnplTierConfig {
    pub tier_a_limit_cents: i64,
    pub tier_b_limit_cents: i64,
    pub tier_c_limit_cents: i64,
    pub tier_d_limit_cents: i64,
    pub tier_a_min_score: f64,
    pub tier_b_min_score: f64,
    pub tier_c_min_score: f64,
}

impl Default for BnplTierConfig {
    fn default() -> Self {
        Self {
            tier_a_limit_cents: 20_000,
            tier_b_limit_cents: 12_000,
            tier_c_limit_cents: 6_000,
            tier_d_limit_cents: 2_000,
            tier_a_min_score: 75.0,
            tier_b_min_score: 55.0,
            tier_c_min_score: 35.0,
        }
    }
}

impl BnplTierConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            tier_a_limit_cents: get_i64("BNPL_TIER_A_LIMIT", defaults.tier_a_limit_cents)?,
            tier_b_limit_cents: get_i64("BNPL_TIER_B_LIMIT", defaults.tier_b_limit_cents)?,
            tier_c_limit_cents: get_i64("BNPL_TIER_C_LIMIT", defaults.tier_c_limit_cents)?,
            tier_d_limit_cents: get_i64("BNPL_TIER_D_LIMIT", defaults.tier_d_limit_cents)?,
            tier_a_min_score: get_f64("BNPL_TIER_A_MIN_SCORE", defaults.tier_a_min_score)?,
            tier_b_min_score: get_f64("BNPL_TIER_B_MIN_SCORE", defaults.tier_b_min_score)?,
            tier_c_min_score: get_f64("BNPL_TIER_C_MIN_SCORE", defaults.tier_c_min_score)?,
        })
    }
}

/// Risk Engine component weights and penalties (spec §4.5).
#[derive(Debug, Clone, PartialEq)]
pub struct RiskWeightsConfig {
    pub balance_weight: f64,
    pub income_spend_weight: f64,
    pub nsf_weight: f64,
    pub balance_neg_cap_cents: i64,
    pub nsf_penalty: f64,
    pub payback_penalty: f64,
    pub util_penalty_high_risk: f64,
    pub util_penalty_medium_risk: f64,
}

impl Default for RiskWeightsConfig {
    fn default() -> Self {
        Self {
            balance_weight: 0.5,
            income_spend_weight: 0.3,
            nsf_weight: 0.2,
            balance_neg_cap_cents: 10_000,
            nsf_penalty: 25.0,
            payback_penalty: 10.0,
            util_penalty_high_risk: 15.0,
            util_penalty_medium_risk: 7.5,
        }
    }
}

impl RiskWeightsConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let cfg = Self {
            balance_weight: get_f64("RISK_BALANCE_WEIGHT", defaults.balance_weight)?,
            income_spend_weight: get_f64(
                "RISK_INCOME_SPEND_WEIGHT",
                defaults.income_spend_weight,
            )?,
            nsf_weight: get_f64("RISK_NSF_WEIGHT", defaults.nsf_weight)?,
            balance_neg_cap_cents: get_i64(
                "RISK_BALANCE_NEG_CAP",
                defaults.balance_neg_cap_cents,
            )?,
            nsf_penalty: get_f64("RISK_NSF_PENALTY", defaults.nsf_penalty)?,
            payback_penalty: get_f64("RISK_PAYBACK_PENALTY", defaults.payback_penalty)?,
            util_penalty_high_risk: get_f64(
                "UTIL_PENALTY_HIGH_RISK",
                defaults.util_penalty_high_risk,
            )?,
            util_penalty_medium_risk: get_f64(
                "UTIL_PENALTY_MEDIUM_RISK",
                defaults.util_penalty_medium_risk,
            )?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.balance_weight + self.income_spend_weight + self.nsf_weight;
        if (sum - 1.0).abs() > 0.01 {
            return Err(ConfigError::WeightsInvalid {
                component: "risk engine",
                sum,
            });
        }
        Ok(())
    }
}

/// Gaussian scoring parameters for the Utilization Analyzer (spec §4.2).
///
/// The asymmetric Gaussians' left/right sigmas are fixed constants per
/// spec §4.2 (0.5/0.25 for utilization, 10.0/30.0 for burn-days) rather than
/// environment-configurable: the original `domain/config.py` only exposes a
/// single `UTIL_SIGMA`/`BURN_SIGMA` each, which the original's utilization
/// service itself ignores in favor of hardcoded asymmetric constants. See
/// DESIGN.md for this Open Question decision.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationConfig {
    pub util_mu: f64,
    pub util_weight: f64,
    pub burn_mu: f64,
    pub burn_weight: f64,
    pub spend_mu: f64,
    pub spend_sigma: f64,
    pub spend_weight: f64,
    pub label_healthy: f64,
    pub label_medium_risk: f64,
    pub label_high_risk: f64,
    pub label_very_high_risk: f64,
}

pub(crate) const UTIL_SIGMA_LEFT: f64 = 0.5;
pub(crate) const UTIL_SIGMA_RIGHT: f64 = 0.25;
pub(crate) const BURN_SIGMA_LEFT: f64 = 10.0;
pub(crate) const BURN_SIGMA_RIGHT: f64 = 30.0;

impl Default for UtilizationConfig {
    fn default() -> Self {
        Self {
            util_mu: 0.6,
            util_weight: 0.45,
            burn_mu: 30.0,
            burn_weight: 0.35,
            spend_mu: 0.033,
            spend_sigma: 0.02,
            spend_weight: 0.20,
            label_healthy: 80.0,
            label_medium_risk: 60.0,
            label_high_risk: 40.0,
            label_very_high_risk: 20.0,
        }
    }
}

impl UtilizationConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let cfg = Self {
            util_mu: get_f64("UTIL_MU", defaults.util_mu)?,
            util_weight: get_f64("UTIL_WEIGHT", defaults.util_weight)?,
            burn_mu: get_f64("BURN_MU", defaults.burn_mu)?,
            burn_weight: get_f64("BURN_WEIGHT", defaults.burn_weight)?,
            spend_mu: get_f64("SPEND_MU", defaults.spend_mu)?,
            spend_sigma: get_f64("SPEND_SIGMA", defaults.spend_sigma)?,
            spend_weight: get_f64("SPEND_WEIGHT", defaults.spend_weight)?,
            label_healthy: get_f64("LABEL_HEALTHY", defaults.label_healthy)?,
            label_medium_risk: get_f64("LABEL_MEDIUM_RISK", defaults.label_medium_risk)?,
            label_high_risk: get_f64("LABEL_HIGH_RISK", defaults.label_high_risk)?,
            label_very_high_risk: get_f64(
                "LABEL_VERY_HIGH_RISK",
                defaults.label_very_high_risk,
            )?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.util_weight + self.burn_weight + self.spend_weight;
        if (sum - 1.0).abs() > 0.01 {
            return Err(ConfigError::WeightsInvalid {
                component: "utilization analyzer",
                sum,
            });
        }
        Ok(())
    }

    /// Non-strict thresholds, first match wins, in descending order.
    pub fn label_thresholds(&self) -> [(f64, &'static str); 5] {
        [
            (self.label_healthy, "healthy"),
            (self.label_medium_risk, "medium-risk"),
            (self.label_high_risk, "high-risk"),
            (self.label_very_high_risk, "very-high-risk"),
            (0.0, "critical-risk"),
        ]
    }
}

/// Cooldown window configuration (spec §4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CooldownConfig {
    pub cooldown_hours: i64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self { cooldown_hours: 72 }
    }
}

impl CooldownConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cooldown_hours: get_i64("COOLDOWN_HOURS", Self::default().cooldown_hours)?,
        })
    }
}

/// Aggregate configuration for the whole risk pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskConfig {
    pub tiers: BnplTierConfig,
    pub weights: RiskWeightsConfig,
    pub utilization: UtilizationConfig,
    pub cooldown: CooldownConfig,
}

impl RiskConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            tiers: BnplTierConfig::from_env()?,
            weights: RiskWeightsConfig::from_env()?,
            utilization: UtilizationConfig::from_env()?,
            cooldown: CooldownConfig::from_env()?,
        })
    }
}
