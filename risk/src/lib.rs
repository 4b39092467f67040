//! Pure computation crate for the BNPL risk-scoring pipeline: feature
//! extraction, utilization analysis, payback capacity, cooldown checking,
//! the risk engine that composes them, and the repayment plan builder.
//!
//! This crate has no I/O: it takes transaction/event data already fetched
//! by the caller and returns structured results. The orchestration that
//! fetches, calls into this crate, and persists/dispatches the outcome
//! lives in the `api` crate.

pub mod config;
pub mod cooldown;
pub mod engine;
pub mod features;
pub mod payback;
pub mod plan;
pub mod utilization;

pub use config::{
    BnplTierConfig, CooldownConfig, ConfigError, RiskConfig, RiskWeightsConfig, UtilizationConfig,
};
pub use cooldown::{compute_cooldown, CooldownResult, UserEvent};
pub use engine::{RiskEngine, RiskFactors, RiskOutcome, RiskReason, RiskTier};
pub use features::{FeatureError, FeatureExtractor, Features};
pub use payback::{compute_payback_capacity, PaybackLabel, PaybackOutcome};
pub use plan::{InstallmentSchedule, PlanBuilder, PlanSchedule};
pub use utilization::{PaycheckInfo, UtilizationAnalyzer, UtilizationResult, MIN_PAYCHECK_CONFIDENCE};
