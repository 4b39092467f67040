//! Persistence layer capability traits and their Postgres implementations,
//! grounded on `indexer::db::DatabaseWriter`'s upsert-and-read-back pattern
//! and bound-parameter queries (never the teacher's `format!`-built SQL
//! strings, which are vulnerable to injection from user input).

pub mod decision_repo;
pub mod plan_repo;
pub mod webhook_repo;

pub use decision_repo::{DecisionStore, PgDecisionRepo};
pub use plan_repo::{PgPlanRepo, PlanStore};
pub use webhook_repo::{PgWebhookRepo, WebhookRepo};
