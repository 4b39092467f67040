pub mod models;

pub use models::{
    Decision, Installment, InstallmentStatus, OutboundWebhook, Plan, Transaction,
    TransactionType, WebhookStatus,
};
