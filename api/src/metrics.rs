//! Prometheus metrics, grounded on `api::metrics` from the teacher repo:
//! `Lazy`-wrapped constructors behind small macros, grouped by subsystem,
//! registered into a single custom `Registry` at start-up.

use once_cell::sync::Lazy;
use prometheus::{
    HistogramVec, IntCounterVec, Registry,
};

const LATENCY_BUCKETS: [f64; 11] = [
    0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Buckets for the webhook-delivery histogram (spec'd explicitly, distinct
/// from the general HTTP/decision latency buckets above).
const WEBHOOK_LATENCY_BUCKETS: [f64; 7] = [0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

macro_rules! counter_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| {
            prometheus::IntCounterVec::new(prometheus::Opts::new($name, $help), $labels)
                .expect("metric registration should not fail")
        })
    };
}

macro_rules! histogram_vec {
    ($name:expr, $help:expr, $labels:expr) => {
        Lazy::new(|| {
            prometheus::HistogramVec::new(
                prometheus::HistogramOpts::new($name, $help).buckets(LATENCY_BUCKETS.to_vec()),
                $labels,
            )
            .expect("metric registration should not fail")
        })
    };
    ($name:expr, $help:expr, $labels:expr, buckets = $buckets:expr) => {
        Lazy::new(|| {
            prometheus::HistogramVec::new(
                prometheus::HistogramOpts::new($name, $help).buckets($buckets.to_vec()),
                $labels,
            )
            .expect("metric registration should not fail")
        })
    };
}

// ── HTTP ──
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "http_requests_total",
    "Total HTTP requests",
    &["method", "path", "status"]
);
pub static HTTP_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = histogram_vec!(
    "http_request_duration_seconds",
    "HTTP request duration in seconds",
    &["method", "path"]
);

// ── Decisions ──
pub static DECISIONS_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "bnpl_decisions_total",
    "Total decisions made, by outcome",
    &["outcome"]
);
pub static CREDIT_LIMIT_BUCKET_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "bnpl_credit_limit_bucket_total",
    "Decisions by credit limit tier",
    &["bucket"]
);
pub static DECISION_DURATION_SECONDS: Lazy<HistogramVec> = histogram_vec!(
    "bnpl_decision_duration_seconds",
    "End-to-end decision pipeline duration in seconds",
    &["outcome"]
);

// ── Bank client ──
pub static BANK_FETCH_FAILURES_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "bank_fetch_failures_total",
    "Failed attempts to fetch transactions from the bank API",
    &["reason"]
);
pub static BANK_FETCH_DURATION_SECONDS: Lazy<HistogramVec> = histogram_vec!(
    "bank_fetch_duration_seconds",
    "Bank API fetch latency in seconds",
    &[]
);

// ── Webhook dispatch ──
pub static WEBHOOK_ATTEMPTS_TOTAL: Lazy<IntCounterVec> = counter_vec!(
    "webhook_attempts_total",
    "Webhook delivery attempts, by outcome",
    &["outcome"]
);
pub static WEBHOOK_LATENCY_SECONDS: Lazy<HistogramVec> = histogram_vec!(
    "webhook_latency_seconds",
    "Webhook delivery latency in seconds",
    &[],
    buckets = WEBHOOK_LATENCY_BUCKETS
);

/// Registers every metric family into `registry`. Called once at start-up;
/// a metric used before this runs still works (`Lazy` initializes on first
/// access) but won't show up in `/metrics` until registered.
pub fn register_all(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .expect("register http_requests_total");
    registry
        .register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))
        .expect("register http_request_duration_seconds");
    registry
        .register(Box::new(DECISIONS_TOTAL.clone()))
        .expect("register bnpl_decisions_total");
    registry
        .register(Box::new(CREDIT_LIMIT_BUCKET_TOTAL.clone()))
        .expect("register bnpl_credit_limit_bucket_total");
    registry
        .register(Box::new(DECISION_DURATION_SECONDS.clone()))
        .expect("register bnpl_decision_duration_seconds");
    registry
        .register(Box::new(BANK_FETCH_FAILURES_TOTAL.clone()))
        .expect("register bank_fetch_failures_total");
    registry
        .register(Box::new(BANK_FETCH_DURATION_SECONDS.clone()))
        .expect("register bank_fetch_duration_seconds");
    registry
        .register(Box::new(WEBHOOK_ATTEMPTS_TOTAL.clone()))
        .expect("register webhook_attempts_total");
    registry
        .register(Box::new(WEBHOOK_LATENCY_SECONDS.clone()))
        .expect("register webhook_latency_seconds");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_all_populates_the_registry() {
        let registry = Registry::new_custom(Some("bnpl".into()), None).unwrap();
        register_all(&registry);
        assert!(!registry.gather().is_empty());
    }
}
