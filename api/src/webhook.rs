//! Outbound webhook dispatch to the downstream ledger, grounded on
//! `indexer::backoff::{ExponentialBackoff, execute_with_backoff}` for the
//! retry shape and on `infrastructure/clients/webhook_client.py` /
//! `webhook_service.py` for the attempt-accounting and payload shape.

use crate::metrics::{WEBHOOK_ATTEMPTS_TOTAL, WEBHOOK_LATENCY_SECONDS};
use crate::repo::WebhookRepo;
use async_trait::async_trait;
use serde::Serialize;
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

/// Six total attempts (one initial send plus five retries), matching the
/// original `tenacity` policy of `stop_after_attempt(6)`.
const MAX_ATTEMPTS: u32 = 6;
const BASE_INTERVAL_SECS: u64 = 1;
const MAX_INTERVAL_SECS: u64 = 30;

#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    attempt: u32,
    base_interval_secs: u64,
    max_interval_secs: u64,
}

impl ExponentialBackoff {
    pub fn new(base_interval_secs: u64, max_interval_secs: u64) -> Self {
        Self {
            attempt: 0,
            base_interval_secs,
            max_interval_secs,
        }
    }

    pub fn on_failure(&mut self) -> Duration {
        self.attempt += 1;
        let secs = self
            .base_interval_secs
            .saturating_mul(2_u64.saturating_pow(self.attempt - 1))
            .min(self.max_interval_secs);
        Duration::from_secs(secs)
    }

    pub fn on_success(&mut self) {
        self.attempt = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempt
    }

    pub fn should_give_up(&self, max_total_attempts: u32) -> bool {
        self.attempt >= max_total_attempts
    }
}

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("webhook request failed: {0}")]
    RequestFailed(String),
    #[error("webhook returned status {0}")]
    HttpStatus(u16),
    #[error("webhook delivery gave up after {0} attempts")]
    GaveUp(u32),
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookPayload {
    pub event: &'static str,
    pub plan_id: String,
    pub decision_id: String,
    pub user_id: String,
    pub amount_granted_cents: i64,
    pub request_id: Option<String>,
}

/// The capability the orchestrator depends on for webhook dispatch.
///
/// `webhook_id` names the `OutboundWebhook` row already created for this
/// plan; the implementation updates it after every attempt (not just the
/// last one) so an operator watching the row sees retries as they happen.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn send_webhook(
        &self,
        webhook_id: Uuid,
        payload: WebhookPayload,
        repo: &(dyn WebhookRepo + Send + Sync),
    ) -> (bool, u32);
}

pub struct WebhookDispatcher {
    target_url: String,
    client: reqwest::Client,
}

impl WebhookDispatcher {
    pub fn new(target_url: String, connect_timeout: Duration, read_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .expect("reqwest client should build with valid timeouts");
        Self { target_url, client }
    }

    async fn attempt_once(&self, payload: &WebhookPayload) -> Result<(), WebhookError> {
        let url = format!("{}/mock-ledger", self.target_url.trim_end_matches('/'));
        let started = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(|e| WebhookError::RequestFailed(e.to_string()))?;
        WEBHOOK_LATENCY_SECONDS
            .with_label_values(&[])
            .observe(started.elapsed().as_secs_f64());

        if response.status().is_success() {
            Ok(())
        } else {
            Err(WebhookError::HttpStatus(response.status().as_u16()))
        }
    }
}

#[async_trait]
impl WebhookSink for WebhookDispatcher {
    async fn send_webhook(
        &self,
        webhook_id: Uuid,
        payload: WebhookPayload,
        repo: &(dyn WebhookRepo + Send + Sync),
    ) -> (bool, u32) {
        let mut backoff = ExponentialBackoff::new(BASE_INTERVAL_SECS, MAX_INTERVAL_SECS);
        for attempt in 1..=MAX_ATTEMPTS {
            let outcome = self.attempt_once(&payload).await;
            let success = outcome.is_ok();
            if let Err(err) = repo.record_attempt(webhook_id, success).await {
                tracing::error!(error = %err, webhook_id = %webhook_id, "webhook_attempt_record_failed");
            }
            match outcome {
                Ok(()) => {
                    backoff.on_success();
                    WEBHOOK_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
                    return (true, attempt);
                }
                Err(_) if attempt == MAX_ATTEMPTS => {
                    WEBHOOK_ATTEMPTS_TOTAL.with_label_values(&["failed"]).inc();
                    return (false, attempt);
                }
                Err(_) => {
                    WEBHOOK_ATTEMPTS_TOTAL.with_label_values(&["retry"]).inc();
                    let delay = backoff.on_failure();
                    tokio::time::sleep(delay).await;
                }
            }
        }
        (false, MAX_ATTEMPTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_sequence_doubles_and_caps() {
        let mut backoff = ExponentialBackoff::new(1, 30);
        assert_eq!(backoff.on_failure(), Duration::from_secs(1));
        assert_eq!(backoff.on_failure(), Duration::from_secs(2));
        assert_eq!(backoff.on_failure(), Duration::from_secs(4));
        assert_eq!(backoff.on_failure(), Duration::from_secs(8));
        assert_eq!(backoff.on_failure(), Duration::from_secs(16));
        assert_eq!(backoff.on_failure(), Duration::from_secs(30));
    }

    #[test]
    fn success_resets_attempt_count() {
        let mut backoff = ExponentialBackoff::new(1, 30);
        backoff.on_failure();
        backoff.on_failure();
        backoff.on_success();
        assert_eq!(backoff.attempts(), 0);
    }

    #[test]
    fn should_give_up_after_max_attempts() {
        let mut backoff = ExponentialBackoff::new(1, 30);
        for _ in 0..6 {
            backoff.on_failure();
        }
        assert!(backoff.should_give_up(6));
    }

    struct FakeSink {
        succeed: bool,
    }

    #[async_trait]
    impl WebhookSink for FakeSink {
        async fn send_webhook(
            &self,
            _webhook_id: Uuid,
            _payload: WebhookPayload,
            _repo: &(dyn WebhookRepo + Send + Sync),
        ) -> (bool, u32) {
            (self.succeed, 1)
        }
    }

    struct NoopRepo;

    #[async_trait]
    impl WebhookRepo for NoopRepo {
        async fn create_pending(
            &self,
            _event_type: &str,
            _payload: serde_json::Value,
            _target_url: &str,
            _plan_id: Uuid,
        ) -> Result<shared::OutboundWebhook, crate::repo::decision_repo::RepoError> {
            unreachable!("not exercised by this test")
        }

        async fn record_attempt(
            &self,
            _id: Uuid,
            _success: bool,
        ) -> Result<(), crate::repo::decision_repo::RepoError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn fake_sink_satisfies_the_trait() {
        let sink = FakeSink { succeed: true };
        let (ok, attempts) = sink
            .send_webhook(
                Uuid::new_v4(),
                WebhookPayload {
                    event: "BNPL_APPROVED",
                    plan_id: "p1".to_string(),
                    decision_id: "d1".to_string(),
                    user_id: "u1".to_string(),
                    amount_granted_cents: 1000,
                    request_id: None,
                },
                &NoopRepo,
            )
            .await;
        assert!(ok);
        assert_eq!(attempts, 1);
    }
}
