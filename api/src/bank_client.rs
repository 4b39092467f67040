//! HTTP client for the upstream bank API, grounded on
//! `indexer::rpc::StellarRpcClient` for the client/timeout/error shape and
//! on `infrastructure/clients/bank_client.py` for the endpoint and
//! response-shape handling.

use crate::metrics::{BANK_FETCH_DURATION_SECONDS, BANK_FETCH_FAILURES_TOTAL};
use async_trait::async_trait;
use shared::Transaction;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BankClientError {
    #[error("bank API request failed: {0}")]
    RequestFailed(String),
    #[error("bank API returned status {0}")]
    HttpStatus(u16),
    #[error("bank API request timed out")]
    Timeout,
    #[error("bank API returned an unrecognized response shape")]
    InvalidResponse,
}

/// The capability the orchestrator depends on, so tests can substitute a
/// fake transaction source without an HTTP server.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    async fn fetch_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, BankClientError>;
}

pub struct BankClient {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl BankClient {
    pub fn new(base_url: String, api_key: Option<String>, connect_timeout: Duration, read_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()
            .expect("reqwest client should build with valid timeouts");
        Self {
            base_url,
            api_key,
            client,
        }
    }
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum BankResponse {
    List(Vec<Transaction>),
    Wrapped { transactions: Vec<Transaction> },
    Data { data: Vec<Transaction> },
    Empty(serde_json::Value),
}

#[async_trait]
impl TransactionSource for BankClient {
    async fn fetch_transactions(&self, user_id: &str) -> Result<Vec<Transaction>, BankClientError> {
        let url = format!("{}/bank/transactions", self.base_url.trim_end_matches('/'));
        let mut request = self.client.get(&url).query(&[("user_id", user_id)]);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let _timer = BANK_FETCH_DURATION_SECONDS
            .with_label_values(&[])
            .start_timer();

        let response = request.send().await.map_err(|e| {
            BANK_FETCH_FAILURES_TOTAL
                .with_label_values(&[failure_reason(&e)])
                .inc();
            if e.is_timeout() {
                BankClientError::Timeout
            } else {
                BankClientError::RequestFailed(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            BANK_FETCH_FAILURES_TOTAL
                .with_label_values(&["http_status"])
                .inc();
            return Err(BankClientError::HttpStatus(status));
        }

        let body: BankResponse = response.json().await.map_err(|e| {
            BANK_FETCH_FAILURES_TOTAL
                .with_label_values(&["invalid_response"])
                .inc();
            BankClientError::RequestFailed(e.to_string())
        })?;

        Ok(match body {
            BankResponse::List(transactions) => transactions,
            BankResponse::Wrapped { transactions } => transactions,
            BankResponse::Data { data } => data,
            BankResponse::Empty(_) => Vec::new(),
        })
    }
}

fn failure_reason(error: &reqwest::Error) -> &'static str {
    if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connect"
    } else {
        "request"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSource {
        transactions: Vec<Transaction>,
    }

    #[async_trait]
    impl TransactionSource for FakeSource {
        async fn fetch_transactions(
            &self,
            _user_id: &str,
        ) -> Result<Vec<Transaction>, BankClientError> {
            Ok(self.transactions.clone())
        }
    }

    #[tokio::test]
    async fn fake_transaction_source_satisfies_the_trait() {
        let source = FakeSource {
            transactions: Vec::new(),
        };
        let result = source.fetch_transactions("user-1").await.unwrap();
        assert!(result.is_empty());
    }
}
