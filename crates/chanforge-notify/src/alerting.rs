use async_trait::async_trait;
use serde::Serialize;
use tracing::error;

use crate::error::NotifyError;

/// Side-channel for operational failures. Alerting errors are logged and
/// swallowed by callers — an alert that can't be delivered must never be
/// promoted to a handler failure.
#[async_trait]
pub trait AlertingSink: Send + Sync + 'static {
    async fn ingest_failure(&self, content_id: &str, error: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AlertPayload<'a> {
    content_id: &'a str,
    error: &'a str,
}

/// Default/local-dev implementation: logs at `error` level.
#[derive(Debug, Default, Clone)]
pub struct LoggingAlertingSink;

#[async_trait]
impl AlertingSink for LoggingAlertingSink {
    async fn ingest_failure(&self, content_id: &str, error_message: &str) -> Result<(), NotifyError> {
        error!(content_id, error = error_message, "ingest failure");
        Ok(())
    }
}

/// POSTs the alert JSON body to a configured webhook URL.
#[derive(Clone)]
pub struct HttpAlertingSink {
    webhook_url: String,
    client: reqwest::Client,
}

impl HttpAlertingSink {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AlertingSink for HttpAlertingSink {
    async fn ingest_failure(&self, content_id: &str, error_message: &str) -> Result<(), NotifyError> {
        let payload = AlertPayload {
            content_id,
            error: error_message,
        };
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::AlertFailed(resp.status().to_string()));
        }
        Ok(())
    }
}
