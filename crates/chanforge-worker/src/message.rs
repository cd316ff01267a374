use serde::{Deserialize, Serialize};

/// Inbound pub/sub envelope. `data` is base64-encoded UTF-8 JSON; `context`
/// (eventId/timestamp) is opaque to the worker and only logged.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    pub message_id: String,
    pub data: String,
    #[serde(default)]
    pub delivery_attempt: Option<u32>,
    #[serde(default)]
    pub publish_time: Option<String>,
}

impl InboundMessage {
    /// `message.deliveryAttempt ?? 1`.
    pub fn attempt(&self) -> u32 {
        self.delivery_attempt.unwrap_or(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Ack,
    Nack,
}

/// `handleMessage` result: `{action: ack|nack, retryInSeconds?}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandleOutcome {
    pub action: Action,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_in_seconds: Option<u64>,
}

impl HandleOutcome {
    pub fn ack() -> Self {
        Self { action: Action::Ack, retry_in_seconds: None }
    }

    pub fn nack(retry_in_seconds: u64) -> Self {
        Self { action: Action::Nack, retry_in_seconds: Some(retry_in_seconds) }
    }
}
