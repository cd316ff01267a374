use async_trait::async_trait;
use chanforge_domain::{ChannelProvisioningRequest, ChannelProvisioningResult};

use crate::error::EngineError;

/// Collaborator contract for the streaming media engine that actually owns
/// channel lifecycle. Implementations are expected to be idempotent at the
/// transport layer only by virtue of retries being bounded and logged by the
/// caller — the engine itself is free to treat every call as a fresh request.
#[async_trait]
pub trait MediaEngineClient: Send + Sync + 'static {
    /// Provision a channel for the given request, returning the engine's
    /// assigned identifiers. May be retried by the caller under a bounded
    /// backoff envelope on transient failure.
    async fn create_channel(
        &self,
        request: &ChannelProvisioningRequest,
    ) -> Result<ChannelProvisioningResult, EngineError>;

    /// Tear down a previously provisioned channel. Used by the admin API's
    /// retire/purge operations.
    async fn delete_channel(&self, channel_id: &str) -> Result<(), EngineError>;

    /// Rotate the ingest key for a channel without otherwise disturbing it.
    /// Used by the admin API's key-rotation operation.
    async fn rotate_ingest_key(&self, channel_id: &str) -> Result<(), EngineError>;
}
