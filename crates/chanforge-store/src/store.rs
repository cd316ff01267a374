use async_trait::async_trait;
use chanforge_domain::ChannelMetadata;

use crate::error::RepositoryError;

/// Durable key/value store over `ChannelMetadata`, keyed by `contentId`. The
/// core treats this as authoritative; there is no in-memory cache that
/// outlives a single provisioning call.
#[async_trait]
pub trait MetadataRepository: Send + Sync + 'static {
    /// Point lookup by `contentId`.
    async fn find_by_content_id(
        &self,
        content_id: &str,
    ) -> Result<Option<ChannelMetadata>, RepositoryError>;

    /// Full-record replace keyed by `contentId`. Must be durable before
    /// returning success. Concurrent upserts for the same `contentId` are
    /// serialized by the store (last writer wins at record granularity).
    async fn upsert(&self, record: &ChannelMetadata) -> Result<(), RepositoryError>;

    /// Scan of `status == failed` bounded by `limit`, ordered ascending by
    /// `lastProvisionedAt` so repeated calls make progress across the whole
    /// backlog instead of starving newer failures.
    async fn list_failed(&self, limit: u32) -> Result<Vec<ChannelMetadata>, RepositoryError>;
}
