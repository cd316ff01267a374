use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chanforge_domain::{ChannelMetadata, ChannelStatus};
use tokio::sync::RwLock;

use crate::error::RepositoryError;
use crate::store::MetadataRepository;

/// In-memory implementation of [`MetadataRepository`].
///
/// All data is lost on process exit. Suitable for tests and local dev.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<RwLock<HashMap<String, ChannelMetadata>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MetadataRepository for InMemoryRepository {
    async fn find_by_content_id(
        &self,
        content_id: &str,
    ) -> Result<Option<ChannelMetadata>, RepositoryError> {
        let guard = self.inner.read().await;
        Ok(guard.get(content_id).cloned())
    }

    async fn upsert(&self, record: &ChannelMetadata) -> Result<(), RepositoryError> {
        let mut guard = self.inner.write().await;
        guard.insert(record.content_id.clone(), record.clone());
        Ok(())
    }

    async fn list_failed(&self, limit: u32) -> Result<Vec<ChannelMetadata>, RepositoryError> {
        let guard = self.inner.read().await;
        let mut failed: Vec<ChannelMetadata> = guard
            .values()
            .filter(|m| m.status == ChannelStatus::Failed)
            .cloned()
            .collect();
        failed.sort_by_key(|m| m.last_provisioned_at);
        failed.truncate(limit as usize);
        Ok(failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanforge_domain::Assignable;
    use chrono::{Duration, Utc};

    fn dummy(content_id: &str, status: ChannelStatus, age_secs: i64) -> ChannelMetadata {
        ChannelMetadata {
            content_id: content_id.to_string(),
            channel_id: Assignable::pending(),
            classification: chanforge_domain::ContentType::Reel,
            manifest_path: format!("manifests/{content_id}/master.m3u8"),
            playback_url: "https://cdn.example/".to_string(),
            origin_endpoint: Assignable::pending(),
            cache_key: "deadbeef".to_string(),
            checksum: "s1".to_string(),
            status,
            retries: 0,
            source_asset_uri: "s3://bucket/a".to_string(),
            last_provisioned_at: Utc::now() - Duration::seconds(age_secs),
            drm: None,
            ingest_region: "us".to_string(),
            availability_window: None,
            geo_restrictions: None,
        }
    }

    #[tokio::test]
    async fn upsert_and_find() {
        let repo = InMemoryRepository::new();
        repo.upsert(&dummy("c1", ChannelStatus::Provisioning, 0)).await.unwrap();
        let found = repo.find_by_content_id("c1").await.unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().content_id, "c1");
    }

    #[tokio::test]
    async fn find_missing_returns_none() {
        let repo = InMemoryRepository::new();
        assert!(repo.find_by_content_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_failed_filters_and_orders_ascending() {
        let repo = InMemoryRepository::new();
        repo.upsert(&dummy("ready", ChannelStatus::Ready, 0)).await.unwrap();
        repo.upsert(&dummy("newer-failure", ChannelStatus::Failed, 5)).await.unwrap();
        repo.upsert(&dummy("older-failure", ChannelStatus::Failed, 50)).await.unwrap();

        let failed = repo.list_failed(10).await.unwrap();
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].content_id, "older-failure");
        assert_eq!(failed[1].content_id, "newer-failure");
    }

    #[tokio::test]
    async fn list_failed_respects_limit() {
        let repo = InMemoryRepository::new();
        for i in 0..5 {
            repo.upsert(&dummy(&format!("c{i}"), ChannelStatus::Failed, i as i64))
                .await
                .unwrap();
        }
        let failed = repo.list_failed(2).await.unwrap();
        assert_eq!(failed.len(), 2);
    }
}
