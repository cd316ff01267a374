use std::collections::BTreeMap;
use std::sync::Arc;

use chanforge_config::ProvisionerConfig;
use chanforge_domain::{
    AbrVariant, Assignable, ChannelMetadata, ChannelProvisioningRequest, ChannelStatus,
    ContentType, UploadCompletedEvent,
};
use chanforge_engine::MediaEngineClient;
use chanforge_store::MetadataRepository;
use chrono::Utc;
use sha1::{Digest, Sha1};
use tracing::{info, warn};

use crate::error::ProvisionError;
use crate::retry::{retry_with_backoff, CancellationToken, RetryOutcome};

/// Idempotency gate + provisioning state machine, generalizing over any
/// [`MetadataRepository`] and [`MediaEngineClient`].
pub struct ChannelProvisioner {
    repository: Arc<dyn MetadataRepository>,
    engine: Arc<dyn MediaEngineClient>,
    config: ProvisionerConfig,
}

impl ChannelProvisioner {
    pub fn new(
        repository: Arc<dyn MetadataRepository>,
        engine: Arc<dyn MediaEngineClient>,
        config: ProvisionerConfig,
    ) -> Self {
        Self { repository, engine, config }
    }

    /// `provisionFromUpload(event) -> ChannelMetadata`.
    pub async fn provision_from_upload(
        &self,
        event: &UploadCompletedEvent,
    ) -> Result<ChannelMetadata, ProvisionError> {
        self.provision_from_upload_cancellable(event, &CancellationToken::new()).await
    }

    pub async fn provision_from_upload_cancellable(
        &self,
        event: &UploadCompletedEvent,
        cancellation: &CancellationToken,
    ) -> Result<ChannelMetadata, ProvisionError> {
        let data = &event.data;
        let existing = self.repository.find_by_content_id(&data.content_id).await?;

        if let Some(existing) = &existing {
            if existing.status == ChannelStatus::Ready && existing.checksum == data.checksum {
                info!(content_id = %data.content_id, "idempotent replay, returning existing ready record");
                return Ok(existing.clone());
            }
        }

        let ladder = self.abr_ladder_for(data.content_type);
        let ingest_pool = self.ingest_pool_for(data.content_type);
        let egress_pool = self.egress_pool_for(data.content_type);
        let manifest_path = default_manifest_path(&data.content_id);
        let cache_key = compute_cache_key(&data.content_id, &data.checksum);
        let playback_url = self.resolve_playback_url(&manifest_path);
        let metadata = self.build_metadata_map(event);

        let base_retries = existing.as_ref().map(|e| e.retries + 1).unwrap_or(0);
        let now = Utc::now();

        let pre_record = ChannelMetadata {
            content_id: data.content_id.clone(),
            channel_id: existing.as_ref().map(|e| e.channel_id.clone()).unwrap_or_else(Assignable::pending),
            classification: data.content_type,
            manifest_path: manifest_path.clone(),
            playback_url: playback_url.clone(),
            origin_endpoint: existing.as_ref().map(|e| e.origin_endpoint.clone()).unwrap_or_else(Assignable::pending),
            cache_key: cache_key.clone(),
            checksum: data.checksum.clone(),
            status: ChannelStatus::Provisioning,
            retries: base_retries,
            source_asset_uri: data.source_uri.clone(),
            last_provisioned_at: now,
            drm: data.drm.clone(),
            ingest_region: data.ingest_region.clone(),
            availability_window: data.availability_window.clone(),
            geo_restrictions: data.geo_restrictions.clone(),
        };
        self.repository.upsert(&pre_record).await?;

        let request = ChannelProvisioningRequest {
            content_id: data.content_id.clone(),
            classification: data.content_type,
            source_uri: data.source_uri.clone(),
            ingest_pool,
            egress_pool,
            abr_ladder: ladder,
            output_bucket: self.config.manifest_bucket.clone(),
            manifest_path: manifest_path.clone(),
            cache_key: cache_key.clone(),
            drm: data.drm.clone(),
            availability_window: data.availability_window.clone(),
            geo_restrictions: data.geo_restrictions.clone(),
            metadata,
        };

        let outcome = retry_with_backoff(
            self.config.max_provision_retries,
            cancellation,
            |e: &chanforge_engine::EngineError| e.is_retryable(),
            |attempt| {
                let request = &request;
                async move {
                    let result = self.engine.create_channel(request).await;
                    if result.is_err() {
                        warn!(attempt, content_id = %request.content_id, "engine create_channel attempt failed");
                    }
                    result
                }
            },
        )
        .await;

        match outcome {
            RetryOutcome::Succeeded(response) => {
                let final_manifest_path = response.manifest_path.unwrap_or(manifest_path);
                let final_playback_url = response
                    .playback_base_url
                    .map(|base| join_url(&base, &final_manifest_path))
                    .unwrap_or_else(|| self.resolve_playback_url(&final_manifest_path));

                let final_record = ChannelMetadata {
                    channel_id: Assignable::assigned(response.channel_id),
                    manifest_path: final_manifest_path,
                    playback_url: final_playback_url,
                    origin_endpoint: Assignable::assigned(response.origin_endpoint),
                    status: ChannelStatus::Ready,
                    last_provisioned_at: Utc::now(),
                    ..pre_record
                };
                self.repository.upsert(&final_record).await?;
                Ok(final_record)
            }
            RetryOutcome::Exhausted(err) => {
                let failed_record = ChannelMetadata {
                    status: ChannelStatus::Failed,
                    retries: base_retries + 1,
                    last_provisioned_at: Utc::now(),
                    ..pre_record
                };
                self.repository.upsert(&failed_record).await?;
                Err(ProvisionError::Engine(err))
            }
            RetryOutcome::Cancelled => Err(ProvisionError::Cancelled),
        }
    }

    fn abr_ladder_for(&self, classification: ContentType) -> Vec<AbrVariant> {
        match classification {
            ContentType::Reel => self.config.reels_abr_ladder.clone(),
            ContentType::Series => self.config.series_abr_ladder.clone(),
        }
    }

    fn ingest_pool_for(&self, classification: ContentType) -> String {
        match classification {
            ContentType::Reel => self.config.reels_ingest_pool.clone(),
            ContentType::Series => self.config.series_ingest_pool.clone(),
        }
    }

    fn egress_pool_for(&self, classification: ContentType) -> String {
        match classification {
            ContentType::Reel => self.config.reels_egress_pool.clone(),
            ContentType::Series => self.config.series_egress_pool.clone(),
        }
    }

    fn resolve_playback_url(&self, manifest_path: &str) -> String {
        join_url(&self.config.cdn_base_url, manifest_path)
    }

    fn build_metadata_map(&self, event: &UploadCompletedEvent) -> BTreeMap<String, String> {
        let data = &event.data;
        let mut map = BTreeMap::new();
        map.insert("tenantId".to_string(), data.tenant_id.clone());
        map.insert("checksum".to_string(), data.checksum.clone());
        map.insert("ingestRegion".to_string(), data.ingest_region.clone());
        map.insert("durationSeconds".to_string(), data.duration_seconds.to_string());
        map.insert("signingKeyId".to_string(), self.config.signing_key_id.clone());
        map.insert("dryRun".to_string(), self.config.dry_run.to_string());
        map
    }
}

pub fn default_manifest_path(content_id: &str) -> String {
    format!("manifests/{content_id}/master.m3u8")
}

pub fn compute_cache_key(content_id: &str, checksum: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(content_id.as_bytes());
    hasher.update(b":");
    hasher.update(checksum.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanforge_domain::UploadEventPayload;
    use chanforge_engine::StubMediaEngineClient;
    use chanforge_store::InMemoryRepository;
    use chrono::Utc;

    fn event(content_id: &str, checksum: &str) -> UploadCompletedEvent {
        UploadCompletedEvent {
            event_id: "e1".to_string(),
            event_type: chanforge_domain::EVENT_TYPE_MEDIA_UPLOADED.to_string(),
            version: 1,
            occurred_at: Utc::now(),
            data: UploadEventPayload {
                content_id: content_id.to_string(),
                tenant_id: "tenant-a".to_string(),
                content_type: ContentType::Reel,
                source_uri: "s3://bucket/a".to_string(),
                checksum: checksum.to_string(),
                duration_seconds: 10,
                ingest_region: "us".to_string(),
                drm: None,
                availability_window: None,
                geo_restrictions: None,
                acknowledgement: None,
            },
        }
    }

    fn provisioner(engine: Arc<dyn MediaEngineClient>) -> (ChannelProvisioner, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let config = ProvisionerConfig::default();
        let provisioner = ChannelProvisioner::new(repo.clone(), engine, config);
        (provisioner, repo)
    }

    #[tokio::test]
    async fn happy_path_provisions_and_marks_ready() {
        let engine = Arc::new(StubMediaEngineClient::new());
        let (provisioner, _repo) = provisioner(engine);

        let record = provisioner.provision_from_upload(&event("c1", "s1")).await.unwrap();
        assert_eq!(record.status, ChannelStatus::Ready);
        assert_eq!(record.retries, 0);
        assert!(!record.channel_id.is_pending());
    }

    #[tokio::test]
    async fn idempotent_replay_short_circuits() {
        let engine = Arc::new(StubMediaEngineClient::new());
        let (provisioner, _repo) = provisioner(engine.clone());

        let first = provisioner.provision_from_upload(&event("c1", "s1")).await.unwrap();
        let second = provisioner.provision_from_upload(&event("c1", "s1")).await.unwrap();

        assert_eq!(first.channel_id, second.channel_id);
        assert_eq!(engine.recorded_calls().len(), 1);
    }

    #[tokio::test]
    async fn checksum_change_forces_reprovision() {
        let engine = Arc::new(StubMediaEngineClient::new());
        let (provisioner, _repo) = provisioner(engine.clone());

        provisioner.provision_from_upload(&event("c1", "s1")).await.unwrap();
        let updated = provisioner.provision_from_upload(&event("c1", "s2")).await.unwrap();

        assert_eq!(updated.checksum, "s2");
        assert_eq!(updated.retries, 1);
        assert_eq!(engine.recorded_calls().len(), 2);
    }

    #[tokio::test]
    async fn transient_failures_retry_then_succeed() {
        let engine = Arc::new(StubMediaEngineClient::failing_n_times(2));
        let (provisioner, _repo) = provisioner(engine.clone());

        let record = provisioner.provision_from_upload(&event("c1", "s1")).await.unwrap();
        assert_eq!(record.status, ChannelStatus::Ready);
        assert_eq!(engine.recorded_calls().len(), 3);
    }

    #[tokio::test]
    async fn exhausted_retries_mark_record_failed() {
        let engine = Arc::new(StubMediaEngineClient::failing_n_times(100));
        let mut config = ProvisionerConfig::default();
        config.max_provision_retries = 2;
        let repo = Arc::new(InMemoryRepository::new());
        let provisioner = ChannelProvisioner::new(repo.clone(), engine, config);

        let err = provisioner.provision_from_upload(&event("c1", "s1")).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Engine(_)));

        let stored = repo.find_by_content_id("c1").await.unwrap().unwrap();
        assert_eq!(stored.status, ChannelStatus::Failed);
        assert_eq!(stored.retries, 1);
    }

    #[test]
    fn cache_key_is_stable_sha1_of_content_id_and_checksum() {
        let key = compute_cache_key("c1", "s1");
        assert_eq!(key.len(), 40);
        assert_eq!(key, compute_cache_key("c1", "s1"));
        assert_ne!(key, compute_cache_key("c1", "s2"));
    }
}
