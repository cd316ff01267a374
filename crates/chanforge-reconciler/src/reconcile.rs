use std::sync::Arc;

use chanforge_config::ProvisionerConfig;
use chanforge_domain::{UploadCompletedEvent, UploadEventPayload, EVENT_TYPE_MEDIA_UPLOADED};
use chanforge_notify::AlertingSink;
use chanforge_provisioner::ChannelProvisioner;
use chanforge_store::MetadataRepository;
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ReconcileError;

const DEFAULT_LIMIT: u32 = 20;

/// Summary of one `reconcileFailed` pass, returned to the admin façade.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed_content_ids: Vec<String>,
}

/// `reconcileFailed(limit = 20)`. Scans `listFailed(limit)` and replays each
/// record independently through the provisioner; a failure on one record is
/// reported to the alerting sink and never aborts the loop.
pub async fn reconcile_failed(
    repository: &dyn MetadataRepository,
    provisioner: &ChannelProvisioner,
    alerter: &dyn AlertingSink,
    config: &ProvisionerConfig,
    limit: Option<u32>,
) -> Result<ReconcileReport, ReconcileError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    let failed = repository.list_failed(limit).await?;
    let mut report = ReconcileReport { attempted: failed.len() as u32, ..Default::default() };

    for record in &failed {
        let event = synthesize_replay_event(record, config);
        match provisioner.provision_from_upload(&event).await {
            Ok(_) => {
                info!(content_id = %record.content_id, "reconciliation replay succeeded");
                report.succeeded += 1;
            }
            Err(err) => {
                warn!(content_id = %record.content_id, error = %err, "reconciliation replay failed");
                let _ = alerter.ingest_failure(&record.content_id, &err.to_string()).await;
                report.failed_content_ids.push(record.content_id.clone());
            }
        }
    }

    Ok(report)
}

fn synthesize_replay_event(
    record: &chanforge_domain::ChannelMetadata,
    config: &ProvisionerConfig,
) -> UploadCompletedEvent {
    UploadCompletedEvent {
        event_id: format!("reconcile-{}", record.content_id),
        event_type: EVENT_TYPE_MEDIA_UPLOADED.to_string(),
        version: 1,
        occurred_at: Utc::now(),
        data: UploadEventPayload {
            content_id: record.content_id.clone(),
            tenant_id: config.reconcile_default_tenant_id.clone(),
            content_type: record.classification,
            source_uri: record.source_asset_uri.clone(),
            checksum: record.checksum.clone(),
            duration_seconds: 1,
            ingest_region: if record.ingest_region.is_empty() {
                config.reconcile_default_ingest_region.clone()
            } else {
                record.ingest_region.clone()
            },
            drm: record.drm.clone(),
            availability_window: record.availability_window.clone(),
            geo_restrictions: record.geo_restrictions.clone(),
            acknowledgement: None,
        },
    }
}
