use std::sync::Arc;
use std::time::Duration;

use chanforge_config::ProvisionerConfig;
use chanforge_notify::AlertingSink;
use chanforge_provisioner::ChannelProvisioner;
use chanforge_store::MetadataRepository;
use tracing::{info, warn};

use crate::reconcile::reconcile_failed;

/// Drives `reconcileFailed` on a fixed interval. `reconcileFailed` itself
/// stays a single async call with no internal timing so it remains testable
/// in isolation; this wrapper is the "external scheduler" spec.md assumes,
/// concretized for the CLI's `serve` subcommand.
pub struct ReconcileScheduler {
    repository: Arc<dyn MetadataRepository>,
    provisioner: Arc<ChannelProvisioner>,
    alerter: Arc<dyn AlertingSink>,
    config: ProvisionerConfig,
    interval: Duration,
    limit: u32,
}

impl ReconcileScheduler {
    pub fn new(
        repository: Arc<dyn MetadataRepository>,
        provisioner: Arc<ChannelProvisioner>,
        alerter: Arc<dyn AlertingSink>,
        config: ProvisionerConfig,
        interval: Duration,
        limit: u32,
    ) -> Self {
        Self { repository, provisioner, alerter, config, interval, limit }
    }

    /// Runs until cancelled. Intended to be spawned as its own task.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            ticker.tick().await;
            match reconcile_failed(
                self.repository.as_ref(),
                &self.provisioner,
                self.alerter.as_ref(),
                &self.config,
                Some(self.limit),
            )
            .await
            {
                Ok(report) => {
                    info!(attempted = report.attempted, succeeded = report.succeeded, "reconciliation pass complete");
                }
                Err(err) => {
                    warn!(error = %err, "reconciliation pass failed to list failed records");
                }
            }
        }
    }
}
