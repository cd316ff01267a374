use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chanforge_config::ProvisionerConfig;
use chanforge_domain::{DomainError, UploadCompletedEvent};
use chanforge_notify::{AlertingSink, NotificationPublisher, NotifyError, PlaybackReadyNotification};
use chanforge_provisioner::ChannelProvisioner;
use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::error::WorkerError;
use crate::message::{HandleOutcome, InboundMessage};

const NOTIFY_RETRY_ATTEMPTS: u32 = 3;

/// Subset of [`ProvisionerConfig`] the worker itself consults.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub ack_deadline_seconds: u64,
    pub manifest_ttl_seconds: u64,
    pub max_delivery_attempts: u32,
}

impl From<&ProvisionerConfig> for WorkerConfig {
    fn from(config: &ProvisionerConfig) -> Self {
        Self {
            ack_deadline_seconds: config.ack_deadline_seconds,
            manifest_ttl_seconds: config.manifest_ttl_seconds,
            max_delivery_attempts: config.max_delivery_attempts,
        }
    }
}

/// Upload Event Worker: decode -> provision -> notify -> ack/nack.
pub struct UploadEventWorker {
    provisioner: Arc<ChannelProvisioner>,
    notifier: Arc<dyn NotificationPublisher>,
    alerter: Arc<dyn AlertingSink>,
    config: WorkerConfig,
}

impl UploadEventWorker {
    pub fn new(
        provisioner: Arc<ChannelProvisioner>,
        notifier: Arc<dyn NotificationPublisher>,
        alerter: Arc<dyn AlertingSink>,
        config: WorkerConfig,
    ) -> Self {
        Self { provisioner, notifier, alerter, config }
    }

    /// `handleMessage(message) -> {action, retryInSeconds?}`.
    pub async fn handle_message(&self, message: &InboundMessage) -> HandleOutcome {
        let attempt = message.attempt();

        match self.process(message).await {
            Ok(()) => HandleOutcome::ack(),
            Err((content_id, err)) => {
                let _ = self.alerter.ingest_failure(&content_id, &err.to_string()).await;

                if attempt >= self.config.max_delivery_attempts {
                    warn!(content_id, attempt, max_attempts = self.config.max_delivery_attempts, error = %err, "poisoned message, acking to drop");
                    HandleOutcome::ack()
                } else {
                    warn!(content_id, attempt, error = %err, "handler failed, nacking for redelivery");
                    HandleOutcome::nack(self.config.ack_deadline_seconds)
                }
            }
        }
    }

    async fn process(&self, message: &InboundMessage) -> Result<(), (String, WorkerError)> {
        let event = self.decode(message)?;
        let content_id = event.data.content_id.clone();

        info!(content_id, event_id = %event.event_id, "provisioning channel from upload event");

        let metadata = self
            .provisioner
            .provision_from_upload(&event)
            .await
            .map_err(|e| (content_id.clone(), WorkerError::from(e)))?;

        let expires_at = Utc::now() + Duration::seconds(self.config.manifest_ttl_seconds as i64);
        let notification = PlaybackReadyNotification {
            manifest_url: metadata.playback_url.clone(),
            metadata,
            expires_at,
        };

        self.publish_with_retry(&notification)
            .await
            .map_err(|e| (content_id.clone(), WorkerError::from(e)))?;

        Ok(())
    }

    fn decode(&self, message: &InboundMessage) -> Result<UploadCompletedEvent, (String, WorkerError)> {
        let bytes = STANDARD.decode(&message.data).map_err(|e| {
            ("unknown".to_string(), WorkerError::from(DomainError::InvalidContentId(e.to_string())))
        })?;
        UploadCompletedEvent::from_json(&bytes).map_err(|e| ("unknown".to_string(), WorkerError::from(e)))
    }

    /// Resolution of the notification-retry-on-idempotent-short-circuit open
    /// question: retries the publish a bounded number of times before
    /// surfacing the failure to the caller's standard ack/nack path, rather
    /// than silently skipping re-notification on an idempotent replay.
    async fn publish_with_retry(&self, notification: &PlaybackReadyNotification) -> Result<(), NotifyError> {
        let mut last_err = None;
        for attempt in 1..=NOTIFY_RETRY_ATTEMPTS {
            match self.notifier.publish_playback_ready(notification).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    warn!(attempt, content_id = %notification.metadata.content_id, error = %err, "playback-ready publish failed");
                    last_err = Some(err);
                }
            }
        }
        Err(last_err.expect("loop runs at least once"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use chanforge_engine::StubMediaEngineClient;
    use chanforge_notify::{LoggingAlertingSink, LoggingNotificationPublisher};
    use chanforge_store::InMemoryRepository;

    fn message(json: &str, delivery_attempt: Option<u32>) -> InboundMessage {
        InboundMessage {
            message_id: "m1".to_string(),
            data: STANDARD.encode(json),
            delivery_attempt,
            publish_time: None,
        }
    }

    fn upload_event_json(content_id: &str, checksum: &str) -> String {
        format!(
            r#"{{"eventId":"e1","eventType":"media.uploaded","version":1,"occurredAt":"2024-01-01T00:00:00Z",
               "data":{{"contentId":"{content_id}","tenantId":"t","contentType":"reel",
               "sourceUri":"s3://bucket/a","checksum":"{checksum}","durationSeconds":10,"ingestRegion":"us"}}}}"#
        )
    }

    fn worker(engine: Arc<StubMediaEngineClient>, max_delivery_attempts: u32) -> (UploadEventWorker, Arc<InMemoryRepository>) {
        let repo = Arc::new(InMemoryRepository::new());
        let config = ProvisionerConfig::default();
        let provisioner = Arc::new(ChannelProvisioner::new(repo.clone(), engine, config.clone()));
        let worker_config = WorkerConfig {
            max_delivery_attempts,
            ..WorkerConfig::from(&config)
        };
        let worker = UploadEventWorker::new(
            provisioner,
            Arc::new(LoggingNotificationPublisher),
            Arc::new(LoggingAlertingSink),
            worker_config,
        );
        (worker, repo)
    }

    #[tokio::test]
    async fn happy_path_acks() {
        let (worker, repo) = worker(Arc::new(StubMediaEngineClient::new()), 5);
        let msg = message(&upload_event_json("c1", "s1"), Some(1));

        let outcome = worker.handle_message(&msg).await;
        assert_eq!(outcome, HandleOutcome::ack());

        let stored = repo.find_by_content_id("c1").await.unwrap().unwrap();
        assert_eq!(stored.status, chanforge_domain::ChannelStatus::Ready);
    }

    #[tokio::test]
    async fn idempotent_replay_still_acks_and_renotifies() {
        let engine = Arc::new(StubMediaEngineClient::new());
        let (worker, _repo) = worker(engine.clone(), 5);

        let msg = message(&upload_event_json("c1", "s1"), Some(1));
        worker.handle_message(&msg).await;
        let outcome = worker.handle_message(&msg).await;

        assert_eq!(outcome, HandleOutcome::ack());
        assert_eq!(engine.recorded_calls().len(), 1);
    }

    #[tokio::test]
    async fn unsupported_event_type_nacks_before_max_attempts() {
        let (worker, _repo) = worker(Arc::new(StubMediaEngineClient::new()), 5);
        let bad_json = r#"{"eventId":"e1","eventType":"media.deleted","version":1,"occurredAt":"2024-01-01T00:00:00Z","data":{"contentId":"c1","tenantId":"t","contentType":"reel","sourceUri":"s3://bucket/a","checksum":"s1","durationSeconds":10,"ingestRegion":"us"}}"#;
        let msg = message(bad_json, Some(1));

        let outcome = worker.handle_message(&msg).await;
        assert_eq!(outcome, HandleOutcome::nack(30));
    }

    #[tokio::test]
    async fn transient_failure_then_poison_on_final_attempt() {
        let engine = Arc::new(StubMediaEngineClient::failing_n_times(100));
        let (worker, repo) = worker(engine, 3);
        let msg_json = upload_event_json("c1", "s1");

        let first = worker.handle_message(&message(&msg_json, Some(1))).await;
        assert_eq!(first, HandleOutcome::nack(30));

        let stored = repo.find_by_content_id("c1").await.unwrap().unwrap();
        assert_eq!(stored.status, chanforge_domain::ChannelStatus::Failed);

        let poisoned = worker.handle_message(&message(&msg_json, Some(3))).await;
        assert_eq!(poisoned, HandleOutcome::ack());
    }
}
