use async_trait::async_trait;
use chanforge_domain::ChannelMetadata;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::error::NotifyError;

/// Wire payload for the playback-ready notification (spec §4.1/§4.4): a
/// snapshot of the now-ready `ChannelMetadata` plus a playback URL and
/// expiry, published once per successful provisioning pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackReadyNotification {
    pub metadata: ChannelMetadata,
    pub manifest_url: String,
    pub expires_at: DateTime<Utc>,
}

/// Collaborator contract for emitting playback-ready events to downstream
/// consumers. A publish failure is treated by the worker identically to an
/// engine terminal failure, even though the underlying record is already
/// `ready`.
#[async_trait]
pub trait NotificationPublisher: Send + Sync + 'static {
    async fn publish_playback_ready(
        &self,
        notification: &PlaybackReadyNotification,
    ) -> Result<(), NotifyError>;
}

/// Default/local-dev implementation: logs the notification instead of
/// delivering it anywhere.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotificationPublisher;

#[async_trait]
impl NotificationPublisher for LoggingNotificationPublisher {
    async fn publish_playback_ready(
        &self,
        notification: &PlaybackReadyNotification,
    ) -> Result<(), NotifyError> {
        info!(
            content_id = %notification.metadata.content_id,
            manifest_url = %notification.manifest_url,
            expires_at = %notification.expires_at,
            "playback-ready notification"
        );
        Ok(())
    }
}

/// POSTs the notification JSON body to a configured webhook URL.
#[derive(Clone)]
pub struct HttpNotificationPublisher {
    webhook_url: String,
    client: reqwest::Client,
}

impl HttpNotificationPublisher {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl NotificationPublisher for HttpNotificationPublisher {
    async fn publish_playback_ready(
        &self,
        notification: &PlaybackReadyNotification,
    ) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(notification)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::PublishFailed(resp.status().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanforge_domain::{Assignable, ChannelStatus, ContentType};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample() -> PlaybackReadyNotification {
        PlaybackReadyNotification {
            metadata: ChannelMetadata {
                content_id: "c1".to_string(),
                channel_id: Assignable::assigned("chan-c1"),
                classification: ContentType::Reel,
                manifest_path: "manifests/c1/master.m3u8".to_string(),
                playback_url: "https://cdn.example/c1".to_string(),
                origin_endpoint: Assignable::assigned("https://origin.example/c1"),
                cache_key: "deadbeef".to_string(),
                checksum: "s1".to_string(),
                status: ChannelStatus::Ready,
                retries: 0,
                source_asset_uri: "s3://bucket/a".to_string(),
                last_provisioned_at: Utc::now(),
                drm: None,
                ingest_region: "us".to_string(),
                availability_window: None,
                geo_restrictions: None,
            },
            manifest_url: "https://cdn.example/c1".to_string(),
            expires_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn logging_publisher_always_succeeds() {
        let publisher = LoggingNotificationPublisher;
        assert!(publisher.publish_playback_ready(&sample()).await.is_ok());
    }

    #[tokio::test]
    async fn http_publisher_posts_to_webhook() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let publisher = HttpNotificationPublisher::new(format!("{}/webhook", server.uri()));
        assert!(publisher.publish_playback_ready(&sample()).await.is_ok());
    }

    #[tokio::test]
    async fn http_publisher_maps_non_2xx_to_publish_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/webhook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let publisher = HttpNotificationPublisher::new(format!("{}/webhook", server.uri()));
        let err = publisher.publish_playback_ready(&sample()).await.unwrap_err();
        assert!(matches!(err, NotifyError::PublishFailed(_)));
    }
}
