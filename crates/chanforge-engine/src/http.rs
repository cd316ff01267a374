use async_trait::async_trait;
use chanforge_domain::{ChannelProvisioningRequest, ChannelProvisioningResult};
use serde_json::Value;
use tracing::debug;

use crate::client::MediaEngineClient;
use crate::error::EngineError;

/// [`MediaEngineClient`] backed by the real media engine's HTTP API.
///
/// The engine is expected to expose:
///   POST   {base_url}/channels           -> ChannelProvisioningResult
///   DELETE {base_url}/channels/{id}
///   POST   {base_url}/channels/{id}/rotate-ingest-key
#[derive(Clone)]
pub struct HttpMediaEngineClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpMediaEngineClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl MediaEngineClient for HttpMediaEngineClient {
    async fn create_channel(
        &self,
        request: &ChannelProvisioningRequest,
    ) -> Result<ChannelProvisioningResult, EngineError> {
        debug!(content_id = %request.content_id, "calling media engine create_channel");

        let resp = self
            .client
            .post(self.url("/channels"))
            .json(request)
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body: Value = resp.json().await.unwrap_or_default();
            let message = body["message"].as_str().unwrap_or("unknown error").to_string();
            return Err(if status.is_server_error() {
                EngineError::Transport(format!("{status}: {message}"))
            } else {
                EngineError::CreateFailed(format!("{status}: {message}"))
            });
        }

        resp.json::<ChannelProvisioningResult>()
            .await
            .map_err(|e| EngineError::Decode(e.to_string()))
    }

    async fn delete_channel(&self, channel_id: &str) -> Result<(), EngineError> {
        let resp = self
            .client
            .delete(self.url(&format!("/channels/{channel_id}")))
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(EngineError::DeleteFailed(resp.status().to_string()));
        }
        Ok(())
    }

    async fn rotate_ingest_key(&self, channel_id: &str) -> Result<(), EngineError> {
        let resp = self
            .client
            .post(self.url(&format!("/channels/{channel_id}/rotate-ingest-key")))
            .send()
            .await
            .map_err(|e| EngineError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(EngineError::RotateFailed(resp.status().to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chanforge_domain::ContentType;
    use std::collections::BTreeMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChannelProvisioningRequest {
        ChannelProvisioningRequest {
            content_id: "c1".to_string(),
            classification: ContentType::Reel,
            source_uri: "s3://bucket/a".to_string(),
            ingest_pool: "ingest-reels".to_string(),
            egress_pool: "egress-reels".to_string(),
            abr_ladder: vec![],
            output_bucket: "bucket".to_string(),
            manifest_path: "manifests/c1/master.m3u8".to_string(),
            cache_key: "deadbeef".to_string(),
            drm: None,
            availability_window: None,
            geo_restrictions: None,
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn create_channel_parses_success_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "channelId": "chan-c1",
                "originEndpoint": "https://origin.example/c1",
                "profileHash": "deadbeef",
            })))
            .mount(&server)
            .await;

        let client = HttpMediaEngineClient::new(server.uri());
        let result = client.create_channel(&request()).await.unwrap();
        assert_eq!(result.channel_id, "chan-c1");
    }

    #[tokio::test]
    async fn create_channel_maps_server_error_to_transport() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/channels"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "message": "overloaded",
            })))
            .mount(&server)
            .await;

        let client = HttpMediaEngineClient::new(server.uri());
        let err = client.create_channel(&request()).await.unwrap_err();
        assert!(matches!(err, EngineError::Transport(_)));
    }
}
