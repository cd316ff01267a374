use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chanforge_domain::{ChannelProvisioningRequest, ChannelProvisioningResult};

use crate::client::MediaEngineClient;
use crate::error::EngineError;

/// In-process stand-in for the media engine, used by worker/provisioner tests
/// and by `chanforge-cli`'s `--dry-run` mode.
///
/// `fail_n_times` lets a test force the first N calls to `create_channel` to
/// return a retryable transport error before succeeding, exercising the
/// provisioner's retry envelope and the worker's poison-after-exhaustion path.
pub struct StubMediaEngineClient {
    fail_n_times: AtomicU32,
    calls: Mutex<Vec<String>>,
}

impl StubMediaEngineClient {
    pub fn new() -> Self {
        Self {
            fail_n_times: AtomicU32::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Build a stub whose `create_channel` fails with a retryable transport
    /// error `n` times before succeeding.
    pub fn failing_n_times(n: u32) -> Self {
        Self {
            fail_n_times: AtomicU32::new(n),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `contentId`s passed to `create_channel`, in call order.
    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for StubMediaEngineClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaEngineClient for StubMediaEngineClient {
    async fn create_channel(
        &self,
        request: &ChannelProvisioningRequest,
    ) -> Result<ChannelProvisioningResult, EngineError> {
        self.calls.lock().unwrap().push(request.content_id.clone());

        let remaining = self.fail_n_times.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_n_times.fetch_sub(1, Ordering::SeqCst);
            return Err(EngineError::Transport("stub: simulated transient failure".into()));
        }

        Ok(ChannelProvisioningResult {
            channel_id: format!("chan-{}", request.content_id),
            manifest_path: None,
            origin_endpoint: format!("https://origin.example/{}", request.content_id),
            playback_base_url: None,
            profile_hash: request.cache_key.clone(),
        })
    }

    async fn delete_channel(&self, _channel_id: &str) -> Result<(), EngineError> {
        Ok(())
    }

    async fn rotate_ingest_key(&self, _channel_id: &str) -> Result<(), EngineError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn request(content_id: &str) -> ChannelProvisioningRequest {
        ChannelProvisioningRequest {
            content_id: content_id.to_string(),
            classification: chanforge_domain::ContentType::Reel,
            source_uri: "s3://bucket/a".to_string(),
            ingest_pool: "ingest-reels".to_string(),
            egress_pool: "egress-reels".to_string(),
            abr_ladder: vec![],
            output_bucket: "bucket".to_string(),
            manifest_path: format!("manifests/{content_id}/master.m3u8"),
            cache_key: "deadbeef".to_string(),
            drm: None,
            availability_window: None,
            geo_restrictions: None,
            metadata: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_by_default() {
        let stub = StubMediaEngineClient::new();
        let result = stub.create_channel(&request("c1")).await.unwrap();
        assert_eq!(result.channel_id, "chan-c1");
    }

    #[tokio::test]
    async fn fails_n_times_then_succeeds() {
        let stub = StubMediaEngineClient::failing_n_times(2);
        assert!(stub.create_channel(&request("c1")).await.is_err());
        assert!(stub.create_channel(&request("c1")).await.is_err());
        assert!(stub.create_channel(&request("c1")).await.is_ok());
        assert_eq!(stub.recorded_calls().len(), 3);
    }
}
