use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("channel creation failed: {0}")]
    CreateFailed(String),

    #[error("channel deletion failed: {0}")]
    DeleteFailed(String),

    #[error("ingest key rotation failed: {0}")]
    RotateFailed(String),

    #[error("transport error calling media engine: {0}")]
    Transport(String),

    #[error("media engine returned an unparseable response: {0}")]
    Decode(String),
}

impl EngineError {
    /// Errors that are worth retrying under the provisioner's retry envelope:
    /// transport failures and decode failures against a presumably-transient
    /// bad response. A clean 4xx-style rejection (`CreateFailed` et al) is not
    /// retried — the engine has already told us the call will not succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Transport(_) | EngineError::Decode(_))
    }
}
