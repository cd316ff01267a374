use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to publish playback-ready notification: {0}")]
    PublishFailed(String),

    #[error("failed to emit alert: {0}")]
    AlertFailed(String),

    #[error("transport error: {0}")]
    Transport(String),
}
