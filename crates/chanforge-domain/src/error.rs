use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("unsupported event type: expected `{expected}`, got `{actual}`")]
    UnsupportedEventType { expected: &'static str, actual: String },

    #[error("invalid content id: {0}")]
    InvalidContentId(String),

    #[error("record in ready state must have an assigned channelId and originEndpoint")]
    ReadyWithoutAssignment,
}
