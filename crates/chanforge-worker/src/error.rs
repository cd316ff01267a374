use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("permanent decode error: {0}")]
    Decode(#[from] chanforge_domain::DomainError),

    #[error("provisioning error: {0}")]
    Provision(#[from] chanforge_provisioner::ProvisionError),

    #[error("notification error: {0}")]
    Notify(#[from] chanforge_notify::NotifyError),
}

impl WorkerError {
    /// Best-known `contentId` this error can be attributed to, for alerting.
    /// `None` means the event never decoded far enough to have one.
    pub fn is_decode_error(&self) -> bool {
        matches!(self, WorkerError::Decode(_))
    }
}
