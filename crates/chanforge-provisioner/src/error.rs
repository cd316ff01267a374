use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("store error: {0}")]
    Store(#[from] chanforge_store::RepositoryError),

    #[error("engine error after exhausting retries: {0}")]
    Engine(#[from] chanforge_engine::EngineError),

    #[error("provisioning attempt was cancelled")]
    Cancelled,
}
