use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("store error listing failed records: {0}")]
    Store(#[from] chanforge_store::RepositoryError),
}
