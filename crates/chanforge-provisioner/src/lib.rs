pub mod error;
pub mod provisioner;
pub mod retry;

pub use error::ProvisionError;
pub use provisioner::{compute_cache_key, default_manifest_path, ChannelProvisioner};
pub use retry::{retry_with_backoff, CancellationToken, RetryOutcome};
