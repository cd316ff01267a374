mod raw;
mod preset;
mod loader;
pub mod error;

pub use error::ConfigError;
pub use loader::{load, load_from_str, ProvisionerConfig};
pub use preset::parse_abr_preset;
