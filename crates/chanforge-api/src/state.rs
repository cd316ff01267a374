use std::sync::Arc;

use chanforge_config::ProvisionerConfig;
use chanforge_engine::MediaEngineClient;
use chanforge_notify::AlertingSink;
use chanforge_provisioner::ChannelProvisioner;
use chanforge_store::MetadataRepository;

#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn MetadataRepository>,
    pub engine: Arc<dyn MediaEngineClient>,
    pub alerter: Arc<dyn AlertingSink>,
    pub provisioner: Arc<ChannelProvisioner>,
    pub config: Arc<ProvisionerConfig>,
    pub auth_token: Arc<String>,
}
