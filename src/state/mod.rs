use std::sync::Arc;

use crate::config::ServerConfig;
use crate::errors::ProvisionResult;
use crate::handlers::callbacks;
use crate::middleware::Provisioner;

/// Application state that can be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    /// Provisioning core shared by the middleware layers
    pub provisioner: Arc<Provisioner>,
}

impl AppState {
    /// Builds the provisioner against the Bandwidth API described by `config`,
    /// with the server's logging callbacks.
    pub async fn new(config: ServerConfig) -> ProvisionResult<Arc<Self>> {
        let options = config
            .provisioning_options()
            .with_message_callback(callbacks::message_callback())
            .with_call_callback(callbacks::call_callback());
        let provisioner = Provisioner::new(options).await?;
        Ok(Self::with_provisioner(config, Arc::new(provisioner)))
    }

    /// State around an existing provisioner, e.g. one over an in-memory API.
    pub fn with_provisioner(config: ServerConfig, provisioner: Arc<Provisioner>) -> Arc<Self> {
        Arc::new(Self {
            config,
            provisioner,
        })
    }
}
