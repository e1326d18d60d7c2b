pub mod client;
pub mod config;
pub mod core;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod provision;
pub mod routes;
pub mod state;
pub mod utils;
pub mod webhook;

// Re-export commonly used items for convenience
pub use client::{BandwidthApi, BandwidthClient, InMemoryBandwidthApi};
pub use config::ServerConfig;
pub use core::cache::{CacheConfig, CacheStore};
pub use errors::app_error::{AppError, AppResult};
pub use errors::provision_error::{ProvisionError, ProvisionResult};
pub use middleware::{
    BandwidthContext, BandwidthLayer, ProvisioningOptions, Provisioner, provisioning_middleware,
};
pub use state::AppState;
pub use webhook::{CallbackEvent, CallbackHandler};
