//! Bandwidth provisioning middleware.
//!
//! [`Provisioner`] holds the shared logic; [`provisioning_middleware`] plugs it
//! into axum and [`BandwidthLayer`] into any tower stack.

pub mod context;
pub mod layer;
pub mod options;
pub mod provisioner;
pub mod provisioning;

pub use context::{BandwidthContext, EndpointResolver};
pub use layer::{BandwidthLayer, BandwidthService};
pub use options::{
    Credentials, DEFAULT_API_TIMEOUT, DEFAULT_MAX_CALLBACK_BODY, ProvisioningOptions, SipOptions,
};
pub use provisioner::{Prepared, Provisioner};
pub use provisioning::provisioning_middleware;
