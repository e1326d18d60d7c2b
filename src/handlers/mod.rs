//! HTTP request handlers
//!
//! - `api` - Health check and provisioning info endpoints
//! - `callbacks` - Logging handlers for the Bandwidth callbacks
//! - `sip` - SIP account creation

pub mod api;
pub mod callbacks;
pub mod sip;
