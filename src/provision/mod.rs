//! Get-or-create resolvers for Bandwidth resources.
//!
//! Each resolver scans one bounded page of existing resources, returns the
//! first exact name match and otherwise creates the resource. Nothing is
//! updated or deleted once it exists.

pub mod application;
pub mod endpoint;
pub mod phone_number;

pub use application::{
    ApplicationOptions, ApplicationSpec, CALL_CALLBACK_PATH, MESSAGE_CALLBACK_PATH,
    get_or_create_application,
};
pub use endpoint::{SipAccount, get_or_create_domain, get_or_create_endpoint};
pub use phone_number::{PhoneNumberOptions, get_or_create_phone_number};
