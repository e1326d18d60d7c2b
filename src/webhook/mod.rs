//! Delivery of Bandwidth callback events to user handlers.

pub mod dispatch;
pub mod event;
pub mod handler;

pub use dispatch::{DispatchError, DispatchOutcome, dispatch};
pub use event::CallbackEvent;
pub use handler::{CallbackHandler, EventHandler};
