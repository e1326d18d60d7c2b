use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use super::event::CallbackEvent;
use super::handler::CallbackHandler;
use crate::middleware::BandwidthContext;

/// Failure of a single handler invocation.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Callback handler failed: {0:#}")]
    HandlerFailed(anyhow::Error),

    #[error("Callback handler panicked: {0}")]
    HandlerPanicked(String),
}

impl DispatchError {
    /// Handler failures never reach the caller of the webhook, so they are
    /// only visible here.
    pub fn log_with_context(&self, path: &str, event_type: Option<&str>) {
        match self {
            DispatchError::HandlerFailed(error) => {
                warn!(
                    path = %path,
                    event_type = ?event_type,
                    error = %format!("{error:#}"),
                    "Callback handler returned an error"
                );
            }
            DispatchError::HandlerPanicked(message) => {
                warn!(
                    path = %path,
                    event_type = ?event_type,
                    panic = %message,
                    "Callback handler panicked"
                );
            }
        }
    }
}

/// Result of delivering one event.
#[derive(Debug)]
pub enum DispatchOutcome {
    Handled,
    /// No handler is registered for the event type.
    Unhandled,
    Failed(DispatchError),
}

impl DispatchOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, DispatchOutcome::Handled)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs the handler matching `event` and reports what happened.
///
/// Errors and panics of the handler are contained and logged here; the
/// webhook response does not depend on them.
pub async fn dispatch(
    handler: &CallbackHandler,
    event: CallbackEvent,
    context: BandwidthContext,
    path: &str,
) -> DispatchOutcome {
    let event_type = event.event_type().map(str::to_string);

    let Some(target) = handler.handler_for(event_type.as_deref()) else {
        debug!(path = %path, event_type = ?event_type, "No handler for callback event");
        return DispatchOutcome::Unhandled;
    };

    let result = AssertUnwindSafe(target.handle(event, context))
        .catch_unwind()
        .await;

    let error = match result {
        Ok(Ok(())) => {
            debug!(path = %path, event_type = ?event_type, "Callback event handled");
            return DispatchOutcome::Handled;
        }
        Ok(Err(error)) => DispatchError::HandlerFailed(error),
        Err(payload) => DispatchError::HandlerPanicked(panic_message(payload.as_ref())),
    };

    error.log_with_context(path, event_type.as_deref());
    DispatchOutcome::Failed(error)
}
