//! Callback handlers registered by the server.
//!
//! They only log. Applications embedding the middleware register their own.

use axum::http::StatusCode;
use tracing::{debug, info};

use crate::middleware::BandwidthContext;
use crate::webhook::{CallbackEvent, CallbackHandler};

/// Logs every message event (`sms`, `mms`...).
pub fn message_callback() -> CallbackHandler {
    CallbackHandler::single(log_message)
}

/// Logs the call lifecycle events; other call events are left unhandled.
pub fn call_callback() -> CallbackHandler {
    CallbackHandler::by_event_type()
        .on("incomingcall", log_call)
        .on("answer", log_call)
        .on("hangup", log_call)
}

async fn log_message(event: CallbackEvent, context: BandwidthContext) -> anyhow::Result<()> {
    info!(
        application_id = %context.application_id,
        event_type = ?event.event_type(),
        from = ?event.get("from"),
        to = ?event.get("to"),
        "Message callback received"
    );
    Ok(())
}

async fn log_call(event: CallbackEvent, context: BandwidthContext) -> anyhow::Result<()> {
    info!(
        application_id = %context.application_id,
        event_type = ?event.event_type(),
        call_id = ?event.get("callId"),
        "Call callback received"
    );
    Ok(())
}

/// Reached when the middleware did not consume a callback post (no handler
/// for the path, or a body that is not JSON).
pub async fn unhandled_callback() -> StatusCode {
    debug!("Callback request not consumed by a handler");
    StatusCode::OK
}
