use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::event::CallbackEvent;
use crate::middleware::BandwidthContext;

/// Receives one callback event together with the provisioning context of the
/// request that carried it.
///
/// Implemented for every `Fn(CallbackEvent, BandwidthContext) -> impl Future`
/// returning `anyhow::Result<()>`, so closures can be registered directly:
///
/// ```rust,no_run
/// use bandwidth_extra::webhook::CallbackHandler;
///
/// let handler = CallbackHandler::by_event_type().on("sms", |event, _ctx| async move {
///     tracing::info!(from = ?event.get("from"), "Incoming message");
///     Ok::<_, anyhow::Error>(())
/// });
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: CallbackEvent, context: BandwidthContext) -> anyhow::Result<()>;
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(CallbackEvent, BandwidthContext) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    async fn handle(&self, event: CallbackEvent, context: BandwidthContext) -> anyhow::Result<()> {
        (self)(event, context).await
    }
}

/// Handler configured for one callback path.
#[derive(Clone)]
pub enum CallbackHandler {
    /// Receives every event posted to the path.
    Single(Arc<dyn EventHandler>),
    /// Receives only events whose `eventType` is a key of the map.
    ByEventType(HashMap<String, Arc<dyn EventHandler>>),
}

impl CallbackHandler {
    pub fn single<F, Fut>(handler: F) -> Self
    where
        F: Fn(CallbackEvent, BandwidthContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        CallbackHandler::Single(Arc::new(handler))
    }

    /// Empty event-type map; add entries with [`CallbackHandler::on`].
    pub fn by_event_type() -> Self {
        CallbackHandler::ByEventType(HashMap::new())
    }

    /// Registers `handler` for `event_type`. A single handler is replaced by a map.
    pub fn on<F, Fut>(self, event_type: impl Into<String>, handler: F) -> Self
    where
        F: Fn(CallbackEvent, BandwidthContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_handler(event_type, handler)
    }

    /// Same as [`CallbackHandler::on`] for any [`EventHandler`] implementation.
    pub fn on_handler(
        self,
        event_type: impl Into<String>,
        handler: impl EventHandler + 'static,
    ) -> Self {
        let mut handlers = match self {
            CallbackHandler::ByEventType(handlers) => handlers,
            CallbackHandler::Single(_) => HashMap::new(),
        };
        handlers.insert(event_type.into(), Arc::new(handler));
        CallbackHandler::ByEventType(handlers)
    }

    /// Handler that should receive an event of the given type, if any.
    pub fn handler_for(&self, event_type: Option<&str>) -> Option<Arc<dyn EventHandler>> {
        match self {
            CallbackHandler::Single(handler) => Some(Arc::clone(handler)),
            CallbackHandler::ByEventType(handlers) => {
                event_type.and_then(|event_type| handlers.get(event_type).cloned())
            }
        }
    }
}

impl fmt::Debug for CallbackHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackHandler::Single(_) => f.write_str("CallbackHandler::Single"),
            CallbackHandler::ByEventType(handlers) => {
                let mut event_types: Vec<_> = handlers.keys().collect();
                event_types.sort();
                f.debug_tuple("CallbackHandler::ByEventType")
                    .field(&event_types)
                    .finish()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn noop(_event: CallbackEvent, _context: BandwidthContext) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn test_single_handler_matches_everything() {
        let handler = CallbackHandler::single(noop);
        assert!(handler.handler_for(Some("sms")).is_some());
        assert!(handler.handler_for(None).is_some());
    }

    #[test]
    fn test_map_matches_registered_types_only() {
        let handler = CallbackHandler::by_event_type()
            .on("answer", noop)
            .on("hangup", noop);

        assert!(handler.handler_for(Some("answer")).is_some());
        assert!(handler.handler_for(Some("hangup")).is_some());
        assert!(handler.handler_for(Some("speak")).is_none());
        assert!(handler.handler_for(None).is_none());
        assert_eq!(
            format!("{handler:?}"),
            r#"CallbackHandler::ByEventType(["answer", "hangup"])"#
        );
    }

    #[test]
    fn test_on_replaces_single_handler() {
        let handler = CallbackHandler::single(noop).on("sms", noop);
        assert!(matches!(handler, CallbackHandler::ByEventType(ref map) if map.len() == 1));
    }
}
