//! Fan-out of connection events to transport-error handlers.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_nats::Event;
use listing_core::channel::{ErrorHandlerId, TransportErrorHandler};

use crate::{Error, TRACING_TARGET_CONNECTION};

/// Shared list of transport-error handlers fed by the client's event callback.
///
/// Cheap to clone; clones share the handler list.
#[derive(Clone, Default)]
pub struct TransportErrors {
    handlers: Arc<Mutex<Vec<(ErrorHandlerId, TransportErrorHandler)>>>,
}

impl fmt::Debug for TransportErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportErrors")
            .field("handlers", &self.handlers().len())
            .finish()
    }
}

impl TransportErrors {
    fn handlers(&self) -> MutexGuard<'_, Vec<(ErrorHandlerId, TransportErrorHandler)>> {
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a handler invoked for every reported failure.
    pub fn register(&self, handler: TransportErrorHandler) -> ErrorHandlerId {
        let id = ErrorHandlerId::new();
        self.handlers().push((id, handler));
        id
    }

    /// Removes a handler, returning whether it was registered.
    pub fn remove(&self, id: ErrorHandlerId) -> bool {
        let mut handlers = self.handlers();
        let before = handlers.len();
        handlers.retain(|(registered, _)| *registered != id);
        handlers.len() != before
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivers `error` to every registered handler.
    pub fn report(&self, error: Error) {
        let error = listing_core::Error::from(error);
        let handlers: Vec<TransportErrorHandler> = self
            .handlers()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in &handlers {
            handler(&error);
        }
    }

    /// Handles one connection event, reporting the ones that degrade delivery.
    pub fn on_event(&self, event: Event) {
        match event {
            Event::Connected => tracing::info!(
                target: TRACING_TARGET_CONNECTION,
                "Connected to NATS"
            ),
            Event::Disconnected
            | Event::Closed
            | Event::SlowConsumer(_)
            | Event::ServerError(_)
            | Event::ClientError(_) => {
                tracing::warn!(
                    target: TRACING_TARGET_CONNECTION,
                    event = %event,
                    "NATS connection degraded"
                );
                self.report(Error::Transport {
                    event: event.to_string(),
                });
            }
            other => tracing::debug!(
                target: TRACING_TARGET_CONNECTION,
                event = %other,
                "NATS connection event"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use listing_core::ErrorKind;

    use super::*;

    #[test]
    fn degraded_events_are_reported() {
        let errors = TransportErrors::default();
        let seen = Arc::new(AtomicUsize::new(0));
        let id = errors.register(Arc::new({
            let seen = Arc::clone(&seen);
            move |error: &listing_core::Error| {
                assert_eq!(error.kind(), ErrorKind::Subscription);
                seen.fetch_add(1, Ordering::SeqCst);
            }
        }));

        errors.on_event(Event::Connected);
        errors.on_event(Event::Disconnected);
        errors.on_event(Event::SlowConsumer(7));

        assert_eq!(seen.load(Ordering::SeqCst), 2);

        assert!(errors.remove(id));
        assert!(errors.is_empty());
        errors.on_event(Event::Disconnected);
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn removing_unknown_handler() {
        let errors = TransportErrors::default();
        errors.register(Arc::new(|_: &listing_core::Error| {}));
        assert!(!errors.remove(ErrorHandlerId::new()));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn report_without_handlers() {
        TransportErrors::default().report(Error::Transport {
            event: "disconnected".to_owned(),
        });
    }
}
