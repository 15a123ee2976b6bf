//! In-process invalidation channel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use super::{
    ErrorHandlerId, InvalidationChannel, MessageHandler, SubscriptionHandle, TransportErrorHandler,
};
use crate::{Error, Result, TRACING_TARGET_CHANNEL};

#[derive(Default)]
struct MemoryChannelState {
    subscriptions: HashMap<Uuid, (String, MessageHandler)>,
    error_handlers: Vec<(ErrorHandlerId, TransportErrorHandler)>,
    refusal: Option<String>,
}

/// Invalidation channel that delivers published signals synchronously to
/// every subscriber of the topic.
///
/// Cheap to clone; clones share subscriptions.
#[derive(Clone, Default)]
pub struct MemoryChannel {
    state: Arc<Mutex<MemoryChannelState>>,
    released: Arc<AtomicUsize>,
}

impl std::fmt::Debug for MemoryChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryChannel")
            .field("active", &self.active_subscriptions())
            .field("released", &self.released_subscriptions())
            .finish()
    }
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryChannelState> {
        // A handler panicking never leaves the maps half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Delivers one signal to every subscriber of `topic`.
    ///
    /// Returns the number of handlers invoked.
    pub fn publish(&self, topic: &str) -> usize {
        let handlers: Vec<MessageHandler> = self
            .state()
            .subscriptions
            .values()
            .filter(|(subscribed, _)| subscribed == topic)
            .map(|(_, handler)| Arc::clone(handler))
            .collect();

        tracing::trace!(
            target: TRACING_TARGET_CHANNEL,
            topic,
            subscribers = handlers.len(),
            "Publishing invalidation signal"
        );

        for handler in &handlers {
            handler();
        }
        handlers.len()
    }

    /// Reports a transport failure to every registered error handler.
    pub fn fail(&self, error: &Error) {
        let handlers: Vec<TransportErrorHandler> = self
            .state()
            .error_handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in &handlers {
            handler(error);
        }
    }

    /// Number of subscriptions currently held.
    pub fn active_subscriptions(&self) -> usize {
        self.state().subscriptions.len()
    }

    /// Makes every later `subscribe` fail with `message`, or accepts
    /// subscriptions again when `None`.
    pub fn refuse_subscriptions(&self, message: Option<&str>) {
        self.state().refusal = message.map(str::to_owned);
    }

    /// Number of transport-error handlers currently registered.
    pub fn error_handlers(&self) -> usize {
        self.state().error_handlers.len()
    }

    /// Number of subscriptions released so far.
    pub fn released_subscriptions(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl InvalidationChannel for MemoryChannel {
    async fn subscribe(
        &self,
        topic: &str,
        on_message: MessageHandler,
    ) -> Result<SubscriptionHandle> {
        let handle = SubscriptionHandle::new(topic);
        {
            let mut state = self.state();
            if let Some(message) = &state.refusal {
                return Err(Error::network_error()
                    .with_message(message.clone())
                    .with_context(topic.to_owned()));
            }
            state
                .subscriptions
                .insert(handle.id(), (topic.to_owned(), on_message));
        }

        tracing::debug!(
            target: TRACING_TARGET_CHANNEL,
            topic,
            subscription_id = %handle.id(),
            "Subscribed"
        );
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        if self.state().subscriptions.remove(&handle.id()).is_none() {
            return Err(Error::subscription()
                .with_message("unknown subscription")
                .with_context(handle.id().to_string()));
        }

        self.released.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            target: TRACING_TARGET_CHANNEL,
            topic = handle.topic(),
            subscription_id = %handle.id(),
            "Unsubscribed"
        );
        Ok(())
    }

    fn on_transport_error(&self, handler: TransportErrorHandler) -> ErrorHandlerId {
        let id = ErrorHandlerId::new();
        self.state().error_handlers.push((id, handler));
        id
    }

    fn remove_transport_error(&self, id: ErrorHandlerId) -> bool {
        let mut state = self.state();
        let before = state.error_handlers.len();
        state.error_handlers.retain(|(registered, _)| *registered != id);
        state.error_handlers.len() != before
    }
}
