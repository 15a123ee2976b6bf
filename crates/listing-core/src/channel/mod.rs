//! Content-free invalidation signals over a pub/sub bus.
//!
//! Delivery is at-least-once: handlers must tolerate duplicate signals, and
//! the arrival of a message is the whole signal.

mod memory;

use std::fmt;
use std::sync::Arc;

pub use memory::MemoryChannel;
use uuid::Uuid;

use crate::{Error, Result};

/// Topic refresh signals are published on by default.
pub const DEFAULT_REFRESH_TOPIC: &str = "event.Refresh_Listing_Page__e";

/// Callback invoked once per received message.
pub type MessageHandler = Arc<dyn Fn() + Send + Sync>;

/// Callback invoked on transport-level failures.
pub type TransportErrorHandler = Arc<dyn Fn(&Error) + Send + Sync>;

/// Opaque handle for an active subscription.
///
/// Not `Clone`: releasing a subscription consumes its handle, so it can be
/// released at most once.
#[derive(PartialEq, Eq, Hash)]
pub struct SubscriptionHandle {
    id: Uuid,
    topic: String,
}

impl SubscriptionHandle {
    /// Creates a handle with a fresh identifier.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: topic.into(),
        }
    }

    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[inline]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .finish()
    }
}

/// Identifier of a registered transport-error handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorHandlerId(Uuid);

impl ErrorHandlerId {
    /// Creates a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ErrorHandlerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorHandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Pub/sub primitive delivering invalidation signals.
#[async_trait::async_trait]
pub trait InvalidationChannel: Send + Sync {
    /// Subscribes `on_message` to `topic`.
    async fn subscribe(&self, topic: &str, on_message: MessageHandler)
    -> Result<SubscriptionHandle>;

    /// Releases a subscription.
    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()>;

    /// Registers a handler for transport-level failures.
    ///
    /// Reporting an error never tears down existing subscriptions. The
    /// handler stays registered until removed with
    /// [`remove_transport_error`](Self::remove_transport_error).
    fn on_transport_error(&self, handler: TransportErrorHandler) -> ErrorHandlerId;

    /// Removes a transport-error handler.
    ///
    /// Returns `false` if no handler was registered under `id`.
    fn remove_transport_error(&self, id: ErrorHandlerId) -> bool;
}

#[async_trait::async_trait]
impl<T: InvalidationChannel + ?Sized> InvalidationChannel for Arc<T> {
    async fn subscribe(
        &self,
        topic: &str,
        on_message: MessageHandler,
    ) -> Result<SubscriptionHandle> {
        (**self).subscribe(topic, on_message).await
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> Result<()> {
        (**self).unsubscribe(handle).await
    }

    fn on_transport_error(&self, handler: TransportErrorHandler) -> ErrorHandlerId {
        (**self).on_transport_error(handler)
    }

    fn remove_transport_error(&self, id: ErrorHandlerId) -> bool {
        (**self).remove_transport_error(id)
    }
}
