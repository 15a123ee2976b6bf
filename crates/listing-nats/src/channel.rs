//! Invalidation channel over core NATS subjects.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use async_nats::Subscriber;
use futures::StreamExt;
use listing_core::channel::{
    ErrorHandlerId, InvalidationChannel, MessageHandler, SubscriptionHandle,
    TransportErrorHandler,
};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{Error, NatsClient, TRACING_TARGET_CHANNEL};

/// Reader task of one subscription and the signal that stops it.
struct ActiveSubscription {
    stop: oneshot::Sender<()>,
    reader: JoinHandle<Result<(), Error>>,
}

/// [`InvalidationChannel`] backed by core NATS subscriptions.
///
/// Each subscription owns a reader task that turns every message received on
/// the subject into one handler call. Message payloads are ignored.
#[derive(Clone)]
pub struct NatsChannel {
    client: NatsClient,
    active: Arc<Mutex<HashMap<Uuid, ActiveSubscription>>>,
}

impl fmt::Debug for NatsChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NatsChannel")
            .field("active", &self.active().len())
            .finish_non_exhaustive()
    }
}

impl NatsChannel {
    pub fn new(client: NatsClient) -> Self {
        Self {
            client,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn active(&self) -> MutexGuard<'_, HashMap<Uuid, ActiveSubscription>> {
        self.active
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of subscriptions currently held.
    pub fn active_subscriptions(&self) -> usize {
        self.active().len()
    }

    /// Publishes one empty refresh signal on `topic`.
    #[tracing::instrument(skip(self), target = TRACING_TARGET_CHANNEL)]
    pub async fn publish(&self, topic: &str) -> listing_core::Result<()> {
        let client = self.client.client();
        client
            .publish(topic.to_owned(), Default::default())
            .await
            .map_err(|e| Error::Connection(Box::new(e)))?;
        client
            .flush()
            .await
            .map_err(|e| Error::Connection(Box::new(e)))?;
        Ok(())
    }
}

/// Delivers every message of `subscriber` until told to stop, then
/// unsubscribes.
async fn read_signals(
    topic: String,
    mut subscriber: Subscriber,
    on_message: MessageHandler,
    mut stop: oneshot::Receiver<()>,
) -> Result<(), Error> {
    loop {
        tokio::select! {
            _ = &mut stop => break,
            message = subscriber.next() => match message {
                Some(message) => {
                    tracing::trace!(
                        target: TRACING_TARGET_CHANNEL,
                        topic = %topic,
                        payload_bytes = message.payload.len(),
                        "Received invalidation signal"
                    );
                    on_message();
                }
                None => {
                    tracing::warn!(
                        target: TRACING_TARGET_CHANNEL,
                        topic = %topic,
                        "Subscription closed by the server"
                    );
                    return Ok(());
                }
            },
        }
    }

    subscriber
        .unsubscribe()
        .await
        .map_err(|e| Error::unsubscribe(&topic, e))
}

#[async_trait::async_trait]
impl InvalidationChannel for NatsChannel {
    async fn subscribe(
        &self,
        topic: &str,
        on_message: MessageHandler,
    ) -> listing_core::Result<SubscriptionHandle> {
        let subscriber = self
            .client
            .client()
            .subscribe(topic.to_owned())
            .await
            .map_err(|e| Error::subscribe(topic, e))?;

        let handle = SubscriptionHandle::new(topic);
        let (stop, stopped) = oneshot::channel();
        let reader = tokio::spawn(read_signals(
            topic.to_owned(),
            subscriber,
            on_message,
            stopped,
        ));
        self.active()
            .insert(handle.id(), ActiveSubscription { stop, reader });

        tracing::debug!(
            target: TRACING_TARGET_CHANNEL,
            topic,
            subscription_id = %handle.id(),
            "Subscribed to invalidation topic"
        );
        Ok(handle)
    }

    async fn unsubscribe(&self, handle: SubscriptionHandle) -> listing_core::Result<()> {
        let removed = self.active().remove(&handle.id());
        let Some(active) = removed else {
            return Err(Error::UnknownSubscription {
                subject: handle.topic().to_owned(),
            }
            .into());
        };

        // The reader may already have exited on a closed subscription.
        let _ = active.stop.send(());
        let result = match active.reader.await {
            Ok(result) => result,
            Err(join_error) => Err(Error::unsubscribe(handle.topic(), join_error)),
        };

        tracing::debug!(
            target: TRACING_TARGET_CHANNEL,
            topic = handle.topic(),
            subscription_id = %handle.id(),
            released = result.is_ok(),
            "Released invalidation subscription"
        );
        result.map_err(Into::into)
    }

    fn on_transport_error(&self, handler: TransportErrorHandler) -> ErrorHandlerId {
        self.client.transport_errors().register(handler)
    }

    fn remove_transport_error(&self, id: ErrorHandlerId) -> bool {
        self.client.transport_errors().remove(id)
    }
}
