//! Reactive file store: the synchronized file list of one record.
//!
//! The store performs an initial fetch on [`attach`](ReactiveFileStore::attach),
//! subscribes to the refresh topic and refetches on every signal. Each
//! completed fetch is mapped through [`map_files`] and published as a new
//! [`FileListSnapshot`] on a `watch` channel:
//!
//! ```rust,ignore
//! let store = ReactiveFileStore::new(source, channel, SyncConfig::default());
//! let mut changes = store.subscribe();
//! store.attach(record).await?;
//!
//! while changes.changed().await.is_ok() {
//!     render(&changes.borrow());
//! }
//! ```
//!
//! A failed fetch never replaces the list: the previous files stay in place
//! and the failure is exposed through [`FileListSnapshot::error`].

mod snapshot;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use listing_core::channel::{
    ErrorHandlerId, InvalidationChannel, MessageHandler, SubscriptionHandle,
    TransportErrorHandler,
};
use listing_core::service::FileSourceService;
use listing_core::types::{RawFileRecord, RecordId};
use listing_core::{Error, ErrorKind, Result, map_files};
pub use snapshot::{FILE_COLUMNS, FileColumn, FileListSnapshot, StoreState};
use strum::{AsRefStr, Display};
use tokio::runtime::Handle;
use tokio::sync::watch;

use crate::TRACING_TARGET_STORE;
use crate::config::{RefreshOrdering, SyncConfig};

/// What started a refetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RefreshTrigger {
    Initial,
    RecordChanged,
    Invalidation,
    Manual,
}

/// Channel registrations held while attached.
struct Attachment {
    subscription: SubscriptionHandle,
    error_handler: ErrorHandlerId,
}

struct StoreInner {
    source: FileSourceService,
    channel: Arc<dyn InvalidationChannel>,
    config: SyncConfig,
    state: watch::Sender<FileListSnapshot>,
    attachment: Mutex<Option<Attachment>>,
    sequence: AtomicU64,
    detached: AtomicBool,
}

/// Owns the current, synchronized file list for one record.
pub struct ReactiveFileStore {
    inner: Arc<StoreInner>,
}

impl fmt::Debug for ReactiveFileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.inner.state.borrow();
        f.debug_struct("ReactiveFileStore")
            .field("state", &snapshot.state)
            .field("record", &snapshot.record)
            .field("files", &snapshot.files.len())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl ReactiveFileStore {
    /// Creates an unattached store.
    pub fn new<C>(source: FileSourceService, channel: C, config: SyncConfig) -> Self
    where
        C: InvalidationChannel + 'static,
    {
        Self::with_channel(source, Arc::new(channel), config)
    }

    /// Creates an unattached store over a shared channel.
    pub fn with_channel(
        source: FileSourceService,
        channel: Arc<dyn InvalidationChannel>,
        config: SyncConfig,
    ) -> Self {
        let (state, _) = watch::channel(FileListSnapshot::default());
        Self {
            inner: Arc::new(StoreInner {
                source,
                channel,
                config,
                state,
                attachment: Mutex::new(None),
                sequence: AtomicU64::new(0),
                detached: AtomicBool::new(false),
            }),
        }
    }

    /// Binds the store to `record`, fetches its files and subscribes to the
    /// refresh topic.
    ///
    /// A failed initial fetch is surfaced through the snapshot, not here.
    /// Returns an error if the store was detached, is already attached, or
    /// the subscription could not be opened. In every case
    /// [`detach`](Self::detach) remains safe to call.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_STORE, fields(record = %record))]
    pub async fn attach(&self, record: RecordId) -> Result<()> {
        let inner = &self.inner;
        if inner.is_detached() {
            return Err(Error::detached().with_message("store is detached"));
        }
        if inner.attachment().is_some() {
            return Err(Error::invalid_input().with_message("store is already attached"));
        }

        inner.bind(record);
        if let Err(error) = inner.refetch(RefreshTrigger::Initial).await {
            tracing::debug!(
                target: TRACING_TARGET_STORE,
                error = %error,
                "Initial fetch failed, subscribing anyway"
            );
        }

        let handle = match inner
            .channel
            .subscribe(&inner.config.refresh_topic, inner.message_handler())
            .await
        {
            Ok(handle) => handle,
            Err(error) => {
                let error = error.with_kind(ErrorKind::Subscription);
                tracing::warn!(
                    target: TRACING_TARGET_STORE,
                    topic = %inner.config.refresh_topic,
                    error = %error,
                    "Failed to subscribe to refresh topic"
                );
                inner.set_channel_error(&error);
                return Err(error);
            }
        };

        // Detached while subscribing: release right away.
        if inner.is_detached() {
            inner.channel.unsubscribe(handle).await?;
            return Err(Error::detached().with_message("store is detached"));
        }

        let error_handler = inner
            .channel
            .on_transport_error(inner.transport_error_handler());
        *inner.attachment() = Some(Attachment {
            subscription: handle,
            error_handler,
        });

        tracing::info!(
            target: TRACING_TARGET_STORE,
            topic = %inner.config.refresh_topic,
            "Store attached"
        );
        Ok(())
    }

    /// Rebinds the store to another record and refetches.
    ///
    /// The list of the previous record is cleared. Binding the current record
    /// again does nothing.
    pub async fn set_record(&self, record: RecordId) -> Result<()> {
        let inner = &self.inner;
        if inner.is_detached() {
            return Err(Error::detached().with_message("store is detached"));
        }
        if inner.state.borrow().record.as_ref() == Some(&record) {
            return Ok(());
        }

        inner.bind(record);
        inner.refetch(RefreshTrigger::RecordChanged).await
    }

    /// Refetches the current record's files.
    ///
    /// Returns the fetch error, which is also exposed through the snapshot.
    pub async fn refresh(&self) -> Result<()> {
        self.inner.refetch(RefreshTrigger::Manual).await
    }

    /// Releases the subscription and the transport-error handler, and moves
    /// the store to `Detached`.
    ///
    /// Idempotent: later calls find no subscription and return `Ok`.
    #[tracing::instrument(skip_all, target = TRACING_TARGET_STORE)]
    pub async fn detach(&self) -> Result<()> {
        let inner = &self.inner;
        inner.detached.store(true, Ordering::SeqCst);
        let attachment = inner.attachment().take();

        inner.state.send_if_modified(|snapshot| {
            let changed = snapshot.state != StoreState::Detached;
            snapshot.state = StoreState::Detached;
            changed
        });

        let Some(Attachment {
            subscription: handle,
            error_handler,
        }) = attachment
        else {
            return Ok(());
        };

        inner.channel.remove_transport_error(error_handler);
        tracing::info!(
            target: TRACING_TARGET_STORE,
            subscription_id = %handle.id(),
            "Detaching store"
        );
        inner
            .channel
            .unsubscribe(handle)
            .await
            .map_err(|error| error.with_kind(ErrorKind::Subscription))
    }

    /// Returns a receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<FileListSnapshot> {
        self.inner.state.subscribe()
    }

    /// Returns the current state.
    pub fn snapshot(&self) -> FileListSnapshot {
        self.inner.state.borrow().clone()
    }

    #[inline]
    pub fn is_attached(&self) -> bool {
        self.inner.attachment().is_some()
    }

    pub fn config(&self) -> &SyncConfig {
        &self.inner.config
    }
}

impl StoreInner {
    fn attachment(&self) -> MutexGuard<'_, Option<Attachment>> {
        self.attachment
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    #[inline]
    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }

    fn bind(&self, record: RecordId) {
        self.state.send_modify(|snapshot| {
            snapshot.record = Some(record);
            snapshot.files = Arc::from([]);
            snapshot.error = None;
        });
    }

    fn set_channel_error(&self, error: &Error) {
        let error = Arc::new(Error::subscription().with_message(error.user_message()));
        self.state.send_modify(|snapshot| snapshot.channel_error = Some(error));
    }

    /// Fetches the bound record and applies the result.
    async fn refetch(&self, trigger: RefreshTrigger) -> Result<()> {
        if self.is_detached() {
            return Err(Error::detached().with_message("store is detached"));
        }
        let record = self.state.borrow().record.clone();
        let Some(record) = record else {
            return Err(Error::invalid_input().with_message("recordId is missing"));
        };

        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.send_modify(|snapshot| {
            snapshot.pending += 1;
            snapshot.settle();
        });

        tracing::debug!(
            target: TRACING_TARGET_STORE,
            record = %record,
            sequence,
            trigger = %trigger,
            "Refetching files"
        );

        let result = self
            .source
            .fetch_files(&record)
            .await
            .map_err(|error| error.with_kind(ErrorKind::Fetch));
        self.apply(sequence, &record, result)
    }

    /// Applies one fetch result, unless it is stale.
    fn apply(
        &self,
        sequence: u64,
        record: &RecordId,
        result: Result<Vec<RawFileRecord>>,
    ) -> Result<()> {
        let ordering = self.config.refresh_ordering;
        let detached = self.is_detached();
        let result = result.map(|raw| map_files(&raw)).map_err(Arc::new);
        let mut stale = None;

        self.state.send_modify(|snapshot| {
            snapshot.pending = snapshot.pending.saturating_sub(1);

            stale = if detached {
                Some("store detached")
            } else if snapshot.record.as_ref() != Some(record) {
                Some("record changed")
            } else if ordering == RefreshOrdering::Sequenced
                && sequence < snapshot.applied_sequence
            {
                Some("newer result already applied")
            } else {
                None
            };

            if stale.is_none() {
                snapshot.applied_sequence = sequence;
                snapshot.revision += 1;
                match &result {
                    Ok(files) => {
                        snapshot.files = Arc::from(files.as_slice());
                        snapshot.error = None;
                    }
                    Err(error) => snapshot.error = Some(Arc::clone(error)),
                }
            }

            if detached {
                snapshot.state = StoreState::Detached;
            } else {
                snapshot.settle();
            }
        });

        match (&result, stale) {
            (_, Some(reason)) => tracing::debug!(
                target: TRACING_TARGET_STORE,
                record = %record,
                sequence,
                reason,
                "Discarded stale fetch result"
            ),
            (Ok(files), None) => tracing::debug!(
                target: TRACING_TARGET_STORE,
                record = %record,
                sequence,
                files = files.len(),
                "Applied fetch result"
            ),
            (Err(error), None) => tracing::warn!(
                target: TRACING_TARGET_STORE,
                record = %record,
                sequence,
                error = %error,
                "Fetch failed, keeping previous files"
            ),
        }

        result.map(|_| ()).map_err(|error| {
            Error::fetch()
                .with_message(error.user_message())
                .with_context(record.to_string())
        })
    }

    /// Handler spawning one refetch per received signal.
    fn message_handler(self: &Arc<Self>) -> MessageHandler {
        let weak: Weak<Self> = Arc::downgrade(self);
        let runtime = Handle::current();

        Arc::new(move || {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.is_detached() {
                return;
            }

            runtime.spawn(async move {
                // The error is already logged and exposed through the snapshot.
                let _ = inner.refetch(RefreshTrigger::Invalidation).await;
            });
        })
    }

    /// Handler recording transport failures without tearing anything down.
    fn transport_error_handler(self: &Arc<Self>) -> TransportErrorHandler {
        let weak: Weak<Self> = Arc::downgrade(self);

        Arc::new(move |error: &Error| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            if inner.is_detached() {
                return;
            }

            tracing::warn!(
                target: TRACING_TARGET_STORE,
                error = %error,
                "Invalidation channel transport error"
            );
            inner.set_channel_error(error);
        })
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let attachment = self
            .attachment
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        let Some(Attachment {
            subscription: handle,
            error_handler,
        }) = attachment
        else {
            return;
        };

        self.channel.remove_transport_error(error_handler);

        match Handle::try_current() {
            Ok(runtime) => {
                tracing::debug!(
                    target: TRACING_TARGET_STORE,
                    subscription_id = %handle.id(),
                    "Store dropped while attached, releasing subscription"
                );
                let channel = Arc::clone(&self.channel);
                runtime.spawn(async move {
                    if let Err(error) = channel.unsubscribe(handle).await {
                        tracing::warn!(
                            target: TRACING_TARGET_STORE,
                            error = %error,
                            "Failed to release subscription on drop"
                        );
                    }
                });
            }
            Err(_) => tracing::warn!(
                target: TRACING_TARGET_STORE,
                subscription_id = %handle.id(),
                "Store dropped outside a runtime, subscription leaked"
            ),
        }
    }
}
