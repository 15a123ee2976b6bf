//! Scripted in-memory collaborators for testing.
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! listing-core = { workspace = true, features = ["test-utils"] }
//! ```
//!
//! Every mock is cheap to clone; clones share their script and call log, so a
//! test can keep one clone for assertions and hand the other to a service.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use bytes::Bytes;

use super::{
    ArchivalProvider, AuthorizationProvider, BucketListProvider, ContentProvider,
    FileSourceProvider, TransferProvider,
};
use crate::notification::{Notification, NotificationSink};
use crate::types::{
    ArchiveBatchResult, ArchiveDestination, RawFileRecord, RecordId, TransferReceipt,
    UploadAuthorization,
};
use crate::{Error, ErrorKind, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// One scripted reply: an optional delay followed by a value or a failure.
#[derive(Debug, Clone)]
pub struct Scripted<T> {
    delay: Duration,
    outcome: std::result::Result<T, (ErrorKind, Option<String>)>,
}

impl<T> Scripted<T> {
    pub fn ok(value: T) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Ok(value),
        }
    }

    /// A failure carrying a service-supplied message.
    pub fn err(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err((kind, Some(message.into()))),
        }
    }

    /// A failure with no message at all.
    pub fn bare_err(kind: ErrorKind) -> Self {
        Self {
            delay: Duration::ZERO,
            outcome: Err((kind, None)),
        }
    }

    #[must_use]
    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    async fn resolve(self) -> Result<T> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.outcome.map_err(|(kind, message)| {
            let error = Error::new(kind);
            match message {
                Some(message) => error.with_message(message),
                None => error,
            }
        })
    }
}

#[derive(Debug, Default)]
struct MockFileSourceState {
    default_files: Vec<RawFileRecord>,
    per_record: HashMap<RecordId, Vec<RawFileRecord>>,
    script: VecDeque<Scripted<Vec<RawFileRecord>>>,
    requested: Vec<RecordId>,
}

/// File source answering from a script, then from fixed file sets.
#[derive(Debug, Clone, Default)]
pub struct MockFileSource {
    state: Arc<Mutex<MockFileSourceState>>,
}

impl MockFileSource {
    /// Creates a source returning `files` for every record.
    pub fn new(files: Vec<RawFileRecord>) -> Self {
        let source = Self::default();
        source.set_files(files);
        source
    }

    /// Replaces the files returned for every record without a specific set.
    pub fn set_files(&self, files: Vec<RawFileRecord>) {
        lock(&self.state).default_files = files;
    }

    /// Sets the files returned for one record.
    pub fn set_files_for(&self, record: &RecordId, files: Vec<RawFileRecord>) {
        lock(&self.state).per_record.insert(record.clone(), files);
    }

    /// Queues a reply consumed by the next call.
    pub fn push(&self, reply: Scripted<Vec<RawFileRecord>>) {
        lock(&self.state).script.push_back(reply);
    }

    /// Number of fetches made so far.
    pub fn calls(&self) -> usize {
        lock(&self.state).requested.len()
    }

    /// Records fetched so far, in call order.
    pub fn requested(&self) -> Vec<RecordId> {
        lock(&self.state).requested.clone()
    }
}

#[async_trait::async_trait]
impl FileSourceProvider for MockFileSource {
    async fn fetch_files(&self, record: &RecordId) -> Result<Vec<RawFileRecord>> {
        let reply = {
            let mut state = lock(&self.state);
            state.requested.push(record.clone());
            state.script.pop_front().unwrap_or_else(|| {
                let files = state
                    .per_record
                    .get(record)
                    .unwrap_or(&state.default_files)
                    .clone();
                Scripted::ok(files)
            })
        };
        reply.resolve().await
    }
}

#[derive(Debug, Default)]
struct MockArchivalState {
    script: VecDeque<Scripted<ArchiveBatchResult>>,
    requests: Vec<(RecordId, ArchiveDestination)>,
}

/// Archival service answering from a script, then with an empty response.
#[derive(Debug, Clone, Default)]
pub struct MockArchival {
    state: Arc<Mutex<MockArchivalState>>,
}

impl MockArchival {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a service whose next reply is `reply`.
    pub fn replying(reply: Scripted<ArchiveBatchResult>) -> Self {
        let archival = Self::default();
        archival.push(reply);
        archival
    }

    pub fn push(&self, reply: Scripted<ArchiveBatchResult>) {
        lock(&self.state).script.push_back(reply);
    }

    pub fn requests(&self) -> Vec<(RecordId, ArchiveDestination)> {
        lock(&self.state).requests.clone()
    }
}

#[async_trait::async_trait]
impl ArchivalProvider for MockArchival {
    async fn archive_all(
        &self,
        record: &RecordId,
        destination: ArchiveDestination,
    ) -> Result<ArchiveBatchResult> {
        let reply = {
            let mut state = lock(&self.state);
            state.requests.push((record.clone(), destination));
            state
                .script
                .pop_front()
                .unwrap_or_else(|| Scripted::ok(ArchiveBatchResult::empty()))
        };
        reply.resolve().await
    }
}

/// Authorization service returning a fixed reply.
#[derive(Debug, Clone)]
pub struct MockAuthorization {
    reply: Arc<Mutex<Scripted<Vec<UploadAuthorization>>>>,
    calls: Arc<AtomicUsize>,
}

impl MockAuthorization {
    pub fn new(authorizations: Vec<UploadAuthorization>) -> Self {
        Self::replying(Scripted::ok(authorizations))
    }

    pub fn replying(reply: Scripted<Vec<UploadAuthorization>>) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthorizationProvider for MockAuthorization {
    async fn get_authorizations(&self, _record: &RecordId) -> Result<Vec<UploadAuthorization>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = lock(&self.reply).clone();
        reply.resolve().await
    }
}

/// Content provider returning the file name's bytes unless told to fail.
#[derive(Debug, Clone, Default)]
pub struct MockContent {
    failing: Arc<Mutex<HashMap<String, String>>>,
}

impl MockContent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes lookups for `file_name` fail with `message`.
    #[must_use]
    pub fn failing(self, file_name: impl Into<String>, message: impl Into<String>) -> Self {
        lock(&self.failing).insert(file_name.into(), message.into());
        self
    }
}

#[async_trait::async_trait]
impl ContentProvider for MockContent {
    async fn fetch_content(
        &self,
        _record: &RecordId,
        authorization: &UploadAuthorization,
    ) -> Result<Bytes> {
        match lock(&self.failing).get(&authorization.file_name) {
            Some(message) => Err(Error::external_error().with_message(message.clone())),
            None => Ok(Bytes::from(authorization.file_name.clone().into_bytes())),
        }
    }
}

/// Scripted outcome of one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Acknowledged with the given status text.
    Accept(String),
    /// Completed but rejected with the given status text.
    Reject(String),
    /// The attempt fails with a network error carrying this cause.
    Throw(String),
}

/// One recorded transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub destination: String,
    pub payload: Bytes,
    pub content_type: String,
}

#[derive(Debug)]
struct MockTransferState {
    outcomes: HashMap<String, TransferOutcome>,
    delays: HashMap<String, Duration>,
    puts: Vec<RecordedPut>,
}

/// Transfer client scripted per destination; accepts anything unscripted.
#[derive(Debug, Clone)]
pub struct MockTransfer {
    state: Arc<Mutex<MockTransferState>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl Default for MockTransfer {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockTransferState {
                outcomes: HashMap::new(),
                delays: HashMap::new(),
                puts: Vec::new(),
            })),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_outcome(self, destination: impl Into<String>, outcome: TransferOutcome) -> Self {
        lock(&self.state).outcomes.insert(destination.into(), outcome);
        self
    }

    /// Delays transfers to `destination` before they resolve.
    #[must_use]
    pub fn with_delay(self, destination: impl Into<String>, delay: Duration) -> Self {
        lock(&self.state).delays.insert(destination.into(), delay);
        self
    }

    /// Transfers started so far, in start order.
    pub fn puts(&self) -> Vec<RecordedPut> {
        lock(&self.state).puts.clone()
    }

    /// Highest number of transfers observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl TransferProvider for MockTransfer {
    async fn put_object(
        &self,
        destination: &str,
        payload: Bytes,
        content_type: &str,
    ) -> Result<TransferReceipt> {
        let (outcome, delay) = {
            let mut state = lock(&self.state);
            state.puts.push(RecordedPut {
                destination: destination.to_owned(),
                payload,
                content_type: content_type.to_owned(),
            });
            (
                state
                    .outcomes
                    .get(destination)
                    .cloned()
                    .unwrap_or_else(|| TransferOutcome::Accept("OK".to_owned())),
                state.delays.get(destination).copied(),
            )
        };

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        } else {
            tokio::task::yield_now().await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match outcome {
            TransferOutcome::Accept(detail) => Ok(TransferReceipt::accepted(detail)),
            TransferOutcome::Reject(detail) => Ok(TransferReceipt::rejected(detail)),
            TransferOutcome::Throw(cause) => Err(Error::network_error().with_message(cause)),
        }
    }
}

/// Bucket catalog returning a fixed reply.
#[derive(Debug, Clone)]
pub struct MockBucketList {
    reply: Arc<Mutex<Scripted<Vec<String>>>>,
}

impl MockBucketList {
    pub fn new<I, S>(buckets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::replying(Scripted::ok(buckets.into_iter().map(Into::into).collect()))
    }

    pub fn replying(reply: Scripted<Vec<String>>) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply)),
        }
    }
}

#[async_trait::async_trait]
impl BucketListProvider for MockBucketList {
    async fn list_buckets(&self) -> Result<Vec<String>> {
        let reply = lock(&self.reply).clone();
        reply.resolve().await
    }
}

/// Sink that keeps every notification for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    received: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        lock(&self.received).clone()
    }

    /// Returns the only notification received, if exactly one was.
    pub fn single(&self) -> Option<Notification> {
        let received = lock(&self.received);
        match received.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        }
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        lock(&self.received).push(notification);
    }
}
