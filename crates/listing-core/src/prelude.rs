//! Convenient re-exports for downstream crates.

pub use crate::channel::{InvalidationChannel, MessageHandler, SubscriptionHandle};
pub use crate::notification::{Notification, NotificationSink, Severity};
pub use crate::service::{
    ArchivalProvider, AuthorizationProvider, BucketListProvider, ContentProvider,
    FileSourceProvider, TransferProvider,
};
pub use crate::types::{
    ArchiveBatchResult, ArchiveDestination, FileDisplayModel, RawFileRecord, RecordId,
    TransferReceipt, UploadAuthorization, UploadStatus, UploadTask,
};
pub use crate::{Error, ErrorKind, Result};
