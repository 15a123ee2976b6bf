#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for the reactive file store.
pub const TRACING_TARGET_STORE: &str = "listing_runtime::store";

/// Tracing target for bulk archive requests.
pub const TRACING_TARGET_ARCHIVE: &str = "listing_runtime::archive";

/// Tracing target for direct uploads.
pub const TRACING_TARGET_UPLOAD: &str = "listing_runtime::upload";

/// Tracing target for the bucket catalog.
pub const TRACING_TARGET_CATALOG: &str = "listing_runtime::catalog";

mod archive;
mod busy;
mod catalog;
mod config;
mod store;
mod upload;

pub use archive::{ARCHIVING_LABEL, BulkArchiveOrchestrator};
pub use busy::{BusyFlag, BusyGuard};
pub use catalog::BucketCatalog;
pub use config::{RefreshOrdering, SyncConfig, UploadConfig};
pub use store::{
    FILE_COLUMNS, FileColumn, FileListSnapshot, ReactiveFileStore, RefreshTrigger, StoreState,
};
pub use upload::{DirectUploadOrchestrator, UPLOAD_SUCCESSFUL, UploadBatch};
