//! Remote collaborators of the synchronization and archival flows.
//!
//! Each collaborator is a provider trait plus a cloneable service wrapper
//! that adds structured logging and timing around any implementation:
//!
//! - [`FileSourceService`] wraps [`FileSourceProvider`]
//! - [`ArchivalService`] wraps [`ArchivalProvider`]
//! - [`AuthorizationService`] wraps [`AuthorizationProvider`]
//! - [`ContentService`] wraps [`ContentProvider`]
//! - [`TransferService`] wraps [`TransferProvider`]
//! - [`BucketListService`] wraps [`BucketListProvider`]
//!
//! HTTP implementations live in `listing-reqwest`, object-store
//! implementations in `listing-object`.

mod archival;
mod bucket;
mod file_source;
#[cfg(feature = "test-utils")]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
pub mod mock;
mod upload;

pub use archival::{ArchivalProvider, ArchivalService};
pub use bucket::{BucketListProvider, BucketListService};
pub use file_source::{FileSourceProvider, FileSourceService};
pub use upload::{
    AuthorizationProvider, AuthorizationService, ContentProvider, ContentService,
    TransferProvider, TransferService,
};

/// Tracing target for collaborator calls.
pub const TRACING_TARGET: &str = "listing_core::service";
