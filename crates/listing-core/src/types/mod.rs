//! Domain types shared across the workspace.

mod archive;
mod file;
mod record;
mod upload;

pub use archive::{ArchiveBatchResult, ArchiveDestination};
pub use file::{FileDisplayModel, FileIcon, RawFileRecord};
pub use record::RecordId;
pub use upload::{
    AuthorizationStatus, TransferReceipt, UploadAuthorization, UploadStatus, UploadTask,
    content_type_for,
};
