//! Immutable view of a store's state, published on every change.

use std::sync::Arc;

use listing_core::Error;
use listing_core::types::{FileDisplayModel, RecordId};
use serde::Serialize;
use strum::{AsRefStr, Display, IntoStaticStr};

/// Lifecycle of a [`ReactiveFileStore`](super::ReactiveFileStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[derive(AsRefStr, Display, IntoStaticStr, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StoreState {
    #[default]
    Uninitialized,
    /// At least one refetch is in flight.
    Loading,
    Loaded,
    /// The last applied fetch failed; files hold the previous successful list.
    Errored,
    /// Terminal.
    Detached,
}

/// Column shown when rendering the file list as a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileColumn {
    pub label: &'static str,
    /// Name of the [`FileDisplayModel`] field rendered in this column.
    pub field: &'static str,
}

/// Default table layout for the file list.
pub const FILE_COLUMNS: &[FileColumn] = &[
    FileColumn { label: "File Name", field: "name" },
    FileColumn { label: "Type", field: "extension" },
    FileColumn { label: "Size", field: "formattedSize" },
    FileColumn { label: "Floorplan", field: "isFloorplan" },
    FileColumn { label: "Statement of Info", field: "isStatementOfInformation" },
    FileColumn { label: "Portal Available", field: "isPortalAvailable" },
];

/// Point-in-time view of a store.
///
/// Cheap to clone: the file list and errors are shared.
#[derive(Debug, Clone, Default)]
pub struct FileListSnapshot {
    pub state: StoreState,
    /// Record the store is bound to.
    pub record: Option<RecordId>,
    pub files: Arc<[FileDisplayModel]>,
    /// Failure of the last applied fetch.
    pub error: Option<Arc<Error>>,
    /// Last transport failure reported by the invalidation channel.
    pub channel_error: Option<Arc<Error>>,
    /// Incremented every time a fetch result is applied.
    pub revision: u64,
    /// Sequence number of the refetch whose result was applied last.
    pub applied_sequence: u64,
    /// Refetches started but not yet completed.
    pub pending: usize,
}

impl FileListSnapshot {
    #[inline]
    pub fn has_files(&self) -> bool {
        !self.files.is_empty()
    }

    /// Text to render for the current fetch error, if any.
    pub fn error_text(&self) -> Option<String> {
        self.error.as_ref().map(|error| {
            error
                .message
                .clone()
                .unwrap_or_else(|| error.to_string())
        })
    }

    /// Keys of the current files, in display order.
    pub fn keys(&self) -> Vec<&str> {
        self.files.iter().map(|file| file.key.as_str()).collect()
    }

    /// Recomputes the lifecycle state from the pending count and last error.
    pub(super) fn settle(&mut self) {
        self.state = if self.pending > 0 {
            StoreState::Loading
        } else if self.error.is_some() {
            StoreState::Errored
        } else {
            StoreState::Loaded
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_text_prefers_service_message() {
        let snapshot = FileListSnapshot {
            error: Some(Arc::new(Error::fetch().with_message("Listing is locked"))),
            ..Default::default()
        };
        assert_eq!(snapshot.error_text().as_deref(), Some("Listing is locked"));

        let snapshot = FileListSnapshot {
            error: Some(Arc::new(Error::fetch())),
            ..Default::default()
        };
        assert_eq!(snapshot.error_text().as_deref(), Some("fetch"));
    }

    #[test]
    fn settle() {
        let mut snapshot = FileListSnapshot {
            pending: 1,
            ..Default::default()
        };
        snapshot.settle();
        assert_eq!(snapshot.state, StoreState::Loading);

        snapshot.pending = 0;
        snapshot.settle();
        assert_eq!(snapshot.state, StoreState::Loaded);

        snapshot.error = Some(Arc::new(Error::fetch()));
        snapshot.settle();
        assert_eq!(snapshot.state, StoreState::Errored);
        assert!(!snapshot.has_files());
    }

    #[test]
    fn six_columns() {
        let labels: Vec<_> = FILE_COLUMNS.iter().map(|c| c.label).collect();
        assert_eq!(
            labels,
            [
                "File Name",
                "Type",
                "Size",
                "Floorplan",
                "Statement of Info",
                "Portal Available"
            ]
        );
    }
}
