//! Per-file upload authorizations, transfer receipts and task state.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, IntoStaticStr};

/// Readiness reported by the authorization service for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthorizationStatus {
    /// A destination was issued and the file can be transferred.
    Ready,
    /// The service declined to authorize this file.
    #[default]
    NotReady,
}

impl From<String> for AuthorizationStatus {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<&str> for AuthorizationStatus {
    fn from(value: &str) -> Self {
        if value == "Ready" {
            Self::Ready
        } else {
            Self::NotReady
        }
    }
}

impl From<AuthorizationStatus> for String {
    fn from(value: AuthorizationStatus) -> Self {
        match value {
            AuthorizationStatus::Ready => "Ready".to_owned(),
            AuthorizationStatus::NotReady => "NotReady".to_owned(),
        }
    }
}

/// Short-lived destination issued for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "UploadAuthorizationWire")]
pub struct UploadAuthorization {
    pub file_name: String,
    /// Presigned URL or object key the file may be written to.
    pub destination: String,
    pub status: AuthorizationStatus,
    /// Status text the service sent for a file it did not authorize.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,
    /// Key of the file's current content, if the service knows it.
    pub source_key: Option<String>,
    /// Optional service message, typically explaining a refusal.
    pub message: Option<String>,
}

/// Authorization as sent by the service, with its raw status text.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadAuthorizationWire {
    file_name: String,
    #[serde(default, alias = "uploadUrl")]
    destination: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    source_key: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl From<UploadAuthorizationWire> for UploadAuthorization {
    fn from(wire: UploadAuthorizationWire) -> Self {
        let raw = wire.status.map(|text| text.trim().to_owned());
        let status = raw
            .as_deref()
            .map_or(AuthorizationStatus::NotReady, AuthorizationStatus::from);
        let status_detail = match status {
            AuthorizationStatus::Ready => None,
            AuthorizationStatus::NotReady => raw.filter(|text| !text.is_empty()),
        };

        Self {
            file_name: wire.file_name,
            destination: wire.destination,
            status,
            status_detail,
            source_key: wire.source_key,
            message: wire.message,
        }
    }
}

impl UploadAuthorization {
    /// Creates a ready authorization.
    pub fn ready(file_name: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            destination: destination.into(),
            status: AuthorizationStatus::Ready,
            status_detail: None,
            source_key: None,
            message: None,
        }
    }

    /// Creates an authorization the service declined.
    pub fn not_ready(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            destination: String::new(),
            status: AuthorizationStatus::NotReady,
            status_detail: None,
            source_key: None,
            message: None,
        }
    }

    /// Sets the source content key.
    #[must_use]
    pub fn with_source_key(mut self, key: impl Into<String>) -> Self {
        self.source_key = Some(key.into());
        self
    }

    /// Sets the service message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.status == AuthorizationStatus::Ready
    }

    /// Explanation for a refusal: the service message, else its status text.
    pub fn refusal_reason(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .or(self.status_detail.as_deref())
    }

    /// Returns the content type derived from the file name's extension.
    pub fn content_type(&self) -> &'static str {
        content_type_for(&self.file_name)
    }
}

/// Maps a file name to a MIME type by its extension.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Acknowledgment of a completed transfer attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferReceipt {
    /// Whether the destination accepted the object.
    pub ok: bool,
    /// Destination-supplied status text.
    pub status_detail: String,
}

impl TransferReceipt {
    pub fn accepted(status_detail: impl Into<String>) -> Self {
        Self {
            ok: true,
            status_detail: status_detail.into(),
        }
    }

    pub fn rejected(status_detail: impl Into<String>) -> Self {
        Self {
            ok: false,
            status_detail: status_detail.into(),
        }
    }
}

/// Lifecycle state of one [`UploadTask`].
///
/// A task starts `Pending`, becomes `Ready` or `NotReady` once its
/// authorization is known, and a ready task ends in `Uploaded`, `Failed` or
/// `Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, IntoStaticStr, Serialize, Deserialize)]
pub enum UploadStatus {
    /// Awaiting its authorization.
    Pending,
    Ready,
    /// Recorded as received; no transfer was attempted.
    NotReady,
    Uploaded,
    /// The destination completed the request but rejected it.
    Failed,
    /// The transfer attempt threw.
    Error,
}

impl UploadStatus {
    /// Returns true for states that end a task's lifecycle.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::NotReady | Self::Uploaded | Self::Failed | Self::Error
        )
    }
}

/// Per-file unit tracked during a direct upload batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTask {
    /// Position in the authorization list.
    pub index: usize,
    pub file_name: String,
    pub destination: String,
    pub status: UploadStatus,
    /// Diagnostic for terminal non-success states.
    pub message: Option<String>,
}

impl UploadTask {
    /// Creates a task still awaiting its authorization.
    pub fn pending(index: usize, file_name: impl Into<String>) -> Self {
        Self {
            index,
            file_name: file_name.into(),
            destination: String::new(),
            status: UploadStatus::Pending,
            message: None,
        }
    }

    /// Creates the task for the authorization at `index`.
    pub fn from_authorization(index: usize, authorization: &UploadAuthorization) -> Self {
        let mut task = Self::pending(index, authorization.file_name.as_str());
        task.authorize(authorization);
        task
    }

    /// Applies the authorization, moving a pending task to `Ready` or
    /// `NotReady`.
    ///
    /// A declined task keeps the service's explanation as its message.
    pub fn authorize(&mut self, authorization: &UploadAuthorization) {
        if self.status != UploadStatus::Pending {
            return;
        }

        self.destination = authorization.destination.clone();
        match authorization.status {
            AuthorizationStatus::Ready => self.status = UploadStatus::Ready,
            AuthorizationStatus::NotReady => {
                self.status = UploadStatus::NotReady;
                self.message = authorization.refusal_reason().map(str::to_owned);
            }
        }
    }

    /// Moves the task into a terminal state.
    pub fn finish(&mut self, status: UploadStatus, message: impl Into<String>) {
        self.status = status;
        self.message = Some(message.into());
    }

    #[inline]
    pub fn is_uploaded(&self) -> bool {
        self.status == UploadStatus::Uploaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_from_wire() {
        let auth: UploadAuthorization = serde_json::from_str(
            r#"{"fileName": "a.pdf", "uploadUrl": "https://bucket/a.pdf?sig=1", "status": "Ready"}"#,
        )
        .unwrap();
        assert!(auth.is_ready());
        assert_eq!(auth.destination, "https://bucket/a.pdf?sig=1");

        let auth: UploadAuthorization =
            serde_json::from_str(r#"{"fileName": "b.pdf", "status": "Missing content"}"#).unwrap();
        assert_eq!(auth.status, AuthorizationStatus::NotReady);
        assert_eq!(auth.status_detail.as_deref(), Some("Missing content"));

        let auth: UploadAuthorization = serde_json::from_str(r#"{"fileName": "c.pdf"}"#).unwrap();
        assert_eq!(auth.status, AuthorizationStatus::NotReady);
        assert_eq!(auth.status_detail, None);
    }

    #[test]
    fn declined_status_text_becomes_task_message() {
        let auth: UploadAuthorization =
            serde_json::from_str(r#"{"fileName": "b.pdf", "status": "Missing content"}"#).unwrap();
        let task = UploadTask::from_authorization(1, &auth);
        assert_eq!(task.status, UploadStatus::NotReady);
        assert_eq!(task.message.as_deref(), Some("Missing content"));

        let auth: UploadAuthorization = serde_json::from_str(
            r#"{"fileName": "b.pdf", "status": "Pending", "message": "Locked"}"#,
        )
        .unwrap();
        let task = UploadTask::from_authorization(1, &auth);
        assert_eq!(task.message.as_deref(), Some("Locked"));
    }

    #[test]
    fn pending_task_becomes_ready() {
        let mut task = UploadTask::pending(0, "a.pdf");
        assert_eq!(task.status, UploadStatus::Pending);
        assert!(!task.status.is_terminal());

        task.authorize(&UploadAuthorization::ready("a.pdf", "https://bucket/a"));
        assert_eq!(task.status, UploadStatus::Ready);
        assert_eq!(task.destination, "https://bucket/a");
        assert_eq!(task.message, None);
        assert!(!task.status.is_terminal());

        // Only a pending task takes an authorization.
        task.authorize(&UploadAuthorization::not_ready("a.pdf"));
        assert_eq!(task.status, UploadStatus::Ready);
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("archive.tar.gz"), "application/octet-stream");
        assert_eq!(content_type_for("README"), "application/octet-stream");
        assert_eq!(
            UploadAuthorization::ready("deck.pptx", "k").content_type(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
    }

    #[test]
    fn not_ready_task_keeps_service_message() {
        let auth = UploadAuthorization::not_ready("c.doc").with_message("No content version");
        let task = UploadTask::from_authorization(2, &auth);
        assert_eq!(task.status, UploadStatus::NotReady);
        assert_eq!(task.message.as_deref(), Some("No content version"));
        assert!(task.status.is_terminal());
    }
}
