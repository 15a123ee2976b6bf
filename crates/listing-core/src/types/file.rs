//! Backend file descriptors and their display-ready counterparts.

use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoStaticStr};

/// File descriptor as returned by the remote file source.
///
/// Field values are kept exactly as the backend supplied them. The three
/// classification flags stay string-encoded here and are only interpreted by
/// [`map_file`](crate::map_file).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawFileRecord {
    /// Display name of the file, including its extension.
    #[serde(default)]
    pub name: String,
    /// File extension without the leading dot, in any case.
    #[serde(default, alias = "FileType")]
    pub extension: Option<String>,
    /// Size of the file in bytes.
    #[serde(default, alias = "SizeBytes", deserialize_with = "size_bytes")]
    pub size: u64,
    /// Time of the last modification, if known.
    #[serde(default)]
    pub last_modified: Option<Timestamp>,
    /// Opaque storage key, unique within one record's file set.
    #[serde(default)]
    pub key: String,
    /// String-encoded floorplan flag.
    #[serde(default, alias = "Floorplan", deserialize_with = "string_flag")]
    pub is_floorplan: Option<String>,
    /// String-encoded statement-of-information flag.
    #[serde(
        default,
        alias = "StatementOfInformation",
        deserialize_with = "string_flag"
    )]
    pub is_statement_of_information: Option<String>,
    /// String-encoded portal availability flag.
    #[serde(default, alias = "PortalAvailable", deserialize_with = "string_flag")]
    pub is_portal_available: Option<String>,
}

impl RawFileRecord {
    /// Creates a record with the given name, extension and size.
    pub fn new(name: impl Into<String>, extension: impl Into<String>, size: u64) -> Self {
        let name = name.into();
        Self {
            key: name.clone(),
            name,
            extension: Some(extension.into()),
            size,
            ..Default::default()
        }
    }

    /// Sets the storage key.
    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the three classification flags from their wire values.
    #[must_use]
    pub fn with_flags(
        mut self,
        floorplan: impl Into<String>,
        statement_of_information: impl Into<String>,
        portal_available: impl Into<String>,
    ) -> Self {
        self.is_floorplan = Some(floorplan.into());
        self.is_statement_of_information = Some(statement_of_information.into());
        self.is_portal_available = Some(portal_available.into());
        self
    }

    /// Sets the last modification time.
    #[must_use]
    pub fn with_last_modified(mut self, last_modified: Timestamp) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

/// Icon classification derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumIter, IntoStaticStr, Serialize, Deserialize)]
pub enum FileIcon {
    /// jpg, jpeg, png, gif
    #[strum(serialize = "doctype:image")]
    #[serde(rename = "doctype:image")]
    Image,
    #[strum(serialize = "doctype:pdf")]
    #[serde(rename = "doctype:pdf")]
    Pdf,
    /// doc, docx
    #[strum(serialize = "doctype:word")]
    #[serde(rename = "doctype:word")]
    Word,
    /// xls, xlsx
    #[strum(serialize = "doctype:excel")]
    #[serde(rename = "doctype:excel")]
    Excel,
    /// ppt, pptx
    #[strum(serialize = "doctype:ppt")]
    #[serde(rename = "doctype:ppt")]
    Presentation,
    /// mp4, mov, avi, mkv
    #[strum(serialize = "doctype:video")]
    #[serde(rename = "doctype:video")]
    Video,
    /// Anything else, including a missing extension.
    #[strum(serialize = "doctype:attachment")]
    #[serde(rename = "doctype:attachment")]
    Attachment,
}

impl FileIcon {
    /// Category table, matched in order.
    const CATEGORIES: &[(FileIcon, &[&str])] = &[
        (FileIcon::Image, &["jpg", "jpeg", "png", "gif"]),
        (FileIcon::Pdf, &["pdf"]),
        (FileIcon::Word, &["doc", "docx"]),
        (FileIcon::Excel, &["xls", "xlsx"]),
        (FileIcon::Presentation, &["ppt", "pptx"]),
        (FileIcon::Video, &["mp4", "mov", "avi", "mkv"]),
    ];

    /// Classifies an extension, ignoring case.
    pub fn from_extension(extension: &str) -> Self {
        let extension = extension.to_ascii_lowercase();
        Self::CATEGORIES
            .iter()
            .find(|(_, extensions)| extensions.contains(&extension.as_str()))
            .map_or(Self::Attachment, |(icon, _)| *icon)
    }

    /// Returns the icon name understood by the presentation layer.
    #[inline]
    pub fn icon_name(self) -> &'static str {
        self.into()
    }
}

/// Display-ready model derived from one [`RawFileRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDisplayModel {
    pub name: String,
    pub extension: Option<String>,
    pub size_bytes: u64,
    pub last_modified: Option<Timestamp>,
    pub key: String,
    /// Icon classification.
    pub icon: FileIcon,
    /// Human-readable size, e.g. `"1.5 KB"`.
    pub formatted_size: String,
    pub is_floorplan: bool,
    pub is_statement_of_information: bool,
    pub is_portal_available: bool,
}

/// Accepts a size as a JSON number or a numeric string.
fn size_bytes<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Size {
        Number(u64),
        Text(String),
    }

    Ok(match Size::deserialize(deserializer)? {
        Size::Number(n) => n,
        Size::Text(text) => leading_digits(&text),
    })
}

/// Parses the leading decimal digits of `text`, yielding 0 if there are none.
fn leading_digits(text: &str) -> u64 {
    text.trim()
        .chars()
        .map_while(|c| c.to_digit(10))
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d)))
}

/// Accepts a flag as a string or a JSON boolean, keeping it string-encoded.
fn string_flag<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Text(String),
        Bool(bool),
    }

    Ok(Option::<Flag>::deserialize(deserializer)?.map(|flag| match flag {
        Flag::Text(text) => text,
        Flag::Bool(value) => value.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn icon_is_case_insensitive() {
        assert_eq!(FileIcon::from_extension("JPG"), FileIcon::Image);
        assert_eq!(FileIcon::from_extension("jpg"), FileIcon::Image);
        assert_eq!(FileIcon::from_extension("PptX"), FileIcon::Presentation);
    }

    #[test]
    fn unknown_extension_is_attachment() {
        assert_eq!(FileIcon::from_extension(""), FileIcon::Attachment);
        assert_eq!(FileIcon::from_extension("zip"), FileIcon::Attachment);
        assert_eq!(FileIcon::from_extension(".pdf"), FileIcon::Attachment);
    }

    #[test]
    fn icon_names() {
        let names: Vec<_> = FileIcon::iter().map(FileIcon::icon_name).collect();
        assert_eq!(
            names,
            [
                "doctype:image",
                "doctype:pdf",
                "doctype:word",
                "doctype:excel",
                "doctype:ppt",
                "doctype:video",
                "doctype:attachment",
            ]
        );
    }

    #[test]
    fn deserialize_wire_record() {
        let record: RawFileRecord = serde_json::from_str(
            r#"{
                "Name": "plan.PDF",
                "Extension": "PDF",
                "Size": "2048",
                "LastModified": "2024-05-01T10:00:00Z",
                "Key": "listings/a01/plan.PDF",
                "IsFloorplan": "true",
                "IsStatementOfInformation": "false"
            }"#,
        )
        .unwrap();

        assert_eq!(record.size, 2048);
        assert_eq!(record.extension.as_deref(), Some("PDF"));
        assert_eq!(record.is_floorplan.as_deref(), Some("true"));
        assert_eq!(record.is_portal_available, None);
        assert!(record.last_modified.is_some());
    }

    #[test]
    fn deserialize_secondary_store_flags() {
        let record: RawFileRecord = serde_json::from_str(
            r#"{"Name": "a.png", "Size": 10, "Floorplan": true, "PortalAvailable": "TRUE"}"#,
        )
        .unwrap();

        assert_eq!(record.size, 10);
        assert_eq!(record.is_floorplan.as_deref(), Some("true"));
        assert_eq!(record.is_portal_available.as_deref(), Some("TRUE"));
    }

    #[test]
    fn size_text_uses_leading_digits() {
        assert_eq!(leading_digits("512 bytes"), 512);
        assert_eq!(leading_digits("n/a"), 0);
        assert_eq!(leading_digits(""), 0);
    }
}
