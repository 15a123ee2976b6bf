//! Pure transform from backend file records to display models.

use crate::types::{FileDisplayModel, FileIcon, RawFileRecord};

const KIB: u128 = 1024;
const MIB: u128 = 1024 * 1024;

/// Maps one backend record to its display model.
///
/// Total and deterministic: every input yields a model.
pub fn map_file(raw: &RawFileRecord) -> FileDisplayModel {
    let icon = raw
        .extension
        .as_deref()
        .map_or(FileIcon::Attachment, FileIcon::from_extension);

    FileDisplayModel {
        name: raw.name.clone(),
        extension: raw.extension.clone(),
        size_bytes: raw.size,
        last_modified: raw.last_modified,
        key: raw.key.clone(),
        icon,
        formatted_size: format_size(raw.size),
        is_floorplan: is_true(raw.is_floorplan.as_deref()),
        is_statement_of_information: is_true(raw.is_statement_of_information.as_deref()),
        is_portal_available: is_true(raw.is_portal_available.as_deref()),
    }
}

/// Maps a list of records, preserving order and cardinality.
pub fn map_files(raw: &[RawFileRecord]) -> Vec<FileDisplayModel> {
    raw.iter().map(map_file).collect()
}

/// Formats a byte count as `"N B"`, `"N.N KB"` or `"N.N MB"`.
///
/// Fractional values are rounded half-up to one decimal place.
pub fn format_size(bytes: u64) -> String {
    let bytes = u128::from(bytes);
    if bytes < KIB {
        return format!("{bytes} B");
    }

    let (unit, suffix) = if bytes < MIB { (KIB, "KB") } else { (MIB, "MB") };
    let tenths = (bytes * 10 + unit / 2) / unit;
    format!("{}.{} {suffix}", tenths / 10, tenths % 10)
}

/// Only the exact string `"true"` is truthy.
#[inline]
fn is_true(flag: Option<&str>) -> bool {
    flag == Some("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_boundaries() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.0 KB");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(1_048_575), "1024.0 KB");
        assert_eq!(format_size(1_048_576), "1.0 MB");
        assert_eq!(format_size(5 * 1024 * 1024 * 1024), "5120.0 MB");
    }

    #[test]
    fn size_rounds_half_up() {
        // 1280 / 1024 = 1.25
        assert_eq!(format_size(1280), "1.3 KB");
        // 1126 / 1024 = 1.0996...
        assert_eq!(format_size(1126), "1.1 KB");
        assert_eq!(format_size(u64::MAX), "17592186044416.0 MB");
    }

    #[test]
    fn flags_require_exact_true() {
        let raw = RawFileRecord::new("a.pdf", "pdf", 10).with_flags("true", "True", "yes");
        let model = map_file(&raw);
        assert!(model.is_floorplan);
        assert!(!model.is_statement_of_information);
        assert!(!model.is_portal_available);

        let model = map_file(&RawFileRecord::new("b.pdf", "pdf", 10));
        assert!(!model.is_floorplan);
    }

    #[test]
    fn missing_extension_is_attachment() {
        let raw = RawFileRecord {
            name: "README".into(),
            ..Default::default()
        };
        assert_eq!(map_file(&raw).icon, FileIcon::Attachment);
    }

    #[test]
    fn deterministic() {
        let raw = RawFileRecord::new("Photo.JPG", "JPG", 2_500_000).with_key("k1");
        let first = map_file(&raw);
        assert_eq!(first, map_file(&raw));
        assert_eq!(first.icon, FileIcon::Image);
        assert_eq!(first.formatted_size, "2.4 MB");
        assert_eq!(first.key, "k1");
    }

    #[test]
    fn list_preserves_order_and_duplicates() {
        let raw = vec![
            RawFileRecord::new("b.doc", "doc", 1),
            RawFileRecord::new("a.xls", "xls", 2),
            RawFileRecord::new("b.doc", "doc", 1),
        ];
        let names: Vec<_> = map_files(&raw).into_iter().map(|m| m.name).collect();
        assert_eq!(names, ["b.doc", "a.xls", "b.doc"]);
        assert!(map_files(&[]).is_empty());
    }
}
