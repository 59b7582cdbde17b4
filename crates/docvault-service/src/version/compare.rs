//! Pure metadata snapshot comparison.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use docvault_entity::document::VersionMetadataField;

/// How one metadata field changed between two versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldChange {
    /// Present in both snapshots with equal display values.
    Unchanged,
    /// Present in both snapshots with different display values.
    Modified,
    /// Present only in the newer snapshot.
    Added,
    /// Present only in the older snapshot.
    Removed,
}

/// One field of a version comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldComparison {
    /// The metadata field key.
    pub field_key: String,
    /// How the field changed from A to B.
    pub status: FieldChange,
    /// Display value in version A.
    pub old_value: Option<String>,
    /// Display value in version B.
    pub new_value: Option<String>,
}

/// The result of comparing two versions of the same document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionComparison {
    /// The older side of the comparison (A).
    pub version_a_id: Uuid,
    /// The newer side of the comparison (B).
    pub version_b_id: Uuid,
    /// Label of version A.
    pub version_a_label: String,
    /// Label of version B.
    pub version_b_label: String,
    /// Whether the content hashes differ.
    pub content_changed: bool,
    /// Byte-size delta (B minus A).
    pub size_delta_bytes: i64,
    /// Per-field metadata comparison over the union of both snapshots.
    pub fields: Vec<FieldComparison>,
}

/// Compare two metadata snapshots field by field.
///
/// The field set is the union of both sides, so the comparison is
/// symmetric in which fields it reports while old/new value assignment
/// stays directional (A is old, B is new).
pub fn compare_snapshots(
    a: &[VersionMetadataField],
    b: &[VersionMetadataField],
) -> Vec<FieldComparison> {
    let a_by_key: BTreeMap<&str, &VersionMetadataField> =
        a.iter().map(|f| (f.field_key.as_str(), f)).collect();
    let b_by_key: BTreeMap<&str, &VersionMetadataField> =
        b.iter().map(|f| (f.field_key.as_str(), f)).collect();

    let mut keys: Vec<&str> = a_by_key.keys().chain(b_by_key.keys()).copied().collect();
    keys.sort_unstable();
    keys.dedup();

    keys.into_iter()
        .map(|key| {
            let old_value = a_by_key.get(key).and_then(|f| f.display_value());
            let new_value = b_by_key.get(key).and_then(|f| f.display_value());
            let status = match (a_by_key.contains_key(key), b_by_key.contains_key(key)) {
                (true, true) if old_value == new_value => FieldChange::Unchanged,
                (true, true) => FieldChange::Modified,
                (false, true) => FieldChange::Added,
                (true, false) => FieldChange::Removed,
                (false, false) => unreachable!("key came from the union of both sides"),
            };
            FieldComparison {
                field_key: key.to_string(),
                status,
                old_value,
                new_value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_field(key: &str, value: &str) -> VersionMetadataField {
        VersionMetadataField {
            id: Uuid::new_v4(),
            version_id: Uuid::new_v4(),
            field_key: key.to_string(),
            text_value: Some(value.to_string()),
            numeric_value: None,
            date_value: None,
        }
    }

    #[test]
    fn test_classification_of_all_statuses() {
        let a = vec![
            text_field("author", "alice"),
            text_field("department", "legal"),
            text_field("dropped", "x"),
        ];
        let b = vec![
            text_field("author", "alice"),
            text_field("department", "finance"),
            text_field("added", "y"),
        ];

        let fields = compare_snapshots(&a, &b);
        let by_key: BTreeMap<&str, &FieldComparison> =
            fields.iter().map(|f| (f.field_key.as_str(), f)).collect();

        assert_eq!(by_key["author"].status, FieldChange::Unchanged);
        assert_eq!(by_key["department"].status, FieldChange::Modified);
        assert_eq!(by_key["department"].old_value.as_deref(), Some("legal"));
        assert_eq!(by_key["department"].new_value.as_deref(), Some("finance"));
        assert_eq!(by_key["added"].status, FieldChange::Added);
        assert_eq!(by_key["dropped"].status, FieldChange::Removed);
    }

    #[test]
    fn test_field_set_is_symmetric() {
        let a = vec![text_field("one", "1")];
        let b = vec![text_field("two", "2")];

        let ab: Vec<String> = compare_snapshots(&a, &b)
            .into_iter()
            .map(|f| f.field_key)
            .collect();
        let ba: Vec<String> = compare_snapshots(&b, &a)
            .into_iter()
            .map(|f| f.field_key)
            .collect();
        assert_eq!(ab, ba);
    }
}
