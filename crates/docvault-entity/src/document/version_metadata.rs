//! Per-version metadata snapshot rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A snapshot of one typed metadata field value at version creation time.
///
/// Snapshots are taken after all metadata mutations for a check-in or
/// restore are applied, so comparing two versions' snapshots yields the
/// true metadata diff at those points in time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct VersionMetadataField {
    /// Unique snapshot row identifier.
    pub id: Uuid,
    /// The version this snapshot belongs to.
    pub version_id: Uuid,
    /// The metadata field key.
    pub field_key: String,
    /// Text representation, if the value is textual.
    pub text_value: Option<String>,
    /// Numeric representation, if the value is numeric.
    pub numeric_value: Option<f64>,
    /// Date representation, if the value is a date.
    pub date_value: Option<DateTime<Utc>>,
}

impl VersionMetadataField {
    /// Build a snapshot row from a JSON metadata value, typing it as
    /// text, numeric, or date.
    pub fn from_json(version_id: Uuid, field_key: &str, value: &serde_json::Value) -> Self {
        let mut row = Self {
            id: Uuid::new_v4(),
            version_id,
            field_key: field_key.to_string(),
            text_value: None,
            numeric_value: None,
            date_value: None,
        };
        match value {
            serde_json::Value::Number(n) => {
                row.numeric_value = n.as_f64();
            }
            serde_json::Value::String(s) => {
                match DateTime::parse_from_rfc3339(s) {
                    Ok(dt) => row.date_value = Some(dt.with_timezone(&Utc)),
                    Err(_) => row.text_value = Some(s.clone()),
                }
            }
            serde_json::Value::Null => {}
            other => {
                row.text_value = Some(other.to_string());
            }
        }
        row
    }

    /// The best-available display value for diffing.
    ///
    /// Precedence is text, then numeric, then date; the first non-empty
    /// representation wins. Version comparison depends on this ordering.
    pub fn display_value(&self) -> Option<String> {
        if let Some(text) = &self.text_value {
            if !text.is_empty() {
                return Some(text.clone());
            }
        }
        if let Some(num) = self.numeric_value {
            return Some(num.to_string());
        }
        self.date_value.map(|d| d.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_value_precedence() {
        let mut field = VersionMetadataField {
            id: Uuid::new_v4(),
            version_id: Uuid::new_v4(),
            field_key: "f".into(),
            text_value: Some("hello".into()),
            numeric_value: Some(42.0),
            date_value: Some(Utc::now()),
        };
        assert_eq!(field.display_value().as_deref(), Some("hello"));

        field.text_value = Some(String::new());
        assert_eq!(field.display_value().as_deref(), Some("42"));

        field.numeric_value = None;
        assert!(field.display_value().unwrap().contains('T'));

        field.date_value = None;
        assert_eq!(field.display_value(), None);
    }

    #[test]
    fn test_from_json_typing() {
        let vid = Uuid::new_v4();
        let num = VersionMetadataField::from_json(vid, "n", &serde_json::json!(3.5));
        assert_eq!(num.numeric_value, Some(3.5));
        assert!(num.text_value.is_none());

        let date =
            VersionMetadataField::from_json(vid, "d", &serde_json::json!("2026-01-15T00:00:00Z"));
        assert!(date.date_value.is_some());
        assert!(date.text_value.is_none());

        let text = VersionMetadataField::from_json(vid, "t", &serde_json::json!("plain"));
        assert_eq!(text.text_value.as_deref(), Some("plain"));
    }
}
