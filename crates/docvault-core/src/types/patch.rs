//! Presence-aware partial-update wrapper.
//!
//! Partial update requests must distinguish "field absent, leave it alone"
//! from "field explicitly set to null, clear it". A plain `Option<T>`
//! collapses the two, so update DTOs wrap each patchable field in [`Patch`].

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A three-state field patch: keep the current value, clear it, or replace it.
///
/// In JSON, an absent field deserializes to `Keep` (via `#[serde(default)]`
/// on the containing struct field), an explicit `null` to `Null`, and any
/// other value to `Value`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// The field was not present in the request; leave the target unchanged.
    #[default]
    Keep,
    /// The field was explicitly null; clear the target.
    Null,
    /// The field carries a replacement value.
    Value(T),
}

impl<T> Patch<T> {
    /// Returns `true` if this patch leaves the target unchanged.
    pub fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    /// Apply this patch to an optional target field.
    pub fn apply_to(self, target: &mut Option<T>) {
        match self {
            Self::Keep => {}
            Self::Null => *target = None,
            Self::Value(v) => *target = Some(v),
        }
    }

    /// Resolve the patched value given the current one.
    pub fn resolve(self, current: Option<T>) -> Option<T> {
        match self {
            Self::Keep => current,
            Self::Null => None,
            Self::Value(v) => Some(v),
        }
    }

    /// View the replacement value, if any.
    pub fn as_value(&self) -> Option<&T> {
        match self {
            Self::Value(v) => Some(v),
            _ => None,
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Self::Value(v),
            None => Self::Null,
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            // Keep is representable only as field absence; containing structs
            // use skip_serializing_if = "Patch::is_keep".
            Self::Keep | Self::Null => serializer.serialize_none(),
            Self::Value(v) => serializer.serialize_some(v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Update {
        #[serde(default)]
        description: Patch<String>,
        #[serde(default)]
        importance: Patch<i32>,
    }

    #[test]
    fn test_absent_null_and_value() {
        let u: Update = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(u.description, Patch::Null);
        assert_eq!(u.importance, Patch::Keep);

        let u: Update = serde_json::from_str(r#"{"importance": 3}"#).unwrap();
        assert_eq!(u.description, Patch::Keep);
        assert_eq!(u.importance, Patch::Value(3));
    }

    #[test]
    fn test_apply_to() {
        let mut target = Some("old".to_string());
        Patch::Keep.apply_to(&mut target);
        assert_eq!(target.as_deref(), Some("old"));

        Patch::Value("new".to_string()).apply_to(&mut target);
        assert_eq!(target.as_deref(), Some("new"));

        Patch::<String>::Null.apply_to(&mut target);
        assert_eq!(target, None);
    }
}
