//! Helpers for partial-update payloads.

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "explicitly null".
///
/// Use together with `#[serde(default)]`:
/// - field absent → `None` (leave unchanged)
/// - field `null` → `Some(None)` (clear)
/// - field set → `Some(Some(value))`
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a tri-state patch value to an optional field.
pub fn apply_nullable<T>(target: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(value) = patch {
        *target = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct NotePatch {
        #[serde(default, deserialize_with = "double_option")]
        note: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_absent_null_and_value() {
        let absent: NotePatch = serde_json::from_str("{}").unwrap();
        let null: NotePatch = serde_json::from_str(r#"{"note":null}"#).unwrap();
        let set: NotePatch = serde_json::from_str(r#"{"note":"x"}"#).unwrap();
        assert_eq!(absent.note, None);
        assert_eq!(null.note, Some(None));
        assert_eq!(set.note, Some(Some("x".to_string())));
    }

    #[test]
    fn apply_nullable_only_touches_present_fields() {
        let mut field = Some(1);
        apply_nullable(&mut field, None);
        assert_eq!(field, Some(1));
        apply_nullable(&mut field, Some(None));
        assert_eq!(field, None);
        apply_nullable(&mut field, Some(Some(7)));
        assert_eq!(field, Some(7));
    }
}
