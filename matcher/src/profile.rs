//! Normalized user records.
//!
//! Records arrive from the document store as loosely-typed JSON. Everything
//! downstream works on [`UserProfile`], which always carries all six fields as
//! trimmed strings.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub uid: String,
    pub name: String,
    pub program: String,
    pub clubs: String,
    pub interests: String,
    pub accommodations: String,
}

impl UserProfile {
    /// Normalize an arbitrary record. Never fails: missing or non-scalar
    /// fields become empty strings.
    pub fn from_record(record: &Value) -> Self {
        Self {
            uid: field_text(record, "uid"),
            name: field_text(record, "name"),
            program: field_text(record, "program"),
            clubs: field_text(record, "clubs"),
            interests: field_text(record, "interests"),
            accommodations: field_text(record, "accommodations"),
        }
    }

    pub fn has_uid(&self) -> bool {
        !self.uid.is_empty()
    }
}

/// Read `key` from a JSON object as trimmed text.
///
/// Strings are trimmed, numbers and booleans use their JSON text, anything
/// else (null, arrays, objects, missing keys) reads as empty.
pub fn field_text(record: &Value, key: &str) -> String {
    match record.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_record_trims_and_fills_missing() {
        let profile = UserProfile::from_record(&json!({
            "uid": "  abc  ",
            "name": "Ada\n",
            "program": "Software Engineering",
            "photoURL": "ignored"
        }));

        assert_eq!(profile.uid, "abc");
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.program, "Software Engineering");
        assert_eq!(profile.clubs, "");
        assert_eq!(profile.interests, "");
        assert_eq!(profile.accommodations, "");
    }

    #[test]
    fn test_from_record_coerces_scalars_and_drops_containers() {
        let profile = UserProfile::from_record(&json!({
            "uid": 42,
            "name": null,
            "clubs": ["chess", "robotics"],
            "interests": {"music": true},
            "accommodations": false
        }));

        assert_eq!(profile.uid, "42");
        assert_eq!(profile.name, "");
        assert_eq!(profile.clubs, "");
        assert_eq!(profile.interests, "");
        assert_eq!(profile.accommodations, "false");
    }

    #[test]
    fn test_from_record_non_object_is_empty() {
        assert_eq!(
            UserProfile::from_record(&json!("just a string")),
            UserProfile::default()
        );
        assert!(!UserProfile::from_record(&Value::Null).has_uid());
    }
}
