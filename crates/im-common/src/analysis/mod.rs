pub mod culture;
pub mod feedback;
pub mod red_flags;
pub mod skills;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How an analysis artifact was produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMethod {
    Ai,
    #[default]
    Fallback,
}

/// The adapter signals "no structured data available" as an empty object.
pub(crate) fn is_empty_object(value: &Value) -> bool {
    value.as_object().map_or(true, |map| map.is_empty())
}

// Every structured-response field has a documented default applied when
// absent or mistyped; a missing field is never an error path.

pub(crate) fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub(crate) fn list_field(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn score_field(value: &Value, key: &str, default: u32) -> u32 {
    value
        .get(key)
        .and_then(Value::as_u64)
        .map(|raw| raw.min(100) as u32)
        .unwrap_or(default)
}

pub(crate) fn bool_field(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_defaults_apply_when_absent() {
        let response = json!({"confidence": 80});
        assert_eq!(str_field(&response, "evidence"), "");
        assert!(list_field(&response, "technical_skills").is_empty());
        assert_eq!(score_field(&response, "confidence", 0), 80);
        assert_eq!(score_field(&response, "culture_score", 65), 65);
        assert!(!bool_field(&response, "is_concerning"));
    }

    #[test]
    fn scores_clamp_to_one_hundred() {
        let response = json!({"confidence": 400});
        assert_eq!(score_field(&response, "confidence", 0), 100);
    }

    #[test]
    fn empty_object_detection() {
        assert!(is_empty_object(&json!({})));
        assert!(is_empty_object(&json!(null)));
        assert!(!is_empty_object(&json!({"a": 1})));
    }
}
