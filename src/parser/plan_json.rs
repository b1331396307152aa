use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanJsonError {
    #[error("no JSON object found")]
    NotFound,

    #[error("invalid JSON: {0}")]
    Parse(String),

    #[error("expected a JSON object")]
    NotAnObject,
}

/// Slice from the first `{` to the last `}`. Models wrap their JSON in prose
/// or code fences often enough that this is the only reliable cut.
#[must_use]
pub fn json_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Extracts and parses the day-keyed plan object, keeping key order.
pub fn extract_plan(text: &str) -> Result<Map<String, Value>, PlanJsonError> {
    let span = json_object_span(text).ok_or(PlanJsonError::NotFound)?;
    let value: Value =
        serde_json::from_str(span).map_err(|e| PlanJsonError::Parse(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(PlanJsonError::NotAnObject),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_fenced_reply() {
        let reply = "Sure! Here it is:\n```json\n{\"Monday\": {\"Morning\": \"Review\"}, \"Tuesday\": {\"Morning\": \"Scan\"}}\n```";
        let plan = extract_plan(reply).unwrap();
        let days: Vec<&str> = plan.keys().map(String::as_str).collect();
        assert_eq!(days, ["Monday", "Tuesday"]);
        assert_eq!(plan["Monday"]["Morning"], "Review");
    }

    #[test]
    fn test_missing_braces() {
        assert_eq!(extract_plan("no json here"), Err(PlanJsonError::NotFound));
        assert_eq!(extract_plan("} backwards {"), Err(PlanJsonError::NotFound));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            extract_plan("{\"Monday\": {\"Morning\": }"),
            Err(PlanJsonError::Parse(_))
        ));
    }

    #[test]
    fn test_day_order_preserved() {
        let reply = r#"{"Wednesday": {}, "Monday": {}, "Friday": {}}"#;
        let plan = extract_plan(reply).unwrap();
        let days: Vec<&str> = plan.keys().map(String::as_str).collect();
        assert_eq!(days, ["Wednesday", "Monday", "Friday"]);
    }
}
