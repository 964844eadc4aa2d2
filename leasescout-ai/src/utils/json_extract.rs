//! Locate JSON inside free-text completions
//!
//! Models wrap JSON in prose, markdown fences or `<json>` tags. Extraction is
//! textual; decoding is left to serde.

use serde::de::DeserializeOwned;

use crate::error::AnalysisError;

/// Outermost `{ ... }` span: first `{` through last `}`
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// JSON inside `<json>...</json>`, else a fenced ```json block, else the outermost object
pub fn extract_tagged_json(text: &str) -> Option<&str> {
    between(text, "<json>", "</json>")
        .or_else(|| between(text, "```json", "```"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| extract_json_object(text))
}

fn between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let len = text[start..].find(close)?;
    Some(&text[start..start + len])
}

/// Decode the outermost JSON object of a completion into `T`
///
/// `what` names the expected document in error messages.
pub fn parse_json_object<T: DeserializeOwned>(text: &str, what: &str) -> Result<T, AnalysisError> {
    let json = extract_json_object(text)
        .ok_or_else(|| AnalysisError::Parse(format!("No JSON found in {} response", what)))?;
    serde_json::from_str(json)
        .map_err(|e| AnalysisError::Parse(format!("Invalid JSON in {} response: {}", what, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_object_in_prose() {
        let text = "Here you go:\n{\"a\": {\"b\": 1}}\nThanks!";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": 1}}"));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(extract_json_object("no json here"), None);
        assert_eq!(extract_json_object("} backwards {"), None);
    }

    #[test]
    fn test_tagged_json_preferred() {
        let text = "Sources {cited}\n<json>\n{\"x\": 1}\n</json>";
        assert_eq!(extract_tagged_json(text), Some("{\"x\": 1}"));
    }

    #[test]
    fn test_fenced_json() {
        let text = "Result:\n```json\n{\"x\": 2}\n```\nDone";
        assert_eq!(extract_tagged_json(text), Some("{\"x\": 2}"));
    }

    #[test]
    fn test_bare_object_fallback() {
        assert_eq!(extract_tagged_json("{\"x\": 3}"), Some("{\"x\": 3}"));
    }

    #[test]
    fn test_parse_errors_are_parse_variant() {
        let missing: Result<Value, _> = parse_json_object("nothing", "tenant discovery");
        assert!(matches!(missing, Err(AnalysisError::Parse(msg)) if msg.contains("tenant discovery")));

        let broken: Result<Value, _> = parse_json_object("{\"a\": }", "market");
        assert!(matches!(broken, Err(AnalysisError::Parse(_))));
    }
}
