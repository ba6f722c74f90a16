//! Shared utility functions

use serde_json::Value;

/// Cut `s` to at most `max_bytes`, backing off to the previous char boundary.
///
/// ```
/// use photometer_client::util::truncate_utf8_safe;
///
/// assert_eq!(truncate_utf8_safe("галерея", 5), "га");
/// assert_eq!(truncate_utf8_safe("page", 10), "page");
/// ```
pub fn truncate_utf8_safe(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let end = (0..=max_bytes)
        .rev()
        .find(|&i| s.is_char_boundary(i))
        .unwrap_or(0);
    &s[..end]
}

/// Serialize a failure payload to JSON text for display.
///
/// Strings keep their quotes, the same text a browser's `JSON.stringify`
/// would produce.
pub fn stringify(payload: &Value) -> String {
    serde_json::to_string(payload).unwrap_or_else(|_| payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_respects_cyrillic() {
        // Each letter is two bytes
        assert_eq!(truncate_utf8_safe("ошибка", 3), "о");
        assert_eq!(truncate_utf8_safe("ошибка", 4), "ош");
    }

    #[test]
    fn test_truncate_to_zero() {
        assert_eq!(truncate_utf8_safe("sid", 0), "");
        assert_eq!(truncate_utf8_safe("", 3), "");
    }

    #[test]
    fn test_stringify_payloads() {
        assert_eq!(stringify(&json!({"error": "db"})), r#"{"error":"db"}"#);
        assert_eq!(stringify(&json!("timeout")), r#""timeout""#);
        assert_eq!(stringify(&Value::Null), "null");
    }
}
