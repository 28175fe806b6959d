use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

fn sensitive_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)private|key|secret|password|token|credential").expect("valid regex")
    })
}

/// Recursively replace the value of any object key matching
/// `/private|key|secret|password|token|credential/i` with `"[REDACTED]"`.
///
/// Arrays and nested objects are walked at any depth; non-object/array
/// leaves pass through unchanged.
#[must_use]
pub fn sanitize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                if sensitive_key_pattern().is_match(k) {
                    out.insert(k.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    out.insert(k.clone(), sanitize(v));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_nested_sensitive_keys() {
        let input = serde_json::json!({
            "user": "alice",
            "credentials": {
                "apiKey": "abc123",
                "nested": { "secretValue": "shh" }
            },
            "tokens": ["a", "b"],
        });
        let out = sanitize(&input);
        assert_eq!(out["user"], "alice");
        assert_eq!(out["credentials"], Value::String("[REDACTED]".into()));
        assert_eq!(out["tokens"], Value::String("[REDACTED]".into()));
    }

    #[test]
    fn leaves_non_sensitive_data_untouched() {
        let input = serde_json::json!({"name": "A", "count": 3});
        let out = sanitize(&input);
        assert_eq!(out, input);
    }
}
