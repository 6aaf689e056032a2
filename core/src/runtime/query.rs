#![deny(missing_docs)]

//! # Query Strings
//!
//! Serialises a validated query object the same way the generated `toQueryString` helper does.

use serde_json::Value;
use url::form_urlencoded;

/// Encodes the members of a JSON object as `application/x-www-form-urlencoded`.
///
/// - `null` members (and `null` array items) are skipped.
/// - Arrays repeat the key once per item.
/// - Objects are JSON-encoded.
/// - Other scalars are stringified.
///
/// Non-object input yields an empty string.
pub fn to_query_string(params: &Value) -> String {
    let Value::Object(map) = params else {
        return String::new();
    };
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items {
                    append(&mut serializer, key, item);
                }
            }
            other => append(&mut serializer, key, other),
        }
    }
    serializer.finish()
}

fn append(serializer: &mut form_urlencoded::Serializer<'_, String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            serializer.append_pair(key, s);
        }
        other => {
            serializer.append_pair(key, &other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalars_and_nulls() {
        let q = json!({ "q": "red widgets", "limit": 10, "exact": false, "cursor": null });
        assert_eq!(to_query_string(&q), "q=red+widgets&limit=10&exact=false");
    }

    #[test]
    fn test_arrays_repeat_and_objects_encode() {
        let q = json!({ "tag": ["a", null, "b&c"], "filter": { "k": 1 } });
        assert_eq!(
            to_query_string(&q),
            "tag=a&tag=b%26c&filter=%7B%22k%22%3A1%7D"
        );
    }

    #[test]
    fn test_empty() {
        assert_eq!(to_query_string(&json!({})), "");
        assert_eq!(to_query_string(&json!({ "a": null })), "");
        assert_eq!(to_query_string(&Value::Null), "");
    }
}
