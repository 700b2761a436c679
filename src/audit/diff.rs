//! Field diffs for audit entries

use serde_json::Value;

/// Fields that change on every write and carry no information
const IGNORED_FIELDS: &[&str] = &["updated_at"];

const MAX_STRING_CHARS: usize = 50;

/// Describe what changed between two serialized records
///
/// Nested objects are walked with dotted paths (`tax.vat`); arrays are
/// summarized by length. Returns `None` when nothing but ignored fields
/// changed.
pub fn generate_diff(before: &Value, after: &Value) -> Option<String> {
    let mut changes = Vec::new();
    collect_changes(before, after, "", &mut changes);
    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

fn collect_changes(before: &Value, after: &Value, prefix: &str, changes: &mut Vec<String>) {
    let path = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };

    match (before, after) {
        (Value::Object(before_obj), Value::Object(after_obj)) => {
            for (key, before_val) in before_obj {
                if IGNORED_FIELDS.contains(&key.as_str()) {
                    continue;
                }
                match after_obj.get(key) {
                    Some(after_val) => collect_changes(before_val, after_val, &path(key), changes),
                    None => changes.push(format!("{}: {} -> (kaldırıldı)", path(key), format_value(before_val))),
                }
            }
            for (key, after_val) in after_obj {
                if !before_obj.contains_key(key) && !IGNORED_FIELDS.contains(&key.as_str()) {
                    changes.push(format!("{}: (eklendi) -> {}", path(key), format_value(after_val)));
                }
            }
        }
        _ if before != after => {
            let label = if prefix.is_empty() { String::new() } else { format!("{}: ", prefix) };
            changes.push(format!("{}{} -> {}", label, format_value(before), format_value(after)));
        }
        _ => {}
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) if s.chars().count() > MAX_STRING_CHARS => {
            let head: String = s.chars().take(MAX_STRING_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(arr) => format!("[{} öğe]", arr.len()),
        Value::Object(obj) => format!("{{{} alan}}", obj.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simple_field_change() {
        let before = json!({"name": "Acme", "paid_amount": 1000});
        let after = json!({"name": "Acme", "paid_amount": 1500});

        let diff = generate_diff(&before, &after).unwrap();
        assert_eq!(diff, "paid_amount: 1000 -> 1500");
    }

    #[test]
    fn test_nested_paths() {
        let before = json!({"tax": {"base": 1000, "vat": 200}});
        let after = json!({"tax": {"base": 1000, "vat": 180}});

        assert_eq!(generate_diff(&before, &after).unwrap(), "tax.vat: 200 -> 180");
    }

    #[test]
    fn test_added_and_removed_fields() {
        let before = json!({"notes": "x"});
        let after = json!({"paid_date": "2025-01-01"});

        let diff = generate_diff(&before, &after).unwrap();
        assert!(diff.contains("notes: \"x\" -> (kaldırıldı)"));
        assert!(diff.contains("paid_date: (eklendi) -> \"2025-01-01\""));
    }

    #[test]
    fn test_timestamps_ignored() {
        let before = json!({"status": "pending", "updated_at": "2025-01-01T00:00:00Z"});
        let after = json!({"status": "pending", "updated_at": "2025-01-02T00:00:00Z"});
        assert!(generate_diff(&before, &after).is_none());
    }

    #[test]
    fn test_arrays_summarized() {
        let before = json!({"allocations": [1, 2]});
        let after = json!({"allocations": [1, 2, 3]});
        assert_eq!(
            generate_diff(&before, &after).unwrap(),
            "allocations: [2 öğe] -> [3 öğe]"
        );
    }

    #[test]
    fn test_long_multibyte_string_truncated() {
        let long = "ş".repeat(100);
        let diff = generate_diff(&json!({"description": long}), &json!({"description": "kısa"})).unwrap();
        assert!(diff.contains("...\""));
    }
}
