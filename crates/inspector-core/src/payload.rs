//! Optional-path lookups over loosely-typed JSON payloads.
//!
//! Agents under inspection send whatever they send. Lookups never fail on a
//! missing or mistyped intermediate level; they report what they found.

use serde_json::Value;

/// What a dotted-path lookup found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Presence<'a> {
    /// No value at the path, or an explicit `null`.
    Absent,
    /// An empty string, array or object.
    Empty(&'a Value),
    /// Anything else.
    Present(&'a Value),
}

impl<'a> Presence<'a> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Presence::Absent)
    }

    /// True only for a non-empty value.
    pub fn is_present(&self) -> bool {
        matches!(self, Presence::Present(_))
    }

    /// The value, empty or not.
    pub fn value(&self) -> Option<&'a Value> {
        match *self {
            Presence::Absent => None,
            Presence::Empty(v) | Presence::Present(v) => Some(v),
        }
    }
}

/// Look up a dotted path such as `status.state`.
///
/// Each segment must land on an object key; a scalar or array in the middle
/// of the path counts as absent.
pub fn lookup<'a>(root: &'a Value, path: &str) -> Presence<'a> {
    let mut current = root;
    for segment in path.split('.') {
        match current.as_object().and_then(|map| map.get(segment)) {
            Some(next) => current = next,
            None => return Presence::Absent,
        }
    }
    classify(current)
}

fn classify(value: &Value) -> Presence<'_> {
    let empty = match value {
        Value::Null => return Presence::Absent,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    };
    if empty {
        Presence::Empty(value)
    } else {
        Presence::Present(value)
    }
}

/// True if `path` holds a non-empty array.
pub fn has_non_empty_array(root: &Value, path: &str) -> bool {
    matches!(lookup(root, path), Presence::Present(Value::Array(_)))
}

/// The string at `path`, if it is one.
pub fn str_at<'a>(root: &'a Value, path: &str) -> Option<&'a str> {
    lookup(root, path).value().and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_lookup() {
        let v = json!({"status": {"state": "working"}});
        assert_eq!(lookup(&v, "status.state"), Presence::Present(&json!("working")));
        assert_eq!(str_at(&v, "status.state"), Some("working"));
    }

    #[test]
    fn test_missing_levels_are_absent() {
        assert!(lookup(&json!({}), "status.state").is_absent());
        assert!(lookup(&json!({"status": {}}), "status.state").is_absent());
        assert!(lookup(&json!({"status": "done"}), "status.state").is_absent());
        assert!(lookup(&json!({"status": [{"state": "x"}]}), "status.state").is_absent());
        assert!(lookup(&json!("scalar"), "status").is_absent());
    }

    #[test]
    fn test_null_is_absent() {
        assert!(lookup(&json!({"status": null}), "status").is_absent());
    }

    #[test]
    fn test_empty_values() {
        let v = json!({"s": "", "a": [], "o": {}, "f": false, "z": 0});
        assert!(matches!(lookup(&v, "s"), Presence::Empty(_)));
        assert!(matches!(lookup(&v, "a"), Presence::Empty(_)));
        assert!(matches!(lookup(&v, "o"), Presence::Empty(_)));
        assert!(lookup(&v, "f").is_present());
        assert!(lookup(&v, "z").is_present());
        assert_eq!(lookup(&v, "a").value(), Some(&json!([])));
    }

    #[test]
    fn test_non_empty_array() {
        let v = json!({"parts": [{"text": "hi"}], "empty": [], "text": "x"});
        assert!(has_non_empty_array(&v, "parts"));
        assert!(!has_non_empty_array(&v, "empty"));
        assert!(!has_non_empty_array(&v, "text"));
        assert!(!has_non_empty_array(&v, "missing"));
    }
}
