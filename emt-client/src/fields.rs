/// Vendor field resolution helpers.
///
/// The same backend exposes the same logical field under different
/// casings per sub-API, so every extraction site resolves through an
/// ordered candidate-key list instead of a single fixed key.

use serde_json::Value;

/// Guest-login session token. Priority order matters.
pub const BID_KEYS: &[&str] = &["bid", "Bid", "BID"];

/// Transaction screen id as returned by guest login.
pub const SCREEN_ID_KEYS: &[&str] = &[
    "TransactionScreenId",
    "TransactionScreenID",
    "EmtScreenID",
    "EmtScreenId",
    "ScreenID",
    "ScreenId",
];

/// Room id inside hotel booking details.
pub const ROOM_ID_KEYS: &[&str] = &["RoomID", "RoomId", "roomId", "Id", "ID"];

/// Room id inside payment-detail entries (different priority than rooms).
pub const PAYMENT_ROOM_ID_KEYS: &[&str] = &["RoomID", "RoomId", "ID", "Id"];

/// First candidate key that is present and not null/empty-string.
pub fn pick<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    for key in keys {
        match obj.get(key) {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(v) => return Some(v),
        }
    }
    None
}

/// Like [`pick`] but stringifies the hit (vendor ids arrive as either
/// strings or numbers).
pub fn pick_string(obj: &Value, keys: &[&str]) -> Option<String> {
    pick(obj, keys).map(value_to_string)
}

/// First candidate key whose value is truthy in the loose vendor sense.
pub fn first_truthy<'a>(obj: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(key))
        .find(|v| truthy(Some(v)))
}

pub fn value_to_string(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Loose boolean: native `true`, or the strings "true"/"True"/"TRUE".
/// Everything else is false.
pub fn loose_bool(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Truthiness matching the vendor's loosely-typed responses: null,
/// false, 0, "" and empty containers are falsy.
pub fn truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
    }
}

/// Optional string field; null and "" both read as absent.
pub fn opt_str(obj: &Value, key: &str) -> Option<String> {
    match obj.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(value_to_string(v)),
    }
}

/// Raw field clone with null filtered out.
pub fn opt_value(obj: &Value, key: &str) -> Option<Value> {
    obj.get(key).filter(|v| !v.is_null()).cloned()
}

/// The vendor sometimes returns a single object where a list is
/// documented. Coerce either shape to a vector.
pub fn coerce_list(v: Option<&Value>) -> Vec<Value> {
    match v {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => {
            if truthy(Some(other)) {
                vec![other.clone()]
            } else {
                Vec::new()
            }
        }
    }
}

pub fn empty_object() -> Value {
    Value::Object(Default::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pick_respects_priority_order() {
        let obj = json!({"Bid": "second", "bid": "first"});
        assert_eq!(pick_string(&obj, BID_KEYS).as_deref(), Some("first"));
    }

    #[test]
    fn pick_skips_null_and_empty() {
        let obj = json!({"bid": null, "Bid": "", "BID": "token"});
        assert_eq!(pick_string(&obj, BID_KEYS).as_deref(), Some("token"));
    }

    #[test]
    fn pick_stringifies_numeric_ids() {
        let obj = json!({"RoomID": 42});
        assert_eq!(pick_string(&obj, ROOM_ID_KEYS).as_deref(), Some("42"));
    }

    #[test]
    fn loose_bool_accepts_string_booleans() {
        assert!(loose_bool(Some(&json!(true))));
        assert!(loose_bool(Some(&json!("true"))));
        assert!(loose_bool(Some(&json!("True"))));
        assert!(!loose_bool(Some(&json!("false"))));
        assert!(!loose_bool(Some(&json!(1))));
        assert!(!loose_bool(None));
    }

    #[test]
    fn truthy_matches_vendor_semantics() {
        assert!(!truthy(Some(&json!(""))));
        assert!(!truthy(Some(&json!(0))));
        assert!(!truthy(Some(&json!(null))));
        assert!(truthy(Some(&json!("Failed"))));
        assert!(truthy(Some(&json!(12.5))));
    }

    #[test]
    fn coerce_list_wraps_single_objects() {
        let single = json!({"RoomID": "R1"});
        let coerced = coerce_list(Some(&single));
        assert_eq!(coerced.len(), 1);
        assert!(coerce_list(Some(&json!(null))).is_empty());
        assert!(coerce_list(None).is_empty());
        assert_eq!(coerce_list(Some(&json!([1, 2]))).len(), 2);
    }
}
