//! Parse-with-fallback helpers
//!
//! Every scalar in an incoming document is optional. These helpers read one
//! key out of a JSON object and hand back either the parsed value or the
//! caller's current value, so a missing or malformed field never changes
//! what is already in memory.

use at_core::{truncate_label, WireEnum};
use serde_json::{Map, Value};
use tracing::trace;

pub type Object = Map<String, Value>;

/// A scalar that can be read out of a JSON value
pub trait FromField: Sized {
    fn from_field(value: &Value) -> Option<Self>;
}

impl FromField for u8 {
    fn from_field(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|v| u8::try_from(v).ok())
    }
}

impl FromField for i32 {
    fn from_field(value: &Value) -> Option<Self> {
        value.as_i64().and_then(|v| i32::try_from(v).ok())
    }
}

impl FromField for bool {
    fn from_field(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

/// Strings are bounded like every stored label
impl FromField for String {
    fn from_field(value: &Value) -> Option<Self> {
        value.as_str().map(truncate_label)
    }
}

/// Read `key` as `T`, or keep `current`
pub fn field<T: FromField>(obj: &Object, key: &str, current: T) -> T {
    match obj.get(key) {
        None => current,
        Some(value) => T::from_field(value).unwrap_or_else(|| {
            trace!(key, %value, "Malformed field, keeping current value");
            current
        }),
    }
}

/// Read `key` as a label, or keep a copy of `current`
pub fn field_label(obj: &Object, key: &str, current: &str) -> String {
    match obj.get(key).and_then(String::from_field) {
        Some(label) => label,
        None => current.to_string(),
    }
}

/// Read `key` as a wire-coded enum, or keep `current`
///
/// Unknown codes count as malformed.
pub fn field_enum<E: WireEnum>(obj: &Object, key: &str, current: E) -> E {
    let Some(code) = obj.get(key).and_then(Value::as_i64) else {
        return current;
    };
    E::from_wire(code).unwrap_or_else(|err| {
        trace!(key, %err, "Unknown code, keeping current value");
        current
    })
}

/// Read a group member array
///
/// Unlike scalar fields, members never fall back to what is in memory. The
/// result is always rebuilt: entries past the end of the array, entries that
/// are not integers in `0..=255`, and every entry when `value` is missing or
/// not an array, become 0.
pub fn member_ids<const N: usize>(value: Option<&Value>) -> [u8; N] {
    let items = value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
    std::array::from_fn(|i| items.get(i).and_then(u8::from_field).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use at_core::{Comparison, MAX_LABEL_LEN};
    use serde_json::json;

    fn obj(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_missing_field_keeps_current() {
        let o = obj(json!({}));
        assert_eq!(field(&o, "v", 17i32), 17);
        assert!(field(&o, "s", true));
        assert_eq!(field_label(&o, "nm", "Timer 1"), "Timer 1");
    }

    #[test]
    fn test_malformed_field_keeps_current() {
        let o = obj(json!({"v": "12", "g": 300, "s": 1, "n": -1, "x": 2.5}));
        assert_eq!(field(&o, "v", 4i32), 4);
        assert_eq!(field(&o, "g", 15u8), 15);
        assert!(!field(&o, "s", false));
        assert_eq!(field(&o, "n", 3u8), 3);
        assert_eq!(field(&o, "x", 9i32), 9);
    }

    #[test]
    fn test_i32_range() {
        let o = obj(json!({"lo": i32::MIN, "hi": 2_147_483_648i64}));
        assert_eq!(field(&o, "lo", 0i32), i32::MIN);
        assert_eq!(field(&o, "hi", 1i32), 1);
    }

    #[test]
    fn test_labels_are_truncated() {
        let long = "x".repeat(40);
        let o = obj(json!({ "nm": long }));
        assert_eq!(field_label(&o, "nm", "").len(), MAX_LABEL_LEN);
    }

    #[test]
    fn test_enum_unknown_code_keeps_current() {
        let o = obj(json!({"cp": 3, "bad": 7, "neg": -1}));
        assert_eq!(field_enum(&o, "cp", Comparison::IsTrue), Comparison::IsLess);
        assert_eq!(field_enum(&o, "bad", Comparison::IsFalse), Comparison::IsFalse);
        let kept = field_enum(&o, "neg", Comparison::FlagIsTrue);
        assert_eq!(kept, Comparison::FlagIsTrue);
    }

    #[test]
    fn test_member_ids_zero_fill() {
        let value = json!([1, "two", 300, 4]);
        assert_eq!(member_ids::<5>(Some(&value)), [1, 0, 0, 4, 0]);
        assert_eq!(member_ids::<5>(Some(&json!([1, 2, 3, 4, 5, 6, 7]))), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_member_ids_missing_array_clears() {
        assert_eq!(member_ids::<5>(Some(&json!("nope"))), [0; 5]);
        assert_eq!(member_ids::<5>(Some(&json!({"0": 3}))), [0; 5]);
        assert_eq!(member_ids::<5>(None), [0; 5]);
    }
}
