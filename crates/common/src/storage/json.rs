//! JSON merge used by [`KeyValueStoreExt::set_json`](super::KeyValueStoreExt::set_json)

use serde_json::Value;

/// Deep-merge `stored` into `incoming`; values from `stored` win.
///
/// Nested objects are merged recursively, anything else in `stored`
/// overwrites the incoming value.
pub fn merge_missing(incoming: &mut Value, stored: Value) {
    match (incoming, stored) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, stored_value) in source {
                match target.get_mut(&key) {
                    Some(existing) if existing.is_object() && stored_value.is_object() => {
                        merge_missing(existing, stored_value);
                    }
                    _ => {
                        target.insert(key, stored_value);
                    }
                }
            }
        }
        (target, stored) => *target = stored,
    }
}
