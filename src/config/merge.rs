//! Deep merge of configuration tiers.
//!
//! Higher tiers override lower tiers key by key. Arrays and scalars are
//! replaced whole.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// A null in `overlay` means "not specified" and keeps the base value.
///
/// # Example
/// ```
/// use serde_json::json;
/// use task_forest::config::deep_merge;
///
/// let defaults = json!({ "server": { "port": 3000, "bind": "127.0.0.1" } });
/// let project = json!({ "server": { "port": 8080 } });
/// let merged = deep_merge(defaults, project);
/// assert_eq!(merged, json!({ "server": { "port": 8080, "bind": "127.0.0.1" } }));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later tiers winning.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
