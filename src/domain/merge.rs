use serde_json::Value as JsonValue;

/// Applies a PATCH body onto a stored record.
///
/// When both are objects, top-level keys of `patch` overwrite those of
/// `stored`; nested objects are replaced, not merged recursively. When either
/// side is not an object the patch replaces the record.
pub fn shallow_merge(stored: JsonValue, patch: JsonValue) -> JsonValue {
    match (stored, patch) {
        (JsonValue::Object(mut base), JsonValue::Object(changes)) => {
            base.extend(changes);
            JsonValue::Object(base)
        }
        (_, patch) => patch,
    }
}
