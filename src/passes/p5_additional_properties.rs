//! Pass 5: close open objects.
//!
//! A composed model with declared properties and no `additionalProperties`
//! keyword silently accepts arbitrary extra keys, which masks typos in
//! payloads under validation. This pass seals such models with
//! `additionalProperties: false`. Models with zero declared properties are
//! left untouched — they act as open objects on purpose.

use serde_json::Value;

/// Seal top-level definitions. With `force`, every definition is sealed
/// unconditionally; otherwise only models that have non-empty `properties`
/// and no `additionalProperties` of their own.
pub(crate) fn set_additional_properties_false(spec: &mut Value, force: bool) {
    let Some(definitions) = spec.get_mut("definitions").and_then(Value::as_object_mut) else {
        return;
    };

    for model in definitions.values_mut() {
        let Some(obj) = model.as_object_mut() else {
            continue;
        };
        if force {
            obj.insert("additionalProperties".to_string(), Value::Bool(false));
            continue;
        }
        let has_properties = obj
            .get("properties")
            .and_then(Value::as_object)
            .is_some_and(|p| !p.is_empty());
        if has_properties && !obj.contains_key("additionalProperties") {
            obj.insert("additionalProperties".to_string(), Value::Bool(false));
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
