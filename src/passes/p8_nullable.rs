//! Pass 8: nullable-type rewriting.
//!
//! Swagger 2.0 has no first-class `null` type; services express nullability
//! through `x-nullable` or simply by omitting a property from `required`.
//! Validators want it explicit, so every nullable property `p` becomes
//! `{ oneOf: [ <original p>, { "type": "null" } ] }`:
//!
//! - `x-nullable: true` — always rewritten;
//! - `x-nullable: false` — never rewritten;
//! - no `x-nullable` — rewritten iff the property is not `required`.
//!
//! Non-body parameters follow the same rule keyed on their own `required`
//! flag; body parameters delegate to their `schema`. A property already in
//! the wrapped form is never wrapped again, which keeps the pass idempotent.

use serde_json::{json, Value};

use super::HTTP_METHODS;

pub(crate) fn resolve_nullable_types(spec: &mut Value) {
    if let Some(definitions) = spec.get_mut("definitions").and_then(Value::as_object_mut) {
        for model in definitions.values_mut() {
            allow_nullable_types(model);
        }
    }

    if let Some(global_params) = spec.get_mut("parameters").and_then(Value::as_object_mut) {
        for param in global_params.values_mut() {
            allow_nullable_param(param);
        }
    }

    let Some(paths) = spec.get_mut("paths").and_then(Value::as_object_mut) else {
        return;
    };
    for item in paths.values_mut() {
        let Some(item) = item.as_object_mut() else {
            continue;
        };

        if let Some(shared) = item.get_mut("parameters").and_then(Value::as_array_mut) {
            for param in shared {
                allow_nullable_param(param);
            }
        }

        for method in HTTP_METHODS {
            let Some(operation) = item.get_mut(*method).and_then(Value::as_object_mut) else {
                continue;
            };
            if let Some(params) = operation.get_mut("parameters").and_then(Value::as_array_mut) {
                for param in params {
                    allow_nullable_param(param);
                }
            }
            if let Some(responses) = operation.get_mut("responses").and_then(Value::as_object_mut)
            {
                for response in responses.values_mut() {
                    if let Some(schema) = response.get_mut("schema") {
                        allow_nullable_types(schema);
                    }
                }
            }
        }
    }
}

/// Rewrite nullable properties of an object schema, recursively.
pub(crate) fn allow_nullable_types(schema: &mut Value) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };

    let required: Vec<String> = obj
        .get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    if let Some(properties) = obj.get_mut("properties").and_then(Value::as_object_mut) {
        for (name, prop) in properties.iter_mut() {
            allow_nullable_types(prop);
            if should_wrap(prop, required.iter().any(|r| r == name)) {
                wrap_nullable(prop);
            }
        }
    }

    for keyword in ["items", "additionalProperties"] {
        if let Some(child) = obj.get_mut(keyword) {
            if child.is_object() {
                allow_nullable_types(child);
            }
        }
    }
    for keyword in ["allOf", "oneOf", "anyOf"] {
        if let Some(items) = obj.get_mut(keyword).and_then(Value::as_array_mut) {
            for item in items {
                allow_nullable_types(item);
            }
        }
    }
}

/// Rewrite a parameter: body parameters through their schema, everything
/// else as an entity keyed on its own `required` flag. Only typed entities
/// wrap — a `$ref` parameter stays a reference.
pub(crate) fn allow_nullable_param(param: &mut Value) {
    let is_body = param.get("in").and_then(Value::as_str) == Some("body");
    if is_body {
        if let Some(schema) = param.get_mut("schema") {
            allow_nullable_types(schema);
        }
        return;
    }

    let required = param.get("required").and_then(Value::as_bool) == Some(true);
    if param.get("type").is_some() && should_wrap(param, required) {
        wrap_nullable(param);
    }
}

fn should_wrap(entity: &Value, is_required: bool) -> bool {
    if is_wrapped(entity) {
        return false;
    }
    match entity.get("x-nullable").and_then(Value::as_bool) {
        Some(true) => true,
        Some(false) => false,
        None => !is_required,
    }
}

fn is_wrapped(entity: &Value) -> bool {
    entity
        .get("oneOf")
        .and_then(Value::as_array)
        .is_some_and(|arr| arr.iter().any(|v| *v == json!({ "type": "null" })))
}

fn wrap_nullable(slot: &mut Value) {
    let original = slot.take();
    *slot = json!({ "oneOf": [ original, { "type": "null" } ] });
}

// ===========================================================================
// Tests
// ===========================================================================
