//! Pass 7: pure-object relaxation.
//!
//! A "pure object" — `type: "object"` with no declared properties and no
//! `additionalProperties` — is a bag of anything, but validators treat the
//! bare form inconsistently. This pass makes the permissiveness explicit by
//! setting `additionalProperties: true` on every such schema, recursively,
//! everywhere a schema can appear: definitions, global parameters, path and
//! operation parameters, and response schemas.
//!
//! Binary payloads are exempt: a body schema is only relaxed when the
//! operation's effective `consumes` does not include
//! `application/octet-stream` (response schemas symmetrically via
//! `produces`). The effective list is the operation's, else the document's,
//! else `["application/json"]`.

use serde_json::Value;

use super::HTTP_METHODS;

const OCTET_STREAM: &str = "application/octet-stream";

pub(crate) fn relax_pure_objects(spec: &mut Value) {
    let spec_consumes = media_types(spec, "consumes");
    let spec_produces = media_types(spec, "produces");

    if let Some(definitions) = spec.get_mut("definitions").and_then(Value::as_object_mut) {
        for model in definitions.values_mut() {
            relax_model_like_entities(model);
        }
    }

    if let Some(global_params) = spec.get_mut("parameters").and_then(Value::as_object_mut) {
        for param in global_params.values_mut() {
            relax_parameter(param, &spec_consumes);
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
                relax_parameter(param, &spec_consumes);
            }
        }

        for method in HTTP_METHODS {
            let Some(operation) = item.get_mut(*method) else {
                continue;
            };
            let consumes = media_types(operation, "consumes").unwrap_or_else(|| {
                spec_consumes
                    .clone()
                    .unwrap_or_else(|| vec!["application/json".to_string()])
            });
            let produces = media_types(operation, "produces").unwrap_or_else(|| {
                spec_produces
                    .clone()
                    .unwrap_or_else(|| vec!["application/json".to_string()])
            });

            if let Some(params) = operation.get_mut("parameters").and_then(Value::as_array_mut) {
                for param in params {
                    relax_operation_parameter(param, &consumes);
                }
            }

            if let Some(responses) = operation.get_mut("responses").and_then(Value::as_object_mut)
            {
                if !produces.iter().any(|m| m == OCTET_STREAM) {
                    for response in responses.values_mut() {
                        if let Some(schema) = response.get_mut("schema") {
                            relax_model_like_entities(schema);
                        }
                    }
                }
            }
        }
    }
}

fn relax_parameter(param: &mut Value, spec_consumes: &Option<Vec<String>>) {
    let consumes = spec_consumes
        .clone()
        .unwrap_or_else(|| vec!["application/json".to_string()]);
    relax_operation_parameter(param, &consumes);
}

fn relax_operation_parameter(param: &mut Value, consumes: &[String]) {
    let is_body = param.get("in").and_then(Value::as_str) == Some("body");
    if is_body {
        if consumes.iter().any(|m| m == OCTET_STREAM) {
            return;
        }
        if let Some(schema) = param.get_mut("schema") {
            relax_model_like_entities(schema);
        }
    } else {
        relax_entity_type(param);
    }
}

/// Make an untyped non-body parameter explicitly accept any object.
/// Parameters that already carry a type, a `schema`, a `$ref`, or a nullable
/// `oneOf` wrapper are left alone.
fn relax_entity_type(param: &mut Value) {
    let Some(obj) = param.as_object_mut() else {
        return;
    };
    if obj.contains_key("type")
        || obj.contains_key("schema")
        || obj.contains_key("$ref")
        || obj.contains_key("oneOf")
    {
        return;
    }
    obj.insert("type".to_string(), Value::String("object".to_string()));
    obj.insert("additionalProperties".to_string(), Value::Bool(true));
}

/// Recursively mark every pure-object subschema as explicitly permissive.
pub(crate) fn relax_model_like_entities(schema: &mut Value) {
    let Some(obj) = schema.as_object_mut() else {
        return;
    };

    if let Some(properties) = obj.get_mut("properties").and_then(Value::as_object_mut) {
        for prop in properties.values_mut() {
            relax_model_like_entities(prop);
        }
    }
    for keyword in ["allOf", "oneOf", "anyOf"] {
        if let Some(items) = obj.get_mut(keyword).and_then(Value::as_array_mut) {
            for item in items {
                relax_model_like_entities(item);
            }
        }
    }
    for keyword in ["items", "additionalProperties"] {
        if let Some(child) = obj.get_mut(keyword) {
            if child.is_object() {
                relax_model_like_entities(child);
            }
        }
    }

    let is_object = obj.get("type").and_then(Value::as_str) == Some("object");
    let has_properties = obj
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|p| !p.is_empty());
    if is_object && !has_properties && !obj.contains_key("additionalProperties") {
        obj.insert("additionalProperties".to_string(), Value::Bool(true));
    }
}

fn media_types(node: &Value, key: &str) -> Option<Vec<String>> {
    node.get(key).and_then(Value::as_array).map(|arr| {
        arr.iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect()
    })
}

// ===========================================================================
// Tests
// ===========================================================================
