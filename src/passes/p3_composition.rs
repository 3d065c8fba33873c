//! Pass 3: `allOf` composition.
//!
//! Flattens inheritance chains in `definitions`: every model that `allOf`s a
//! parent receives the full union of its ancestors' `properties` and
//! `required` entries. Parents compose before children, so a multi-level
//! chain needs a single merge per edge. `resolved_all_of_models` records
//! every pointer already composed and doubles as the cycle breaker together
//! with the in-progress stack: a model re-entered mid-composition is treated
//! as already composed.
//!
//! Merge semantics (child wins):
//! - `properties` — value-level deep merge, child keys take precedence;
//! - `required` — set union, first-seen order, parent entries first;
//! - `x-ms-azure-resource` — copied from parent when present;
//! - no other field is merged.
//!
//! The `allOf` arrays themselves survive this pass — the discriminator pass
//! still needs them to find children — and are stripped afterwards by
//! [`delete_references_to_all_of`].

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use crate::error::ResolveError;
use crate::pointer;
use crate::reference::Reference;

/// Compose every model under `definitions`.
pub(crate) fn resolve_all_of_in_definitions(
    spec: &mut Value,
    resolved: &mut HashMap<String, Value>,
) -> Result<(), ResolveError> {
    let names: Vec<String> = match spec.get("definitions").and_then(Value::as_object) {
        Some(definitions) => definitions.keys().cloned().collect(),
        None => return Ok(()),
    };

    let mut composing = HashSet::new();
    for name in names {
        let model_ptr = pointer::build("/definitions", &[&name]);
        compose_model(spec, &model_ptr, resolved, &mut composing)?;
    }
    Ok(())
}

/// Compose the model at `model_ptr`, composing its parents first.
fn compose_model(
    spec: &mut Value,
    model_ptr: &str,
    resolved: &mut HashMap<String, Value>,
    composing: &mut HashSet<String>,
) -> Result<(), ResolveError> {
    if resolved.contains_key(model_ptr) || composing.contains(model_ptr) {
        return Ok(());
    }

    let model = pointer::get(spec, model_ptr).ok_or_else(|| ResolveError::UnresolvablePointer {
        pointer: model_ptr.to_string(),
    })?;

    let Some(all_of) = model.get("allOf").and_then(Value::as_array).cloned() else {
        let snapshot = model.clone();
        resolved.insert(model_ptr.to_string(), snapshot);
        return Ok(());
    };

    composing.insert(model_ptr.to_string());
    for item in all_of {
        match item.get("$ref").and_then(Value::as_str) {
            Some(ref_str) => {
                let parent_ptr = Reference::parse(ref_str)?.local_pointer.ok_or_else(|| {
                    ResolveError::MalformedReference {
                        reference: ref_str.to_string(),
                    }
                })?;
                compose_model(spec, &parent_ptr, resolved, composing)?;
                let parent = pointer::get(spec, &parent_ptr).cloned().ok_or_else(|| {
                    ResolveError::UnresolvablePointer {
                        pointer: parent_ptr.clone(),
                    }
                })?;
                if let Some(child) = pointer::get_mut(spec, model_ptr) {
                    merge_parent_into_child(&parent, child);
                }
                resolved.insert(parent_ptr, parent);
            }
            // An inline allOf item acts as an anonymous parent.
            None => {
                if let Some(child) = pointer::get_mut(spec, model_ptr) {
                    merge_parent_into_child(&item, child);
                }
            }
        }
    }
    composing.remove(model_ptr);

    if let Some(composed) = pointer::get(spec, model_ptr) {
        resolved.insert(model_ptr.to_string(), composed.clone());
    }
    Ok(())
}

/// Merge a composed parent into a child model, in place.
fn merge_parent_into_child(parent: &Value, child: &mut Value) {
    let Some(child_obj) = child.as_object_mut() else {
        return;
    };

    if let Some(parent_props) = parent.get("properties") {
        let mut merged = parent_props.clone();
        if let Some(child_props) = child_obj.get("properties") {
            pointer::deep_merge(&mut merged, child_props);
        }
        child_obj.insert("properties".to_string(), merged);
    }

    if let Some(parent_required) = parent.get("required").and_then(Value::as_array) {
        let child_required = child_obj
            .get("required")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut union = Vec::new();
        for entry in parent_required.iter().chain(child_required.iter()) {
            if let Some(name) = entry.as_str() {
                if seen.insert(name) {
                    union.push(entry.clone());
                }
            }
        }
        child_obj.insert("required".to_string(), Value::Array(union));
    }

    if let Some(marker) = parent.get("x-ms-azure-resource") {
        child_obj.insert("x-ms-azure-resource".to_string(), marker.clone());
    }
}

/// Strip the (now fully merged) `allOf` key from every top-level definition.
pub(crate) fn delete_references_to_all_of(spec: &mut Value) {
    let Some(definitions) = spec.get_mut("definitions").and_then(Value::as_object_mut) else {
        return;
    };
    for model in definitions.values_mut() {
        if let Some(obj) = model.as_object_mut() {
            obj.remove("allOf");
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn compose(spec: &mut Value) -> HashMap<String, Value> {
        let mut resolved = HashMap::new();
        resolve_all_of_in_definitions(spec, &mut resolved).expect("composition should succeed");
        resolved
    }

    #[test]
    fn test_single_parent_merge() {
        let mut spec = json!({
            "definitions": {
                "Animal": { "properties": { "id": { "type": "string" } }, "required": ["id"] },
                "Cat": {
                    "allOf": [ { "$ref": "#/definitions/Animal" } ],
                    "properties": { "meow": { "type": "boolean" } },
                    "required": ["meow"]
                }
            }
        });
        compose(&mut spec);

        let cat = &spec["definitions"]["Cat"];
        assert_eq!(cat["properties"]["id"], json!({ "type": "string" }));
        assert_eq!(cat["properties"]["meow"], json!({ "type": "boolean" }));
        assert_eq!(cat["required"], json!(["id", "meow"]));
        // allOf survives until the dedicated delete step.
        assert!(cat.get("allOf").is_some());
    }

    #[test]
    fn test_multi_level_chain() {
        let mut spec = json!({
            "definitions": {
                "Siamese": {
                    "allOf": [ { "$ref": "#/definitions/Cat" } ],
                    "properties": { "pedigree": { "type": "string" } }
                },
                "Cat": {
                    "allOf": [ { "$ref": "#/definitions/Animal" } ],
                    "properties": { "meow": { "type": "boolean" } }
                },
                "Animal": { "properties": { "id": { "type": "string" } } }
            }
        });
        compose(&mut spec);

        let siamese = &spec["definitions"]["Siamese"];
        let props = siamese["properties"].as_object().unwrap();
        assert!(props.contains_key("id"), "grandparent property inherited");
        assert!(props.contains_key("meow"));
        assert!(props.contains_key("pedigree"));
    }

    #[test]
    fn test_child_property_wins_with_deep_merge() {
        let mut spec = json!({
            "definitions": {
                "Base": {
                    "properties": { "id": { "type": "string", "readOnly": true } }
                },
                "Derived": {
                    "allOf": [ { "$ref": "#/definitions/Base" } ],
                    "properties": { "id": { "type": "integer" } }
                }
            }
        });
        compose(&mut spec);

        let id = &spec["definitions"]["Derived"]["properties"]["id"];
        assert_eq!(id["type"], "integer", "child leaf wins");
        assert_eq!(id["readOnly"], true, "parent-only leaf survives the merge");
    }

    #[test]
    fn test_azure_resource_marker_copied() {
        let mut spec = json!({
            "definitions": {
                "Resource": { "x-ms-azure-resource": true, "properties": {} },
                "Account": { "allOf": [ { "$ref": "#/definitions/Resource" } ] }
            }
        });
        compose(&mut spec);
        assert_eq!(spec["definitions"]["Account"]["x-ms-azure-resource"], true);
    }

    #[test]
    fn test_inline_all_of_item() {
        let mut spec = json!({
            "definitions": {
                "M": {
                    "allOf": [ { "properties": { "inline": { "type": "string" } }, "required": ["inline"] } ],
                    "properties": { "own": { "type": "integer" } }
                }
            }
        });
        compose(&mut spec);

        let m = &spec["definitions"]["M"];
        assert_eq!(m["properties"]["inline"], json!({ "type": "string" }));
        assert_eq!(m["properties"]["own"], json!({ "type": "integer" }));
        assert_eq!(m["required"], json!(["inline"]));
    }

    #[test]
    fn test_cyclic_all_of_terminates() {
        let mut spec = json!({
            "definitions": {
                "A": { "allOf": [ { "$ref": "#/definitions/B" } ], "properties": { "a": { "type": "string" } } },
                "B": { "allOf": [ { "$ref": "#/definitions/A" } ], "properties": { "b": { "type": "string" } } }
            }
        });
        let resolved = compose(&mut spec);
        assert!(resolved.contains_key("/definitions/A"));
        assert!(resolved.contains_key("/definitions/B"));
    }

    #[test]
    fn test_missing_parent_errors() {
        let mut spec = json!({
            "definitions": {
                "Orphan": { "allOf": [ { "$ref": "#/definitions/Gone" } ] }
            }
        });
        let mut resolved = HashMap::new();
        let err = resolve_all_of_in_definitions(&mut spec, &mut resolved).unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvablePointer { .. }));
    }

    #[test]
    fn test_resolved_cache_short_circuits() {
        let mut spec = json!({
            "definitions": {
                "Base": { "properties": { "x": { "type": "string" } } },
                "C1": { "allOf": [ { "$ref": "#/definitions/Base" } ] },
                "C2": { "allOf": [ { "$ref": "#/definitions/Base" } ] }
            }
        });
        let resolved = compose(&mut spec);
        // Base recorded once, both children composed.
        assert!(resolved.contains_key("/definitions/Base"));
        assert!(spec["definitions"]["C1"]["properties"].get("x").is_some());
        assert!(spec["definitions"]["C2"]["properties"].get("x").is_some());
    }

    #[test]
    fn test_delete_references_to_all_of() {
        let mut spec = json!({
            "definitions": {
                "Cat": { "allOf": [ { "$ref": "#/definitions/Animal" } ], "properties": {} },
                "Animal": { "properties": {} }
            }
        });
        delete_references_to_all_of(&mut spec);
        assert!(spec["definitions"]["Cat"].get("allOf").is_none());
        assert!(spec["definitions"]["Animal"].get("allOf").is_none());
    }
}
