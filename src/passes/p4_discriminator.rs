//! Pass 4: discriminator expansion.
//!
//! For every definition carrying a `discriminator` field this pass:
//!
//! 1. rewrites the discriminator property on the root **and every
//!    descendant** into a single-value `enum` holding the model's on-wire
//!    name (`x-ms-discriminator-value` when present, else the definition
//!    name);
//! 2. builds a [`PolymorphicTree`] of the root's transitive children — a
//!    child is any definition whose `allOf` array references the parent;
//! 3. rewrites every plain `$ref` to the root (outside `allOf`/`oneOf`
//!    positions) into a `oneOf` union of the root and all descendants, in
//!    depth-first order, deduplicated.
//!
//! Must run after composition but **before** `allOf` arrays are deleted —
//! child discovery reads them.

use std::collections::HashSet;

use serde_json::{json, Value};

use crate::error::ResolveError;
use crate::pointer;
use crate::poly_tree::PolymorphicTree;
use crate::reference::collect_refs;

pub(crate) fn expand_discriminators(spec: &mut Value) -> Result<(), ResolveError> {
    let roots: Vec<(String, String)> = match spec.get("definitions").and_then(Value::as_object) {
        Some(definitions) => definitions
            .iter()
            .filter_map(|(name, model)| {
                model
                    .get("discriminator")
                    .and_then(Value::as_str)
                    .map(|d| (name.clone(), d.to_string()))
            })
            .collect(),
        None => return Ok(()),
    };

    for (root, discriminator) in roots {
        let tree = build_tree(spec, &root, &mut HashSet::new())?;
        tracing::debug!(root = %root, members = tree.names_depth_first().len(), "expanding discriminator");

        for name in tree.names_depth_first() {
            rewrite_discriminator_property(spec, name, &discriminator);
        }
        if tree.has_children() {
            rewrite_references_to_root(spec, &tree);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tree construction
// ---------------------------------------------------------------------------

/// Children of `name` are the definitions whose `allOf` references it.
/// `visited` refuses re-entry of a name already seen for this root, so a
/// malformed cyclic hierarchy yields an in-progress node instead of
/// recursing forever.
fn build_tree(
    spec: &Value,
    name: &str,
    visited: &mut HashSet<String>,
) -> Result<PolymorphicTree, ResolveError> {
    let mut node = PolymorphicTree::new(name)?;
    if !visited.insert(name.to_string()) {
        return Ok(node);
    }

    let Some(definitions) = spec.get("definitions").and_then(Value::as_object) else {
        return Ok(node);
    };
    let parent_ref = definition_ref(name);

    let children: Vec<String> = definitions
        .iter()
        .filter(|(child, _)| child.as_str() != name)
        .filter(|(_, model)| {
            model
                .get("allOf")
                .and_then(Value::as_array)
                .is_some_and(|items| {
                    items
                        .iter()
                        .any(|item| item.get("$ref").and_then(Value::as_str) == Some(&parent_ref))
                })
        })
        .map(|(child, _)| child.clone())
        .collect();

    for child in children {
        node.add_child(build_tree(spec, &child, visited)?);
    }
    Ok(node)
}

// ---------------------------------------------------------------------------
// Rewrites
// ---------------------------------------------------------------------------

/// Constrain the discriminator property of `name` to its on-wire value.
fn rewrite_discriminator_property(spec: &mut Value, name: &str, discriminator: &str) {
    let model_ptr = pointer::build("/definitions", &[name]);
    let wire_name = pointer::get(spec, &model_ptr)
        .and_then(|m| m.get("x-ms-discriminator-value"))
        .and_then(Value::as_str)
        .unwrap_or(name)
        .to_string();

    let prop_ptr = pointer::build(&model_ptr, &["properties", discriminator]);
    let Some(prop) = pointer::get_mut(spec, &prop_ptr) else {
        return;
    };
    // A nullable rewrite may have wrapped the property; constrain the
    // non-null branch rather than the wrapper.
    let target = if prop.get("oneOf").is_some() {
        &mut prop["oneOf"][0]
    } else {
        prop
    };
    let Some(prop) = target.as_object_mut() else {
        return;
    };
    prop.remove("$ref");
    if !prop.contains_key("type") {
        prop.insert("type".to_string(), Value::String("string".to_string()));
    }
    prop.insert("enum".to_string(), json!([wire_name]));
}

/// Replace plain `$ref`s targeting the root with a `oneOf` union over the
/// whole hierarchy. Positions under `allOf` (inheritance edges) or `oneOf`
/// (already-expanded unions) are left alone.
fn rewrite_references_to_root(spec: &mut Value, tree: &PolymorphicTree) {
    let root_ref = definition_ref(tree.name());

    let mut seen = HashSet::new();
    let union: Vec<Value> = tree
        .names_depth_first()
        .into_iter()
        .filter(|name| seen.insert(name.to_string()))
        .map(|name| json!({ "$ref": definition_ref(name) }))
        .collect();

    let sites = collect_refs(spec);
    for site in sites {
        if site.reference != root_ref {
            continue;
        }
        let segments = pointer::split(&site.location);
        if segments.iter().any(|s| s == "allOf" || s == "oneOf") {
            continue;
        }
        if let Some(obj) = pointer::get_mut(spec, &site.location).and_then(Value::as_object_mut) {
            obj.remove("$ref");
            obj.insert("oneOf".to_string(), Value::Array(union.clone()));
        }
    }
}

fn definition_ref(name: &str) -> String {
    format!("#{}", pointer::build("/definitions", &[name]))
}

// ===========================================================================
// Tests
// ===========================================================================
