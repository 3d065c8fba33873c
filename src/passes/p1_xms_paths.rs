//! Pass 1: `x-ms-paths` unification.
//!
//! `x-ms-paths` holds path templates that are illegal under vanilla Swagger
//! (query strings in the key, e.g. `/pets?kind=cat`). Downstream consumers
//! only look at `paths`, so each entry is folded in. The two key sets are
//! disjoint by contract; on collision the `paths` entry wins and the
//! conflicting `x-ms-paths` entry is discarded. The extension key itself is
//! left in place.

use serde_json::{Map, Value};

/// Fold `x-ms-paths` entries into `paths`. Unconditional pipeline step.
pub(crate) fn unify_xms_paths(spec: &mut Value) {
    let Some(obj) = spec.as_object_mut() else {
        return;
    };

    let extension_paths = match obj.get("x-ms-paths").and_then(Value::as_object) {
        Some(ext) if !ext.is_empty() => ext.clone(),
        _ => return,
    };

    let paths = obj
        .entry("paths")
        .or_insert_with(|| Value::Object(Map::new()));
    let Some(paths) = paths.as_object_mut() else {
        return;
    };

    for (template, item) in extension_paths {
        if !paths.contains_key(&template) {
            paths.insert(template, item);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
