//! Pass 6: parameterized-host fold-in.
//!
//! `x-ms-parameterized-host` declares host-template parameters (subscription
//! domain, region, …) that apply to every operation but live outside the
//! `paths` tree where validators look for them. This pass appends the host
//! parameter array to each operation's `parameters`, creating the array where
//! absent. The extension itself is left in place.

use serde_json::Value;

use super::HTTP_METHODS;

pub(crate) fn resolve_parameterized_host(spec: &mut Value) {
    let host_params = match spec
        .get("x-ms-parameterized-host")
        .and_then(|h| h.get("parameters"))
        .and_then(Value::as_array)
    {
        Some(params) if !params.is_empty() => params.clone(),
        _ => return,
    };

    let Some(paths) = spec.get_mut("paths").and_then(Value::as_object_mut) else {
        return;
    };

    for item in paths.values_mut() {
        let Some(item) = item.as_object_mut() else {
            continue;
        };
        for method in HTTP_METHODS {
            let Some(operation) = item.get_mut(*method).and_then(Value::as_object_mut) else {
                continue;
            };
            let parameters = operation
                .entry("parameters")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(parameters) = parameters.as_array_mut() {
                // A host parameter already folded in (a re-resolved
                // document) must not be appended twice.
                for host_param in &host_params {
                    if !parameters.contains(host_param) {
                        parameters.push(host_param.clone());
                    }
                }
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
