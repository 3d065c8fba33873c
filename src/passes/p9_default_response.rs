//! Pass 9: implicit default-response modeling.
//!
//! ARM services respond to failed requests with the canonical `CloudError`
//! body whether or not the spec says so. This pass makes the implicit
//! contract explicit: it injects the canonical `CloudError` /
//! `CloudErrorWrapper` definitions when absent and adds a `default` response
//! referencing the wrapper to every operation that lacks one.

use serde_json::{json, Value};

use super::HTTP_METHODS;
use crate::error::ResolveError;
use crate::pointer;

/// The canonical error body shared by all ARM services.
fn cloud_error() -> Value {
    json!({
        "type": "object",
        "properties": {
            "code": {
                "type": "string",
                "description": "An identifier for the error. Codes are invariant and are intended to be consumed programmatically."
            },
            "message": {
                "type": "string",
                "description": "A message describing the error, intended to be suitable for display in a user interface."
            },
            "target": {
                "type": "string",
                "description": "The target of the particular error. For example, the name of the property in error.",
                "x-nullable": false
            },
            "details": {
                "type": "array",
                "items": { "$ref": "#/definitions/CloudError" },
                "description": "A list of additional details about the error.",
                "x-nullable": false
            }
        },
        "required": ["code", "message"],
        "additionalProperties": false
    })
}

/// The top-level envelope: `{ "error": { ... } }`.
fn cloud_error_wrapper() -> Value {
    json!({
        "type": "object",
        "properties": {
            "error": { "$ref": "#/definitions/CloudError", "x-nullable": false }
        },
        "additionalProperties": false
    })
}

/// The response object inserted as the `default` key.
fn cloud_error_response() -> Value {
    json!({
        "description": "The default error response.",
        "schema": { "$ref": "#/definitions/CloudErrorWrapper" }
    })
}

pub(crate) fn model_implicit_default_response(spec: &mut Value) -> Result<(), ResolveError> {
    if pointer::get(spec, "/definitions/CloudError").is_none() {
        pointer::set(spec, "/definitions/CloudErrorWrapper", cloud_error_wrapper())
            .map_err(ResolveError::invalid_argument)?;
        pointer::set(spec, "/definitions/CloudError", cloud_error())
            .map_err(ResolveError::invalid_argument)?;
    }

    let Some(paths) = spec.get_mut("paths").and_then(Value::as_object_mut) else {
        return Ok(());
    };
    for item in paths.values_mut() {
        let Some(item) = item.as_object_mut() else {
            continue;
        };
        for method in HTTP_METHODS {
            let Some(responses) = item
                .get_mut(*method)
                .and_then(|op| op.get_mut("responses"))
                .and_then(Value::as_object_mut)
            else {
                continue;
            };
            if !responses.contains_key("default") {
                responses.insert("default".to_string(), cloud_error_response());
            }
        }
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_injects_definitions_and_default() {
        let mut spec = json!({
            "paths": {
                "/a": { "get": { "responses": { "200": { "description": "ok" } } } }
            }
        });
        model_implicit_default_response(&mut spec).unwrap();

        assert!(spec["definitions"].get("CloudError").is_some());
        assert!(spec["definitions"].get("CloudErrorWrapper").is_some());
        assert_eq!(
            spec["paths"]["/a"]["get"]["responses"]["default"]["schema"]["$ref"],
            "#/definitions/CloudErrorWrapper"
        );
        // Existing responses untouched.
        assert_eq!(spec["paths"]["/a"]["get"]["responses"]["200"]["description"], "ok");
    }

    #[test]
    fn test_existing_cloud_error_definition_kept() {
        let mut spec = json!({
            "definitions": { "CloudError": { "type": "object", "description": "custom" } },
            "paths": {}
        });
        model_implicit_default_response(&mut spec).unwrap();

        assert_eq!(spec["definitions"]["CloudError"]["description"], "custom");
        // The wrapper is only injected together with the canonical pair.
        assert!(spec["definitions"].get("CloudErrorWrapper").is_none());
    }

    #[test]
    fn test_existing_default_response_kept() {
        let mut spec = json!({
            "paths": {
                "/a": {
                    "get": {
                        "responses": {
                            "default": { "description": "service-specific error" }
                        }
                    }
                }
            }
        });
        model_implicit_default_response(&mut spec).unwrap();
        assert_eq!(
            spec["paths"]["/a"]["get"]["responses"]["default"]["description"],
            "service-specific error"
        );
    }

    #[test]
    fn test_operation_without_responses_untouched() {
        let mut spec = json!({ "paths": { "/a": { "get": {} } } });
        model_implicit_default_response(&mut spec).unwrap();
        assert!(spec["paths"]["/a"]["get"].get("responses").is_none());
    }

    #[test]
    fn test_cloud_error_details_self_reference() {
        let err = cloud_error();
        assert_eq!(err["properties"]["details"]["items"]["$ref"], "#/definitions/CloudError");
        assert_eq!(err["required"], json!(["code", "message"]));
    }
}
