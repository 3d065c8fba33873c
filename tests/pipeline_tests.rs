//! Integration tests for the full resolution pipeline, driven through the
//! public API only — individual passes are never called directly.

use std::collections::HashMap;

use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use swagger_resolver::{
    collect_refs, pointer, resolve, resolve_with_loader, DocumentLoader, LoaderError, Reference,
    ResolverOptions,
};

/// Loader over a fixed path → document map, for cross-file fixtures.
struct StaticLoader(HashMap<String, Value>);

impl StaticLoader {
    fn new(docs: &[(&str, Value)]) -> Self {
        Self(
            docs.iter()
                .map(|(p, d)| (p.to_string(), d.clone()))
                .collect(),
        )
    }
}

impl DocumentLoader for StaticLoader {
    fn load(&self, path: &str) -> Result<Value, LoaderError> {
        self.0.get(path).cloned().ok_or_else(|| LoaderError::Io {
            path: path.to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })
    }
}

/// Every `$ref` in a resolved tree must be local and dereferenceable.
fn assert_refs_local_and_resolvable(tree: &Value) {
    for site in collect_refs(tree) {
        let reference = Reference::parse(&site.reference)
            .unwrap_or_else(|_| panic!("malformed ref at {}", site.location));
        assert!(
            reference.file_path.is_none(),
            "non-local ref `{}` at {}",
            site.reference,
            site.location
        );
        let local = reference.local_pointer.expect("local refs carry a pointer");
        assert!(
            pointer::get(tree, &local).is_some(),
            "dangling ref `{}` at {}",
            site.reference,
            site.location
        );
    }
}

// ── x-ms-paths unification ──────────────────────────────────────────────────

#[test]
fn test_x_ms_paths_folded_into_paths() {
    let spec = json!({
        "swagger": "2.0",
        "paths": { "/a": { "get": { "responses": { "200": { "description": "ok" } } } } },
        "x-ms-paths": { "/b?q=1": { "get": { "responses": { "200": { "description": "ok" } } } } }
    });

    let resolved = resolve(spec, "/specs/service.json", &ResolverOptions::default()).unwrap();

    let paths = resolved["paths"].as_object().unwrap();
    assert!(paths.contains_key("/a"));
    assert!(paths.contains_key("/b?q=1"));
}

// ── allOf composition ───────────────────────────────────────────────────────

#[test]
fn test_all_of_composition() {
    let spec = json!({
        "swagger": "2.0",
        "paths": {},
        "definitions": {
            "Animal": { "properties": { "id": { "type": "string" } } },
            "Cat": {
                "allOf": [ { "$ref": "#/definitions/Animal" } ],
                "properties": { "meow": { "type": "boolean" } },
                "required": ["meow"]
            }
        }
    });

    let resolved = resolve(spec, "/specs/zoo.json", &ResolverOptions::default()).unwrap();

    let cat = &resolved["definitions"]["Cat"];
    let props = cat["properties"].as_object().unwrap();
    assert!(props.contains_key("id"));
    assert!(props.contains_key("meow"));
    assert!(cat["required"].as_array().unwrap().contains(&json!("meow")));
    assert!(cat.get("allOf").is_none(), "allOf must be stripped after composition");
}

// ── Discriminator expansion ─────────────────────────────────────────────────

fn discriminator_spec() -> Value {
    json!({
        "swagger": "2.0",
        "paths": {
            "/animals": {
                "get": {
                    "responses": {
                        "200": { "schema": { "$ref": "#/definitions/Animal" } }
                    }
                }
            }
        },
        "definitions": {
            "Animal": {
                "discriminator": "kind",
                "properties": { "kind": { "type": "string" } },
                "required": ["kind"]
            },
            "Cat": {
                "allOf": [ { "$ref": "#/definitions/Animal" } ],
                "properties": { "meow": { "type": "boolean" } },
                "required": ["kind"]
            },
            "Dog": {
                "allOf": [ { "$ref": "#/definitions/Animal" } ],
                "properties": { "bark": { "type": "boolean" } },
                "required": ["kind"]
            }
        }
    })
}

#[test]
fn test_discriminator_expansion() {
    let resolved = resolve(
        discriminator_spec(),
        "/specs/zoo.json",
        &ResolverOptions::default(),
    )
    .unwrap();

    let schema = &resolved["paths"]["/animals"]["get"]["responses"]["200"]["schema"];
    let union = schema["oneOf"].as_array().expect("response ref becomes oneOf");
    let refs: Vec<&str> = union.iter().map(|v| v["$ref"].as_str().unwrap()).collect();
    assert_eq!(refs, vec!["#/definitions/Animal", "#/definitions/Cat", "#/definitions/Dog"]);

    assert_eq!(resolved["definitions"]["Animal"]["properties"]["kind"]["enum"], json!(["Animal"]));
    assert_eq!(resolved["definitions"]["Cat"]["properties"]["kind"]["enum"], json!(["Cat"]));
    assert_eq!(resolved["definitions"]["Dog"]["properties"]["kind"]["enum"], json!(["Dog"]));
}

#[test]
fn test_discriminator_enums_are_single_valued() {
    let resolved = resolve(
        discriminator_spec(),
        "/specs/zoo.json",
        &ResolverOptions::default(),
    )
    .unwrap();

    for (name, model) in resolved["definitions"].as_object().unwrap() {
        if let Some(discriminator) = model.get("discriminator").and_then(Value::as_str) {
            let enum_values = model["properties"][discriminator]["enum"]
                .as_array()
                .unwrap_or_else(|| panic!("{name} discriminator property must carry an enum"));
            assert_eq!(enum_values.len(), 1);
        }
    }
}

// ── Nullable rewriting ──────────────────────────────────────────────────────

#[test]
fn test_nullable_property_rewrites() {
    let spec = json!({
        "swagger": "2.0",
        "paths": {},
        "definitions": {
            "Explicit": {
                "properties": { "x": { "type": "integer", "x-nullable": true } },
                "required": ["x"]
            },
            "Optional": {
                "properties": { "x": { "type": "integer" } }
            },
            "Required": {
                "properties": { "x": { "type": "integer" } },
                "required": ["x"]
            }
        }
    });

    let resolved = resolve(spec, "/specs/service.json", &ResolverOptions::default()).unwrap();

    assert_eq!(
        resolved["definitions"]["Explicit"]["properties"]["x"],
        json!({ "oneOf": [ { "type": "integer", "x-nullable": true }, { "type": "null" } ] })
    );
    assert_eq!(
        resolved["definitions"]["Optional"]["properties"]["x"],
        json!({ "oneOf": [ { "type": "integer" }, { "type": "null" } ] })
    );
    assert_eq!(
        resolved["definitions"]["Required"]["properties"]["x"],
        json!({ "type": "integer" })
    );
}

// ── Default response injection ──────────────────────────────────────────────

#[test]
fn test_implicit_default_response_injected() {
    let spec = json!({
        "swagger": "2.0",
        "paths": {
            "/a": { "get": { "responses": { "200": { "description": "ok" } } } }
        }
    });
    let options = ResolverOptions {
        should_model_implicit_default_response: Some(true),
        ..ResolverOptions::default()
    };

    let resolved = resolve(spec, "/specs/service.json", &options).unwrap();

    assert!(resolved["definitions"].get("CloudError").is_some());
    assert!(resolved["definitions"].get("CloudErrorWrapper").is_some());
    assert_eq!(
        resolved["paths"]["/a"]["get"]["responses"]["default"]["schema"]["$ref"],
        "#/definitions/CloudErrorWrapper"
    );
    assert_refs_local_and_resolvable(&resolved);
}

// ── Cross-file resolution with transitive allOf pickup ──────────────────────

#[test]
fn test_cross_file_transitive_all_of_pickup() {
    let loader = StaticLoader::new(&[(
        "/specs/ext.json",
        json!({
            "definitions": {
                "Pipeline": {
                    "properties": { "name": { "type": "string" } }
                },
                "Activity": {
                    "properties": { "activityKind": { "type": "string" } }
                },
                "CopyActivity": {
                    "allOf": [ { "$ref": "#/definitions/Activity" } ],
                    "properties": { "source": { "type": "string" } }
                }
            }
        }),
    )]);
    // The host carries its own definitions, so allOf composition defaults on
    // and also covers the spliced models.
    let spec = json!({
        "swagger": "2.0",
        "paths": {
            "/pipelines": {
                "put": {
                    "parameters": [
                        {
                            "name": "pipeline",
                            "in": "body",
                            "schema": { "$ref": "./ext.json#/definitions/Pipeline" }
                        }
                    ],
                    "responses": { "200": { "description": "ok" } }
                }
            }
        },
        "definitions": {
            "ErrorResponse": { "properties": { "message": { "type": "string" } } }
        }
    });

    let resolved = resolve_with_loader(
        spec,
        "/specs/host.json",
        &ResolverOptions::default(),
        &loader,
    )
    .unwrap();

    let definitions = resolved["definitions"].as_object().unwrap();
    assert!(definitions.contains_key("Pipeline"));
    assert!(definitions.contains_key("CopyActivity"), "picked up via its allOf");
    assert!(definitions.contains_key("Activity"), "base of the picked-up child");
    // The body ref is now purely local.
    assert_eq!(
        resolved["paths"]["/pipelines"]["put"]["parameters"][0]["schema"]["$ref"],
        "#/definitions/Pipeline"
    );
    // Composition ran over the spliced models too.
    assert!(resolved["definitions"]["CopyActivity"]["properties"]
        .as_object()
        .unwrap()
        .contains_key("activityKind"));
    assert_refs_local_and_resolvable(&resolved);
}

// ── Option gating ───────────────────────────────────────────────────────────

#[test]
fn test_all_passes_disabled_only_unifies_paths() {
    let spec = json!({
        "swagger": "2.0",
        "paths": { "/a": { "get": { "responses": {} } } },
        "x-ms-paths": { "/b?q": { "get": { "responses": {} } } },
        "definitions": {
            "Cat": {
                "allOf": [ { "$ref": "#/definitions/Animal" } ],
                "properties": { "meow": { "type": "boolean" } }
            },
            "Animal": { "discriminator": "kind", "properties": { "kind": { "type": "string" } } }
        }
    });

    let mut expected = spec.clone();
    expected["paths"]
        .as_object_mut()
        .unwrap()
        .insert("/b?q".to_string(), json!({ "get": { "responses": {} } }));

    let resolved = resolve(spec, "/specs/service.json", &ResolverOptions::all_off()).unwrap();
    assert_eq!(resolved, expected);
}

// ── Idempotence ─────────────────────────────────────────────────────────────

#[test]
fn test_resolution_is_idempotent() {
    let loader = StaticLoader::new(&[(
        "/specs/common.json",
        json!({
            "definitions": {
                "Page": { "properties": { "nextLink": { "type": "string" } } }
            }
        }),
    )]);
    let spec = json!({
        "swagger": "2.0",
        "x-ms-parameterized-host": {
            "hostTemplate": "{account}.api.example.org",
            "parameters": [
                { "name": "account", "in": "path", "required": true, "type": "string" }
            ]
        },
        "paths": {
            "/animals": {
                "get": {
                    "parameters": [ { "name": "top", "in": "query", "type": "integer" } ],
                    "responses": {
                        "200": { "schema": { "$ref": "#/definitions/Animal" } }
                    }
                }
            }
        },
        "x-ms-paths": {
            "/animals?view=page": {
                "get": {
                    "responses": {
                        "200": { "schema": { "$ref": "./common.json#/definitions/Page" } }
                    }
                }
            }
        },
        "definitions": {
            "Animal": {
                "discriminator": "kind",
                "properties": { "kind": { "type": "string" } },
                "required": ["kind"]
            },
            "Cat": {
                "allOf": [ { "$ref": "#/definitions/Animal" } ],
                "properties": { "meow": { "type": "boolean" } },
                "required": ["kind"]
            }
        }
    });
    let options = ResolverOptions {
        should_model_implicit_default_response: Some(true),
        ..ResolverOptions::default()
    };

    let once = resolve_with_loader(spec, "/specs/host.json", &options, &loader).unwrap();
    let twice = resolve_with_loader(once.clone(), "/specs/host.json", &options, &loader).unwrap();

    assert_eq!(twice, once);
    assert_refs_local_and_resolvable(&once);
}

// ── Composed property supersets ─────────────────────────────────────────────

#[test]
fn test_composed_models_contain_ancestor_properties() {
    let spec = json!({
        "swagger": "2.0",
        "paths": {},
        "definitions": {
            "A": { "properties": { "a": { "type": "string" } } },
            "B": {
                "allOf": [ { "$ref": "#/definitions/A" } ],
                "properties": { "b": { "type": "string" } }
            },
            "C": {
                "allOf": [ { "$ref": "#/definitions/B" } ],
                "properties": { "c": { "type": "string" } }
            }
        }
    });

    let resolved = resolve(spec, "/specs/service.json", &ResolverOptions::default()).unwrap();

    for (name, ancestors) in [("B", vec!["a"]), ("C", vec!["a", "b"])] {
        let props = resolved["definitions"][name]["properties"].as_object().unwrap();
        for ancestor_key in ancestors {
            assert!(
                props.contains_key(ancestor_key),
                "{name} must inherit `{ancestor_key}`"
            );
        }
        assert!(resolved["definitions"][name].get("allOf").is_none());
    }
}
