//! JSON-Reference parsing and the `$ref` scanner.
//!
//! A Swagger `$ref` string has the shape `[file][#pointer]`: a relative or
//! absolute document path, a local JSON pointer, or both. [`Reference::parse`]
//! splits it into those components; [`collect_refs`] walks a tree and yields
//! every `$ref` together with the pointer of the object holding it, in
//! deterministic depth-first order.

use serde_json::Value;

use crate::error::ResolveError;
use crate::pointer;

/// Parsed form of a `$ref` string. At least one component is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The document path portion, e.g. `./other.json`. `None` for local refs.
    pub file_path: Option<String>,
    /// The fragment portion as a bare pointer, e.g. `/definitions/Cat`.
    /// `None` for whole-file refs.
    pub local_pointer: Option<String>,
}

impl Reference {
    /// Parse a `$ref` string.
    ///
    /// - `#/foo/bar` → `(None, Some("/foo/bar"))`
    /// - `./other.json` → `(Some("./other.json"), None)`
    /// - `./other.json#/defs/X` → `(Some("./other.json"), Some("/defs/X"))`
    ///
    /// A string yielding neither component (empty, or a bare `#`) is a
    /// [`ResolveError::MalformedReference`], and so is an anchor-style
    /// fragment (`#Foo`): only JSON Pointer fragments are supported.
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        let (file, fragment) = match reference.split_once('#') {
            Some((file, fragment)) => (file, fragment),
            None => (reference, ""),
        };

        let file_path = if file.is_empty() {
            None
        } else {
            Some(file.to_string())
        };
        let local_pointer = if fragment.is_empty() {
            None
        } else if !fragment.starts_with('/') {
            return Err(ResolveError::MalformedReference {
                reference: reference.to_string(),
            });
        } else {
            Some(fragment.to_string())
        };

        if file_path.is_none() && local_pointer.is_none() {
            return Err(ResolveError::MalformedReference {
                reference: reference.to_string(),
            });
        }
        Ok(Self {
            file_path,
            local_pointer,
        })
    }

    /// Whether this reference crosses a document boundary.
    pub fn is_external(&self) -> bool {
        self.file_path.is_some()
    }
}

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// A `$ref` occurrence: the pointer of the object carrying the `$ref` key,
/// and the reference string itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefSite {
    /// Bare JSON pointer of the object that holds the `$ref` key.
    pub location: String,
    /// The `$ref` string value.
    pub reference: String,
}

/// Collect every `$ref` in `tree`, depth-first, objects in key insertion
/// order and arrays by index. Non-string `$ref` values are ignored.
pub fn collect_refs(tree: &Value) -> Vec<RefSite> {
    let mut sites = Vec::new();
    walk(tree, "", &mut sites);
    sites
}

fn walk(node: &Value, location: &str, sites: &mut Vec<RefSite>) {
    match node {
        Value::Object(obj) => {
            if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                sites.push(RefSite {
                    location: location.to_string(),
                    reference: reference.to_string(),
                });
            }
            for (key, child) in obj {
                walk(child, &pointer::build(location, &[key]), sites);
            }
        }
        Value::Array(arr) => {
            for (i, child) in arr.iter().enumerate() {
                walk(child, &pointer::build(location, &[&i.to_string()]), sites);
            }
        }
        _ => {}
    }
}

// ===========================================================================
// Tests
// ===========================================================================
