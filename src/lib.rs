//! Resolve Swagger 2.0 (OpenAPI 2.0) specifications into self-contained,
//! validation-ready documents.
//!
//! A raw Swagger document leans on indirection: `$ref`s into other files,
//! `allOf` inheritance chains, discriminator-based polymorphism, vendor
//! extensions like `x-ms-paths` and `x-ms-parameterized-host`. Downstream
//! consumers — schema validators, example validators, semantic linters — are
//! much simpler when all of that is flattened away. [`resolve`] rewrites a
//! parsed document in place through an ordered pass pipeline:
//!
//! 1. fold `x-ms-paths` into `paths`;
//! 2. inline every cross-file `$ref`, splicing referenced entities into the
//!    host document;
//! 3. flatten `allOf` composition so each model carries the full union of
//!    its ancestors' properties;
//! 4. expand discriminator roots into explicit `oneOf` unions;
//! 5. seal composed models with `additionalProperties: false`;
//! 6. fold parameterized-host parameters into every operation;
//! 7. make "pure object" schemas explicitly permissive;
//! 8. rewrite nullable properties as `oneOf [T, null]`;
//! 9. model the implicit `CloudError` default response.
//!
//! The output preserves the input's external shape (same top-level keys,
//! same operations, same schemas by name). No validation is performed.
//!
//! ```no_run
//! use serde_json::json;
//! use swagger_resolver::{resolve, ResolverOptions};
//!
//! let spec = json!({
//!     "swagger": "2.0",
//!     "paths": {},
//!     "definitions": {
//!         "Animal": { "properties": { "id": { "type": "string" } } },
//!         "Cat": {
//!             "allOf": [ { "$ref": "#/definitions/Animal" } ],
//!             "properties": { "meow": { "type": "boolean" } }
//!         }
//!     }
//! });
//! let resolved = resolve(spec, "/specs/zoo.json", &ResolverOptions::default())?;
//! assert!(resolved["definitions"]["Cat"]["properties"].get("id").is_some());
//! # Ok::<(), swagger_resolver::ResolveSpecError>(())
//! ```
//!
//! External documents are fetched through the [`DocumentLoader`] trait;
//! [`DefaultLoader`] reads local files and, with the `resolve-http` feature
//! (on by default), `http(s)` URLs.

mod error;
mod loader;
mod options;
pub mod pointer;
mod poly_tree;
mod reference;
mod resolver;

mod passes;

pub use error::{ResolveError, ResolveSpecError};
pub use loader::{join_document_path, parent_dir, DefaultLoader, DocumentLoader, LoaderError};
pub use options::ResolverOptions;
pub use poly_tree::PolymorphicTree;
pub use reference::{collect_refs, RefSite, Reference};
pub use resolver::SpecResolver;

use serde_json::Value;

/// Resolve `spec`, loaded from `spec_path`, with the [`DefaultLoader`].
///
/// `spec_path` must be the absolute path or URL the document was loaded
/// from; relative `$ref`s resolve against its directory.
pub fn resolve(
    spec: Value,
    spec_path: &str,
    options: &ResolverOptions,
) -> Result<Value, ResolveSpecError> {
    resolve_with_loader(spec, spec_path, options, &DefaultLoader)
}

/// [`resolve`] with a caller-supplied [`DocumentLoader`].
pub fn resolve_with_loader(
    spec: Value,
    spec_path: &str,
    options: &ResolverOptions,
    loader: &dyn DocumentLoader,
) -> Result<Value, ResolveSpecError> {
    SpecResolver::new(spec, spec_path, options, loader)?.resolve()
}
