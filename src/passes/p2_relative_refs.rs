//! Pass 2: cross-file `$ref` inlining.
//!
//! Every `$ref` with a file component is resolved against the host document's
//! directory, its target is loaded, and the referenced content is physically
//! copied into the host tree:
//!
//! - a ref with **no local pointer** imports the whole external document in
//!   place of the referencing node (gated for `x-ms-examples` subtrees);
//! - a ref **with a local pointer** is rewritten to a purely local `#...`
//!   form and the referenced entity is spliced into the host tree under the
//!   same pointer it had in its source file, then recursively resolved with
//!   the external file as base. External definitions carrying `allOf` are
//!   spliced pre-emptively so transitively-required base models are captured
//!   even when no surviving ref names them.
//!
//! `visited_entities` breaks cycles between mutually-referencing files: a
//! pointer already spliced is never spliced again. Refs are processed
//! strictly sequentially in scanner order; every step mutates the shared
//! tree.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::ResolveError;
use crate::loader::{self, DocumentLoader};
use crate::pointer;
use crate::reference::{collect_refs, Reference};

/// Which refs a resolution sweep visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RefFilter {
    /// Only refs with a file component (the top-level sweep).
    External,
    /// Every ref. Used when recursing into a spliced subtree: what was local
    /// in the external file is still relative from the host's perspective.
    All,
}

/// Shared state for one relative-resolution sweep tree.
pub(crate) struct RefContext<'a> {
    pub loader: &'a dyn DocumentLoader,
    /// Local pointers already spliced into the host tree, with the value
    /// each held at insertion. Monotonic; never cleared mid-resolve.
    pub visited_entities: &'a mut HashMap<String, Value>,
    pub resolve_xms_examples: bool,
    /// Per-resolve document cache; loader results are immutable.
    docs: HashMap<String, Value>,
}

impl<'a> RefContext<'a> {
    pub fn new(
        loader: &'a dyn DocumentLoader,
        visited_entities: &'a mut HashMap<String, Value>,
        resolve_xms_examples: bool,
    ) -> Self {
        Self {
            loader,
            visited_entities,
            resolve_xms_examples,
            docs: HashMap::new(),
        }
    }

    fn load(&mut self, path: &str) -> Result<Value, ResolveError> {
        if let Some(doc) = self.docs.get(path) {
            return Ok(doc.clone());
        }
        tracing::debug!(path, "loading external document");
        let doc = self
            .loader
            .load(path)
            .map_err(|source| ResolveError::Loader {
                path: path.to_string(),
                source,
            })?;
        self.docs.insert(path.to_string(), doc.clone());
        Ok(doc)
    }
}

/// Resolve refs under `spec[subtree]`, treating `doc_path` as the base
/// document for file components found there.
pub(crate) fn resolve_relative_refs(
    spec: &mut Value,
    subtree: &str,
    doc_path: &str,
    filter: RefFilter,
    ctx: &mut RefContext<'_>,
) -> Result<(), ResolveError> {
    let Some(root) = pointer::get(spec, subtree) else {
        return Ok(());
    };
    let sites = collect_refs(root);
    let doc_dir = loader::parent_dir(doc_path);

    for site in sites {
        let location = format!("{subtree}{}", site.location);

        // An earlier splice in this sweep may have replaced this node.
        let Some(current) = pointer::get(spec, &location) else {
            continue;
        };
        let Some(ref_str) = current.get("$ref").and_then(Value::as_str) else {
            continue;
        };
        let reference = Reference::parse(ref_str)?;

        if filter == RefFilter::External && !reference.is_external() {
            continue;
        }

        let external_path = match &reference.file_path {
            Some(file) => loader::join_document_path(&doc_dir, file),
            // Under `All`, a local ref points back into the base document.
            None => doc_path.to_string(),
        };

        match reference.local_pointer {
            None => resolve_whole_file(spec, &location, &external_path, ctx)?,
            Some(local) => {
                resolve_entity(spec, &location, &local, &external_path, ctx)?;
            }
        }
    }
    Ok(())
}

/// Whole-file import: the referencing node is replaced by the external
/// document. `x-ms-examples` subtrees are skipped when example inlining is
/// off (case-insensitive substring match on the location pointer).
fn resolve_whole_file(
    spec: &mut Value,
    location: &str,
    external_path: &str,
    ctx: &mut RefContext<'_>,
) -> Result<(), ResolveError> {
    if !ctx.resolve_xms_examples && location.to_ascii_lowercase().contains("x-ms-examples") {
        return Ok(());
    }
    let loaded = ctx.load(external_path)?;
    tracing::trace!(location, path = external_path, "inlined whole document");
    pointer::set(spec, location, loaded).map_err(ResolveError::invalid_argument)
}

/// Pointered import: localize the `$ref`, splice the entity under its own
/// pointer, then resolve the spliced subtree against the external document.
fn resolve_entity(
    spec: &mut Value,
    location: &str,
    local: &str,
    external_path: &str,
    ctx: &mut RefContext<'_>,
) -> Result<(), ResolveError> {
    if let Some(obj) = pointer::get_mut(spec, location).and_then(Value::as_object_mut) {
        obj.insert("$ref".to_string(), Value::String(format!("#{local}")));
    }

    if ctx.visited_entities.contains_key(local) {
        return Ok(());
    }

    let external = ctx.load(external_path)?;
    let entity = pointer::get(&external, local)
        .cloned()
        .ok_or_else(|| ResolveError::UnresolvablePointer {
            pointer: format!("{external_path}#{local}"),
        })?;

    pointer::set(spec, local, entity.clone()).map_err(ResolveError::invalid_argument)?;
    ctx.visited_entities.insert(local.to_string(), entity);
    tracing::trace!(pointer = local, path = external_path, "spliced entity");

    resolve_relative_refs(spec, local, external_path, RefFilter::All, ctx)?;

    splice_all_of_definitions(spec, &external, external_path, ctx)
}

/// Pre-emptively splice every external top-level definition that uses
/// `allOf` and has not been visited. A composed child in the external file
/// may require a base model no surviving ref mentions; without this pickup
/// it would be lost.
fn splice_all_of_definitions(
    spec: &mut Value,
    external: &Value,
    external_path: &str,
    ctx: &mut RefContext<'_>,
) -> Result<(), ResolveError> {
    let Some(definitions) = external.get("definitions").and_then(Value::as_object) else {
        return Ok(());
    };
    // Pointers are computed up front: `spec` is mutated while iterating.
    let pending: Vec<(String, Value)> = definitions
        .iter()
        .filter(|(_, def)| def.get("allOf").is_some())
        .map(|(name, def)| (pointer::build("/definitions", &[name]), def.clone()))
        .filter(|(ptr, _)| !ctx.visited_entities.contains_key(ptr))
        .collect();

    for (ptr, def) in pending {
        if ctx.visited_entities.contains_key(&ptr) {
            continue;
        }
        pointer::set(spec, &ptr, def.clone()).map_err(ResolveError::invalid_argument)?;
        ctx.visited_entities.insert(ptr.clone(), def);
        tracing::trace!(pointer = %ptr, path = external_path, "spliced allOf definition");
        resolve_relative_refs(spec, &ptr, external_path, RefFilter::All, ctx)?;
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
