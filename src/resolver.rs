//! The resolution coordinator.
//!
//! [`SpecResolver`] owns the spec tree exclusively for the duration of one
//! resolve call, together with the effective option set and the two
//! monotonic caches shared across passes (`visited_entities` for cross-file
//! splices, `resolved_all_of_models` for composition). It runs the passes in
//! a fixed order — later passes depend on earlier ones having completed —
//! and surfaces any pass failure as a [`ResolveSpecError`] carrying the
//! document path.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::{ResolveError, ResolveSpecError};
use crate::loader::DocumentLoader;
use crate::options::{EffectiveOptions, ResolverOptions};
use crate::passes::{
    p1_xms_paths, p2_relative_refs, p3_composition, p4_discriminator, p5_additional_properties,
    p6_parameterized_host, p7_pure_objects, p8_nullable, p9_default_response,
};

pub struct SpecResolver<'a> {
    spec: Value,
    spec_path: String,
    options: EffectiveOptions,
    loader: &'a dyn DocumentLoader,
    /// Local pointers already spliced from external files; breaks cycles
    /// between mutually-referencing documents. Monotonic.
    visited_entities: HashMap<String, Value>,
    /// Model pointers already composed; breaks cyclic `allOf` re-entry.
    /// Monotonic.
    resolved_all_of_models: HashMap<String, Value>,
}

impl<'a> SpecResolver<'a> {
    /// Validate the inputs and fix the effective option set against `spec`.
    pub fn new(
        spec: Value,
        spec_path: &str,
        options: &ResolverOptions,
        loader: &'a dyn DocumentLoader,
    ) -> Result<Self, ResolveSpecError> {
        if !spec.is_object() {
            return Err(ResolveSpecError::new(
                spec_path,
                ResolveError::invalid_argument("the spec to resolve must be a JSON object"),
            ));
        }
        if spec_path.is_empty() {
            return Err(ResolveSpecError::new(
                spec_path,
                ResolveError::invalid_argument("the spec path must be a non-empty string"),
            ));
        }
        let options = options.effective(&spec);
        Ok(Self {
            spec,
            spec_path: spec_path.to_string(),
            options,
            loader,
            visited_entities: HashMap::new(),
            resolved_all_of_models: HashMap::new(),
        })
    }

    /// Run the pipeline and return the rewritten tree.
    ///
    /// On error the partially-edited tree is dropped; no partial result is
    /// returned.
    pub fn resolve(mut self) -> Result<Value, ResolveSpecError> {
        match self.run_pipeline() {
            Ok(()) => Ok(self.spec),
            Err(source) => Err(ResolveSpecError::new(self.spec_path, source)),
        }
    }

    fn run_pipeline(&mut self) -> Result<(), ResolveError> {
        tracing::debug!(pass = "unify_xms_paths", "running");
        p1_xms_paths::unify_xms_paths(&mut self.spec);

        if self.options.resolve_relative_paths {
            tracing::debug!(pass = "resolve_relative_paths", "running");
            let mut ctx = p2_relative_refs::RefContext::new(
                self.loader,
                &mut self.visited_entities,
                self.options.resolve_xms_examples,
            );
            p2_relative_refs::resolve_relative_refs(
                &mut self.spec,
                "",
                &self.spec_path,
                p2_relative_refs::RefFilter::External,
                &mut ctx,
            )?;
        }

        if self.options.resolve_all_of {
            tracing::debug!(pass = "resolve_all_of", "running");
            p3_composition::resolve_all_of_in_definitions(
                &mut self.spec,
                &mut self.resolved_all_of_models,
            )?;
        }

        if self.options.resolve_discriminator {
            tracing::debug!(pass = "resolve_discriminator", "running");
            p4_discriminator::expand_discriminators(&mut self.spec)?;
        }

        // Child discovery above needed the allOf arrays; only now is it safe
        // to strip them.
        if self.options.resolve_all_of {
            tracing::debug!(pass = "delete_references_to_all_of", "running");
            p3_composition::delete_references_to_all_of(&mut self.spec);
        }

        if self.options.set_additional_properties_false {
            tracing::debug!(pass = "set_additional_properties_false", "running");
            p5_additional_properties::set_additional_properties_false(&mut self.spec, false);
        }

        if self.options.resolve_parameterized_host {
            tracing::debug!(pass = "resolve_parameterized_host", "running");
            p6_parameterized_host::resolve_parameterized_host(&mut self.spec);
        }

        if self.options.resolve_pure_objects {
            tracing::debug!(pass = "resolve_pure_objects", "running");
            p7_pure_objects::relax_pure_objects(&mut self.spec);
        }

        if self.options.resolve_nullable_types {
            tracing::debug!(pass = "resolve_nullable_types", "running");
            p8_nullable::resolve_nullable_types(&mut self.spec);
        }

        if self.options.model_implicit_default_response {
            tracing::debug!(pass = "model_implicit_default_response", "running");
            p9_default_response::model_implicit_default_response(&mut self.spec)?;
        }

        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
