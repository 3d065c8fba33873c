//! Resolution options and their effective defaults.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options for a [`resolve`](crate::resolve) call.
///
/// Every flag is optional; unset flags take the defaults described on each
/// field, several of which depend on the document being resolved (whether it
/// has a `definitions` object) or on other flags. [`ResolverOptions::effective`]
/// computes the final flag set once per call.
///
/// ## Serialization format
///
/// Fields are serialized in `camelCase` (`shouldResolveRelativePaths`, …),
/// matching the convention of the Swagger tooling this crate interoperates
/// with. This naming is part of the public API contract for config files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResolverOptions {
    /// Inline cross-file `$ref`s. Default: `true`.
    pub should_resolve_relative_paths: Option<bool>,
    /// Include `x-ms-examples` subtrees when inlining whole files.
    /// Default: `true`; forced `false` when relative-path resolution is off.
    pub should_resolve_xms_examples: Option<bool>,
    /// Flatten `allOf` composition. Default: `true` iff the document has a
    /// `definitions` key. Forced `true` when discriminator expansion is on.
    pub should_resolve_all_of: Option<bool>,
    /// Close open objects (`additionalProperties: false`) on models with
    /// declared properties. Default: follows `should_resolve_all_of`.
    pub should_set_additional_properties_false: Option<bool>,
    /// Relax untyped/empty object schemas to accept any value.
    /// Default: `true`.
    pub should_resolve_pure_objects: Option<bool>,
    /// Expand discriminator roots into `oneOf` unions.
    /// Default: follows `should_resolve_all_of`.
    pub should_resolve_discriminator: Option<bool>,
    /// Fold `x-ms-parameterized-host` parameters into every operation.
    /// Default: `true`.
    pub should_resolve_parameterized_host: Option<bool>,
    /// Rewrite nullable properties as `oneOf [T, null]`.
    /// Default: follows `should_resolve_all_of`.
    pub should_resolve_nullable_types: Option<bool>,
    /// Inject the canonical `CloudError` default response into operations
    /// that lack one. Default: `false`.
    pub should_model_implicit_default_response: Option<bool>,
}

/// The fully-defaulted flag set driving one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct EffectiveOptions {
    pub resolve_relative_paths: bool,
    pub resolve_xms_examples: bool,
    pub resolve_all_of: bool,
    pub set_additional_properties_false: bool,
    pub resolve_pure_objects: bool,
    pub resolve_discriminator: bool,
    pub resolve_parameterized_host: bool,
    pub resolve_nullable_types: bool,
    pub model_implicit_default_response: bool,
}

impl ResolverOptions {
    /// Apply defaults and interaction rules against the document to resolve.
    ///
    /// Interactions:
    /// - relative-path resolution off forces `x-ms-examples` inlining off;
    /// - discriminator expansion forces `allOf` composition on;
    /// - the `allOf`-derived defaults use the post-forcing value.
    pub(crate) fn effective(&self, spec: &Value) -> EffectiveOptions {
        let resolve_relative_paths = self.should_resolve_relative_paths.unwrap_or(true);
        let resolve_xms_examples = if resolve_relative_paths {
            self.should_resolve_xms_examples.unwrap_or(true)
        } else {
            false
        };

        let has_definitions = spec.get("definitions").is_some();
        let mut resolve_all_of = self.should_resolve_all_of.unwrap_or(has_definitions);
        let resolve_discriminator = self.should_resolve_discriminator.unwrap_or(resolve_all_of);
        if resolve_discriminator {
            resolve_all_of = true;
        }

        EffectiveOptions {
            resolve_relative_paths,
            resolve_xms_examples,
            resolve_all_of,
            set_additional_properties_false: self
                .should_set_additional_properties_false
                .unwrap_or(resolve_all_of),
            resolve_pure_objects: self.should_resolve_pure_objects.unwrap_or(true),
            resolve_discriminator,
            resolve_parameterized_host: self.should_resolve_parameterized_host.unwrap_or(true),
            resolve_nullable_types: self.should_resolve_nullable_types.unwrap_or(resolve_all_of),
            model_implicit_default_response: self
                .should_model_implicit_default_response
                .unwrap_or(false),
        }
    }

    /// Convenience constructor disabling every optional pass.
    pub fn all_off() -> Self {
        Self {
            should_resolve_relative_paths: Some(false),
            should_resolve_xms_examples: Some(false),
            should_resolve_all_of: Some(false),
            should_set_additional_properties_false: Some(false),
            should_resolve_pure_objects: Some(false),
            should_resolve_discriminator: Some(false),
            should_resolve_parameterized_host: Some(false),
            should_resolve_nullable_types: Some(false),
            should_model_implicit_default_response: Some(false),
        }
    }
}
