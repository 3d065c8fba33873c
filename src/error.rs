//! Error types for specification resolution.

use thiserror::Error;

use crate::loader::LoaderError;

/// Umbrella error returned by [`resolve`](crate::resolve).
///
/// Carries the path of the document that was being resolved and the failure
/// that aborted the pipeline as its `source`. No partial tree is returned
/// alongside this error; the input is treated as consumed.
#[derive(Debug, Error)]
#[error("failed to resolve spec `{spec_path}`: {source}")]
pub struct ResolveSpecError {
    /// Absolute path or URL of the document being resolved.
    pub spec_path: String,
    /// The pass failure that aborted the pipeline.
    #[source]
    pub source: ResolveError,
}

impl ResolveSpecError {
    pub(crate) fn new(spec_path: impl Into<String>, source: ResolveError) -> Self {
        Self {
            spec_path: spec_path.into(),
            source,
        }
    }
}

/// A failure inside a single resolution pass.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A pass or function was entered with an argument that violates its
    /// contract (empty name, non-object tree, empty document path).
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// A `$ref` string that parses to neither a file component nor a local
    /// pointer.
    #[error("malformed $ref `{reference}`")]
    MalformedReference { reference: String },

    /// A JSON pointer that should dereference (an `allOf` parent, a splice
    /// target inside an external file) does not exist.
    #[error("unresolvable pointer `{pointer}`")]
    UnresolvablePointer { pointer: String },

    /// An external document could not be loaded.
    #[error("failed to load document `{path}`")]
    Loader {
        path: String,
        #[source]
        source: LoaderError,
    },
}

impl ResolveError {
    pub(crate) fn invalid_argument(message: impl Into<String>) -> Self {
        ResolveError::InvalidArgument {
            message: message.into(),
        }
    }
}
