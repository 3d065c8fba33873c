//! External document loading.
//!
//! The resolver consumes documents through the [`DocumentLoader`] trait and
//! never touches the filesystem or network itself. [`DefaultLoader`] is the
//! stock implementation: local files via `std::fs`, `http`/`https` URLs via
//! blocking `reqwest` behind the `resolve-http` cargo feature.
//!
//! All loading is blocking; the resolver issues loads strictly sequentially.
//! Loaded documents are treated as immutable — the resolver copies subobjects
//! out of them rather than aliasing.

use std::path::{Component, Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

/// Failure to produce a parsed document from a path or URL.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("I/O error reading `{path}`")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{path}` is not valid JSON")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[cfg(feature = "resolve-http")]
    #[error("HTTP request for `{url}` failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot load `{scheme}` URLs (enable the `resolve-http` feature or supply a custom loader)")]
    UnsupportedScheme { scheme: String },
}

/// Parse a document at an absolute path or URL into a JSON tree.
///
/// Implementations must accept local file paths and `http(s)` URLs (or fail
/// with [`LoaderError::UnsupportedScheme`]). They may cache internally;
/// results are never mutated by the resolver.
pub trait DocumentLoader {
    fn load(&self, path: &str) -> Result<Value, LoaderError>;
}

/// The stock loader: filesystem plus (feature-gated) blocking HTTP.
#[derive(Debug, Default)]
pub struct DefaultLoader;

impl DocumentLoader for DefaultLoader {
    fn load(&self, path: &str) -> Result<Value, LoaderError> {
        if let Some(scheme) = url_scheme(path) {
            match scheme {
                "http" | "https" => {
                    #[cfg(feature = "resolve-http")]
                    {
                        let response = reqwest::blocking::get(path).map_err(|source| {
                            LoaderError::Http {
                                url: path.to_string(),
                                source,
                            }
                        })?;
                        return response.json().map_err(|source| LoaderError::Http {
                            url: path.to_string(),
                            source,
                        });
                    }
                    #[cfg(not(feature = "resolve-http"))]
                    {
                        return Err(LoaderError::UnsupportedScheme {
                            scheme: scheme.to_string(),
                        });
                    }
                }
                "file" => {
                    let stripped = path.trim_start_matches("file://");
                    return load_file(stripped);
                }
                other => {
                    return Err(LoaderError::UnsupportedScheme {
                        scheme: other.to_string(),
                    })
                }
            }
        }
        load_file(path)
    }
}

fn load_file(path: &str) -> Result<Value, LoaderError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoaderError::Io {
        path: path.to_string(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| LoaderError::Parse {
        path: path.to_string(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Path arithmetic
// ---------------------------------------------------------------------------

/// The scheme of `path` if it looks like a URL (`scheme://...`), else `None`.
/// Windows drive letters (`C:\...`) are not schemes.
fn url_scheme(path: &str) -> Option<&str> {
    let (scheme, _) = path.split_once("://")?;
    if !scheme.is_empty() && scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-') {
        Some(scheme)
    } else {
        None
    }
}

/// The directory portion of a document path: everything up to the final
/// segment. URL directories keep a trailing `/` so they join cleanly.
pub fn parent_dir(doc_path: &str) -> String {
    if url_scheme(doc_path).is_some() {
        match doc_path.rfind('/') {
            Some(idx) => doc_path[..=idx].to_string(),
            None => doc_path.to_string(),
        }
    } else {
        Path::new(doc_path)
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Join a `$ref` file component onto the host document's directory.
///
/// - An absolute URL passes through untouched.
/// - A URL base joins per RFC 3986 (`url::Url::join`).
/// - A filesystem base joins lexically, folding `.` and `..`.
pub fn join_document_path(base_dir: &str, relative: &str) -> String {
    if url_scheme(relative).is_some() {
        return relative.to_string();
    }

    if url_scheme(base_dir).is_some() {
        if let Ok(base) = url::Url::parse(base_dir) {
            if let Ok(joined) = base.join(relative) {
                return joined.to_string();
            }
        }
        // Unjoinable URL bases fall back to plain concatenation.
        return format!("{base_dir}{relative}");
    }

    let joined = Path::new(base_dir).join(relative);
    normalize(&joined).to_string_lossy().into_owned()
}

/// Lexical path normalization: folds `.` and `..` without touching the
/// filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    out
}

// ===========================================================================
// Tests
// ===========================================================================
