//! Typed JSON tree helpers used by every pass.
//!
//! Two concerns live here:
//! 1. **RFC 6901 JSON Pointers** — building, splitting, `get`/`set` over a
//!    [`serde_json::Value`] tree. `set` creates intermediate objects so a
//!    definition can be spliced in before its parents exist.
//! 2. **Deep merge** — the value-level merge used when composing `allOf`
//!    parents into children (overlay keys win on collision).
//!
//! Pointers here are bare (`/definitions/Cat`), without the `#` fragment
//! marker a `$ref` string carries; [`split`] tolerates both forms. The
//! `~0`/`~1` escaping is handled character-wise inside [`build`] and
//! [`split`]; segments never travel in escaped form anywhere else.

use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Pointer encoding
// ---------------------------------------------------------------------------

/// Build a pointer by appending segments to a parent pointer, encoding
/// `~` as `~0` and `/` as `~1` per RFC 6901.
///
/// # Example
/// ```
/// use swagger_resolver::pointer::build;
/// assert_eq!(build("/definitions", &["a/b"]), "/definitions/a~1b");
/// ```
pub fn build(parent: &str, segments: &[&str]) -> String {
    let mut pointer = String::from(parent);
    for segment in segments {
        pointer.push('/');
        for ch in segment.chars() {
            match ch {
                '~' => pointer.push_str("~0"),
                '/' => pointer.push_str("~1"),
                other => pointer.push(other),
            }
        }
    }
    pointer
}

/// Split a pointer into decoded segments.
///
/// Strips a leading `#` fragment marker if present. The empty pointer (`""`
/// or `#`) refers to the whole document and yields no segments. A trailing
/// slash is significant per RFC 6901: `"/a/"` names the empty-string key
/// under `a`, so it yields `["a", ""]`, not `["a"]`.
pub fn split(pointer: &str) -> Vec<String> {
    let stripped = pointer.strip_prefix('#').unwrap_or(pointer);
    let Some(rest) = stripped.strip_prefix('/') else {
        // "" and "#" are the whole-document pointers.
        return Vec::new();
    };
    rest.split('/').map(decode_segment).collect()
}

/// Decode one raw segment, expanding `~0` → `~` and `~1` → `/`. A dangling
/// or unknown escape keeps its characters as-is.
fn decode_segment(raw: &str) -> String {
    let mut decoded = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '~' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some('0') => decoded.push('~'),
            Some('1') => decoded.push('/'),
            Some(other) => {
                decoded.push('~');
                decoded.push(other);
            }
            None => decoded.push('~'),
        }
    }
    decoded
}

// ---------------------------------------------------------------------------
// Tree access
// ---------------------------------------------------------------------------

/// Dereference a pointer against a tree. `None` if any segment is missing.
pub fn get<'a>(tree: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut node = tree;
    for segment in split(pointer) {
        node = match node {
            Value::Object(obj) => obj.get(&segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Mutable variant of [`get`].
pub fn get_mut<'a>(tree: &'a mut Value, pointer: &str) -> Option<&'a mut Value> {
    let mut node = tree;
    for segment in split(pointer) {
        node = match node {
            Value::Object(obj) => obj.get_mut(&segment)?,
            Value::Array(arr) => arr.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

/// Write `value` at `pointer`, creating intermediate objects as needed.
///
/// An empty pointer replaces the whole tree. Traversing an existing scalar,
/// or indexing an array past its length, fails — intermediate *objects* are
/// created, intermediate arrays are not.
pub fn set(tree: &mut Value, pointer: &str, value: Value) -> Result<(), String> {
    let segments = split(pointer);
    if segments.is_empty() {
        *tree = value;
        return Ok(());
    }

    let mut node = tree;
    for (i, segment) in segments.iter().enumerate() {
        let last = i == segments.len() - 1;
        match node {
            Value::Object(obj) => {
                if last {
                    obj.insert(segment.clone(), value);
                    return Ok(());
                }
                node = obj
                    .entry(segment.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
            }
            Value::Array(arr) => {
                let idx = segment
                    .parse::<usize>()
                    .map_err(|_| format!("non-numeric array index `{segment}` in `{pointer}`"))?;
                if last {
                    if idx < arr.len() {
                        arr[idx] = value;
                    } else if idx == arr.len() {
                        arr.push(value);
                    } else {
                        return Err(format!("array index {idx} out of bounds in `{pointer}`"));
                    }
                    return Ok(());
                }
                node = arr
                    .get_mut(idx)
                    .ok_or_else(|| format!("array index {idx} out of bounds in `{pointer}`"))?;
            }
            other => {
                return Err(format!(
                    "cannot descend into {} at segment `{segment}` of `{pointer}`",
                    type_name(other)
                ));
            }
        }
    }
    unreachable!("loop returns on the last segment")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Deep merge
// ---------------------------------------------------------------------------

/// Merge `overlay` into `base`. Object values merge recursively; for any
/// other collision the overlay value wins. Keys only in `base` survive.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_obj), Value::Object(overlay_obj)) => {
            for (key, overlay_val) in overlay_obj {
                match base_obj.get_mut(key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => {
                        base_obj.insert(key.clone(), overlay_val.clone());
                    }
                }
            }
        }
        (base_slot, overlay_val) => {
            *base_slot = overlay_val.clone();
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
