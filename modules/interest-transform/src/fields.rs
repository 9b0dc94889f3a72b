//! Defensive accessors over loosely-typed source documents.
//!
//! Missing, null and blank values all read as "absent" (`None`). Lookups
//! short-circuit on a missing parent instead of failing. The only accessor
//! that can fail is [`object_at`], used where a present-but-wrong node means
//! the record is malformed.

use serde_json::{Map, Value};

use crate::error::{Result, TransformError};

/// Look up a dotted/indexed path such as `InterestTypeSpecificFields.Latitude`
/// or `Items[0].Name`. Returns `None` for a missing segment, a parent of the
/// wrong kind, a malformed path, or a null leaf.
pub fn lookup<'a>(node: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = node;
    for segment in path.split('.') {
        let (key, indices) = split_indices(segment)?;
        if !key.is_empty() {
            current = current.as_object()?.get(key)?;
        }
        for index in indices {
            current = current.as_array()?.get(index)?;
        }
    }
    (!current.is_null()).then_some(current)
}

/// Look up a path and stringify the scalar found there.
/// Blank strings, containers and nulls read as absent.
pub fn text(node: &Value, path: &str) -> Option<String> {
    lookup(node, path).and_then(scalar_text)
}

/// Read a scalar child of an optional object (typically one returned by
/// [`object_at`]). A missing parent reads as absent.
pub fn map_text(map: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    map.and_then(|m| m.get(key)).and_then(scalar_text)
}

/// Stringify a scalar node. Strings are returned as-is unless blank;
/// numbers and booleans use their JSON spelling.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!is_blank(&text)).then_some(text)
}

/// Read a child that must be an object when present.
///
/// Missing or null yields `Ok(None)`; any other non-object node is a shape
/// error, since downstream fields cannot be read from it.
pub fn object_at<'a>(node: &'a Value, key: &str) -> Result<Option<&'a Map<String, Value>>> {
    match node.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(TransformError::shape(key, "object", other)),
    }
}

/// True for empty or whitespace-only strings.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Lower-case the first letter of every dot-separated segment:
/// `"DisplayName"` → `"displayName"`, `"Weather.AdditionalSettings"` →
/// `"weather.additionalSettings"`. Segments starting with a non-letter or a
/// lower-case letter are left unchanged.
pub fn lower_camel(name: &str) -> String {
    name.split('.')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) if first.is_uppercase() => {
                    std::iter::once(lower_single(first)).chain(chars).collect::<String>()
                }
                _ => segment.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(".")
}

/// Simple one-to-one lower-casing: `İ` maps to `i`, not `i\u{307}`.
fn lower_single(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Split `Name[0][1]` into `("Name", [0, 1])`.
fn split_indices(segment: &str) -> Option<(&str, Vec<usize>)> {
    let Some(open) = segment.find('[') else {
        return Some((segment, Vec::new()));
    };

    let key = &segment[..open];
    let mut rest = &segment[open..];
    let mut indices = Vec::new();
    while !rest.is_empty() {
        let inner = rest.strip_prefix('[')?;
        let close = inner.find(']')?;
        indices.push(inner[..close].trim().parse().ok()?);
        rest = &inner[close + 1..];
    }
    Some((key, indices))
}
