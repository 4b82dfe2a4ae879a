//! Argument extraction for model-supplied tool arguments.
//!
//! Models are loose with types: counts arrive as `5`, `5.0` or `"5"`, lists
//! as arrays or comma-separated strings. These helpers accept the sensible
//! variants and turn anything else into `ToolError::InvalidArguments`.

use cowork_core::error::ToolError;
use serde_json::{Map, Value};

/// A required, non-empty string argument.
pub fn required_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Value::String(_)) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must not be empty"
        ))),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be a string"
        ))),
        None => Err(ToolError::InvalidArguments(format!(
            "Missing '{key}' argument"
        ))),
    }
}

/// Reject a value that would span more than one line, such as a mail header.
pub fn single_line<'a>(key: &str, value: &'a str) -> Result<&'a str, ToolError> {
    if value.contains(['\r', '\n']) {
        Err(ToolError::InvalidArguments(format!(
            "'{key}' must be a single line"
        )))
    } else {
        Ok(value)
    }
}

/// An optional string argument. Blank strings count as absent.
pub fn optional_str<'a>(args: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

/// An optional non-negative count, as a JSON number or a numeric string.
pub fn optional_count(args: &Map<String, Value>, key: &str) -> Result<Option<u32>, ToolError> {
    let invalid = || ToolError::InvalidArguments(format!("'{key}' must be a positive number"));

    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => {
            if let Some(v) = n.as_u64() {
                return u32::try_from(v).map(Some).map_err(|_| invalid());
            }
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
                    Ok(Some(f as u32))
                }
                _ => Err(invalid()),
            }
        }
        Some(Value::String(s)) => s.trim().parse::<u32>().map(Some).map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}

/// Resolve an optional count against a default and an upper cap.
pub fn bounded_count(
    args: &Map<String, Value>,
    key: &str,
    default: u32,
    cap: u32,
) -> Result<u32, ToolError> {
    Ok(optional_count(args, key)?.unwrap_or(default).clamp(1, cap))
}

/// An optional list of strings, as an array or a comma-separated string.
pub fn string_list(args: &Map<String, Value>, key: &str) -> Result<Vec<String>, ToolError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(|s| s.trim().to_string())
                    .ok_or_else(|| {
                        ToolError::InvalidArguments(format!("'{key}' must contain only strings"))
                    })
            })
            .filter(|r| r.as_ref().map_or(true, |s| !s.is_empty()))
            .collect(),
        Some(Value::String(s)) => Ok(s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{key}' must be a list of strings"
        ))),
    }
}

/// Unwrap a `json!` object into a tool payload.
pub(crate) fn into_output(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
