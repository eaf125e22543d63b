//! Parsing of loosely-typed request values.
//!
//! Clients send numbers either as JSON numbers or as strings typed into a
//! form field, so every numeric field accepts both.

use crate::error::{PresentserError, Result};
use crate::projection::{AttendanceInput, TargetSpec};
use serde_json::Value;

fn parse_real(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Strict numeric field: absent or `null` counts as 0, anything unparseable
/// is `InvalidInput`.
pub fn real_or_zero(field: &str, value: Option<&Value>) -> Result<f64> {
    match value {
        None | Some(Value::Null) => Ok(0.0),
        Some(v) => parse_real(v).ok_or_else(|| PresentserError::InvalidInput {
            field: field.to_string(),
            value: v.to_string(),
        }),
    }
}

/// Lenient numeric field: unparseable values are treated as absent.
pub fn lenient_real(value: Option<&Value>) -> Option<f64> {
    value.and_then(parse_real)
}

/// Parse `present` and `total` together.
pub fn attendance(present: Option<&Value>, total: Option<&Value>) -> Result<AttendanceInput> {
    Ok(AttendanceInput::new(
        real_or_zero("present", present)?,
        real_or_zero("total", total)?,
    ))
}

/// Text of an explicit target, or `None` when the caller left it blank.
///
/// Empty strings, `false` and a numeric zero all mean "no explicit target",
/// so a form that sends `0` for an untouched field still gets the default.
pub fn target_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Non-blank text field; numbers are accepted and rendered as text.
pub fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Build a [`TargetSpec`] from the raw `target` and `gender` fields.
pub fn target_spec(target: Option<&Value>, category: Option<&Value>) -> TargetSpec {
    TargetSpec {
        explicit: target_text(target),
        category: text(category),
    }
}
