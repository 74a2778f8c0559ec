//! Decoding of a task's structured output.
//!
//! Agents attach a JSON object to a task as its structured output, e.g. the
//! result of a host check:
//!
//! ```json
//! {"host_resolution_check": {"failed_count": 1, "success_count": 3, "failures": [...]}}
//! ```
//!
//! [`parse_structured_output`] turns that text into a [`PropertyValue`]
//! tree. Absent or empty input is "no value". Anything that is not a single
//! well-formed JSON object is a [`StructuredOutputError`]; the caller decides
//! what a failure means (the resource provider maps it to `null`).
//!
//! Nesting depth is not limited here. Recursion runs on a heap-grown stack,
//! so deep payloads cost memory rather than overflowing the thread stack.

use serde::Deserialize;
use thiserror::Error;

use crate::value::PropertyValue;

/// Structured output could not be decoded.
#[derive(Debug, Error)]
pub enum StructuredOutputError {
    /// The text is not well-formed JSON.
    #[error("malformed structured output: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The text is well-formed JSON but not an object.
    #[error("structured output must be a JSON object, found {found}")]
    NotAnObject {
        /// Kind of JSON value that was found instead.
        found: &'static str,
    },
}

/// Decodes structured output into a nested [`PropertyValue`] mapping.
///
/// Returns `Ok(None)` for absent or empty input.
///
/// # Errors
///
/// - [`StructuredOutputError::Malformed`] if `input` is not valid JSON.
/// - [`StructuredOutputError::NotAnObject`] if it is valid JSON but not an
///   object.
///
/// # Examples
///
/// ```
/// use task_resources::structured_output::parse_structured_output;
/// use task_resources::value::PropertyValue;
///
/// let value = parse_structured_output(Some(r#"{"a": 5}"#)).unwrap().unwrap();
/// assert_eq!(value.get("a"), Some(&PropertyValue::Integer(5)));
///
/// assert!(parse_structured_output(None).unwrap().is_none());
/// assert!(parse_structured_output(Some("")).unwrap().is_none());
/// assert!(parse_structured_output(Some(r#"{"a": invalid JSON}"#)).is_err());
/// ```
pub fn parse_structured_output(
    input: Option<&str>,
) -> Result<Option<PropertyValue>, StructuredOutputError> {
    let Some(text) = input.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    let mut deserializer = serde_json::Deserializer::from_str(text);
    deserializer.disable_recursion_limit();
    let value = PropertyValue::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;

    if matches!(value, PropertyValue::Mapping(_)) {
        Ok(Some(value))
    } else {
        Err(StructuredOutputError::NotAnObject {
            found: kind_of(&value),
        })
    }
}

fn kind_of(value: &PropertyValue) -> &'static str {
    match value {
        PropertyValue::Mapping(_) => "object",
        PropertyValue::Sequence(_) => "array",
        PropertyValue::Integer(_) | PropertyValue::Decimal(_) => "number",
        PropertyValue::String(_) => "string",
        PropertyValue::Boolean(_) => "boolean",
        PropertyValue::Null => "null",
    }
}
