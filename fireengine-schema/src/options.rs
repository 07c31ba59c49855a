//! Enumeration options for select-style fields.
//!
//! Options may be written three ways in a configuration:
//! - a bare scalar (`"moderator"`) which becomes both value and text
//! - a `[value, text]` pair (`["user", "Regular user"]`)
//! - an object (`{"value": "admin", "text": "Administrator"}`) passed through,
//!   keys other than `value` and `text` included
//!
//! All three normalize to [`SelectOption`]. Normalizing an already normalized
//! list yields the same list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{SchemaError, SchemaResult};

/// A normalized `{value, text}` option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Stored value. Always a JSON scalar.
    pub value: Value,
    /// Display text.
    pub text: String,
    /// Any other keys an object option carried, e.g. `disabled`.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SelectOption {
    pub fn new(value: impl Into<Value>, text: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            text: text.into(),
            extra: Map::new(),
        }
    }

    /// An option whose text is its value.
    pub fn bare(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            text: value.clone(),
            value: Value::String(value),
            extra: Map::new(),
        }
    }
}

/// Normalizes every entry of `raw`, preserving order.
///
/// `owner` names the field or type the options belong to, for error messages.
pub fn normalize_options(owner: &str, raw: &[Value]) -> SchemaResult<Vec<SelectOption>> {
    raw.iter()
        .enumerate()
        .map(|(index, entry)| normalize_option(owner, index, entry))
        .collect()
}

/// Normalizes a single option entry.
pub fn normalize_option(owner: &str, index: usize, raw: &Value) -> SchemaResult<SelectOption> {
    let malformed = |reason: &str| SchemaError::MalformedOption {
        field: owner.to_string(),
        index,
        reason: reason.to_string(),
    };

    match raw {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(SelectOption {
            value: raw.clone(),
            text: scalar_text(raw),
            extra: Map::new(),
        }),
        Value::Array(pair) => match pair.as_slice() {
            [value, text] if is_scalar(value) && is_scalar(text) => Ok(SelectOption {
                value: value.clone(),
                text: scalar_text(text),
                extra: Map::new(),
            }),
            [_, _] => Err(malformed("pair entries must be scalars")),
            _ => Err(malformed("array options must be [value, text] pairs")),
        },
        Value::Object(map) => {
            let value = map
                .get("value")
                .filter(|v| is_scalar(v))
                .ok_or_else(|| malformed("object option needs a scalar 'value'"))?;
            let text = match map.get("text") {
                None | Some(Value::Null) => scalar_text(value),
                Some(t) if is_scalar(t) => scalar_text(t),
                Some(_) => return Err(malformed("'text' must be a scalar")),
            };
            let extra = map
                .iter()
                .filter(|(key, _)| key.as_str() != "value" && key.as_str() != "text")
                .map(|(key, v)| (key.clone(), v.clone()))
                .collect();
            Ok(SelectOption {
                value: value.clone(),
                text,
                extra,
            })
        }
        Value::Null => Err(malformed("null is not an option")),
    }
}

fn is_scalar(value: &Value) -> bool {
    matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_))
}

/// Display text for a scalar: strings verbatim, numbers and booleans as JSON.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
