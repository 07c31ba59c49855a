//! Field definitions: as written in an override, and as resolved.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field_type::{Primitive, ResolvedFieldType};
use crate::options::SelectOption;
use crate::render::RenderContext;

/// A field as written in a collection's schema override.
///
/// `name` is optional only so that a missing name can be reported as a
/// resolution error rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Raw options in any accepted form; normalized at resolve time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_path: Option<String>,
}

impl FieldOverride {
    /// Shorthand for a field with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_type(mut self, type_name: impl Into<String>) -> Self {
        self.field_type = Some(type_name.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_options(mut self, options: Vec<Value>) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_max(mut self, max: u32) -> Self {
        self.max = Some(max);
        self
    }

    /// Shorthand for a reference into `collection`.
    pub fn with_reference(mut self, collection: impl Into<String>) -> Self {
        self.field_type = Some(Primitive::Reference.as_str().to_string());
        self.reference_path = Some(collection.into());
        self
    }
}

/// A field after type resolution and option normalization.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedField {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub primitive: Primitive,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_path: Option<String>,
    #[serde(skip)]
    pub field_type: ResolvedFieldType,
}

impl ResolvedField {
    pub fn context<'a>(&'a self, value: Option<&'a Value>) -> RenderContext<'a> {
        RenderContext::new(&self.name, &self.label, value)
    }

    /// Display-only markup for `value`.
    pub fn render_output(&self, value: Option<&Value>) -> String {
        self.field_type.render_output(&self.context(value))
    }

    /// Option text for a stored value, if the field enumerates options.
    pub fn option_text(&self, value: &Value) -> Option<&str> {
        self.options
            .iter()
            .find(|o| &o.value == value)
            .map(|o| o.text.as_str())
    }
}

/// True for names made of ASCII letters, digits and `_`, not starting with a digit.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Display label derived from a field name.
///
/// Splits on `_`, `-`, spaces and lower-to-upper case changes, then
/// capitalizes each word: `top_comment` -> `Top Comment`, `isActive` -> `Is Active`.
pub fn title_case(name: &str) -> String {
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
