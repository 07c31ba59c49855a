//! Collection schemas and their overrides.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::field::{FieldOverride, ResolvedField};
use crate::options::scalar_text;

/// Caller-supplied replacement for parts of a collection's default schema.
///
/// Each present attribute replaces the default outright. In particular a
/// `fields` list is never merged with anything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldOverride>>,
}

impl CollectionOverride {
    pub fn with_title_template(mut self, template: impl Into<String>) -> Self {
        self.title_template = Some(template.into());
        self
    }

    pub fn with_download(mut self, download: bool) -> Self {
        self.download = Some(download);
        self
    }

    pub fn with_fields(mut self, fields: Vec<FieldOverride>) -> Self {
        self.fields = Some(fields);
        self
    }
}

/// The effective schema of one collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSchema {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_template: Option<String>,
    /// Whether CSV export is allowed.
    pub download: bool,
    /// Fields in display order.
    pub fields: Vec<ResolvedField>,
}

impl CollectionSchema {
    pub fn field(&self, name: &str) -> Option<&ResolvedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Placeholder names in the title template, in order of appearance.
    pub fn title_placeholders(&self) -> Vec<&str> {
        match &self.title_template {
            Some(template) => placeholders(template),
            None => Vec::new(),
        }
    }

    /// Interpolates the title template against a document.
    ///
    /// Missing values render as empty text. Returns `None` when the
    /// collection has no template.
    pub fn render_title(&self, document: &Value) -> Option<String> {
        self.title_template
            .as_deref()
            .map(|template| interpolate(template, document))
    }
}

/// Splits a template into literal text and `${name}` placeholders.
fn segments(template: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        if start > 0 {
            out.push(Segment::Literal(&rest[..start]));
        }
        out.push(Segment::Placeholder(after[..end].trim()));
        rest = &after[end + 1..];
    }
    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

fn placeholders(template: &str) -> Vec<&str> {
    segments(template)
        .into_iter()
        .filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name),
            Segment::Literal(_) => None,
        })
        .collect()
}

fn interpolate(template: &str, document: &Value) -> String {
    segments(template)
        .into_iter()
        .map(|s| match s {
            Segment::Literal(text) => text.to_string(),
            Segment::Placeholder(name) => match document.get(name) {
                None | Some(Value::Null) => String::new(),
                Some(v @ (Value::Array(_) | Value::Object(_))) => v.to_string(),
                Some(v) => scalar_text(v),
            },
        })
        .collect()
}
