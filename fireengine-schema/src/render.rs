//! Rendering capabilities for field types.
//!
//! A field type renders through a [`FieldRenderer`]. Renderers declare which
//! of the four capabilities they implement; unlisted capabilities fall
//! through to the nearest base type that does implement them.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// Markup shown by output renderers when a field has no value.
pub const EMPTY_PLACEHOLDER: &str = r#"<span class="fe-empty">No value</span>"#;

/// One of the four independent rendering capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Produce markup for an editable control.
    Render,
    /// Read the rendered controls back into one logical value.
    GetValue,
    /// Release whatever `Render` attached.
    Cleanup,
    /// Produce display-only markup for list and detail views.
    RenderOutput,
}

impl Capability {
    pub const ALL: [Capability; 4] = [
        Capability::Render,
        Capability::GetValue,
        Capability::Cleanup,
        Capability::RenderOutput,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Render => "render",
            Capability::GetValue => "getValue",
            Capability::Cleanup => "cleanup",
            Capability::RenderOutput => "renderOutput",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a renderer receives: the field's name, display label and current value.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub value: Option<&'a Value>,
}

impl<'a> RenderContext<'a> {
    pub fn new(name: &'a str, label: &'a str, value: Option<&'a Value>) -> Self {
        Self { name, label, value }
    }

    /// Element id for one sub-control of this field, e.g. `fullName_first`.
    pub fn control_id(&self, role: &str) -> String {
        control_id(self.name, role)
    }

    /// The value as plain text. Arrays are joined with `", "`.
    pub fn value_text(&self) -> String {
        match self.value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(crate::options::scalar_text)
                .collect::<Vec<_>>()
                .join(", "),
            Some(other) => other.to_string(),
        }
    }

    /// True when the value is absent, null, blank text or an empty list.
    pub fn is_empty(&self) -> bool {
        match self.value {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(Value::Array(items)) => items.is_empty(),
            Some(Value::Object(map)) => map.is_empty(),
            Some(_) => false,
        }
    }
}

/// Derives the element id of a field's sub-control.
pub fn control_id(name: &str, role: &str) -> String {
    format!("{name}_{role}")
}

/// Lookup of rendered controls by element id.
///
/// Hosts implement this over whatever holds the live controls.
pub trait ControlSurface {
    /// Current text of the control with the given id, if it exists.
    fn control_value(&self, id: &str) -> Option<String>;
}

impl ControlSurface for HashMap<String, String> {
    fn control_value(&self, id: &str) -> Option<String> {
        self.get(id).cloned()
    }
}

/// Rendering behavior of a field type.
///
/// Implementors list what they provide in [`capabilities`](Self::capabilities)
/// and override the matching methods. Methods for unlisted capabilities are
/// never called; the registry routes those to a base type instead.
pub trait FieldRenderer: Send + Sync {
    /// Capabilities this renderer implements.
    ///
    /// Every listed capability must have its method overridden. A listed but
    /// unimplemented capability shadows the base type with the empty default.
    fn capabilities(&self) -> &[Capability];

    /// Markup for an editable control bound to ids from [`RenderContext::control_id`].
    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let _ = ctx;
        String::new()
    }

    /// Reads the rendered controls and recombines them into the field value.
    fn get_value(&self, ctx: &RenderContext<'_>, controls: &dyn ControlSurface) -> Value {
        let _ = (ctx, controls);
        Value::Null
    }

    /// Releases anything `render` attached. Runs once per mounted control.
    fn cleanup(&self, ctx: &RenderContext<'_>) {
        let _ = ctx;
    }

    /// Display-only markup. Must produce a placeholder for empty values.
    fn render_output(&self, ctx: &RenderContext<'_>) -> String {
        let _ = ctx;
        EMPTY_PLACEHOLDER.to_string()
    }
}

/// Escapes text for inclusion in markup and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
