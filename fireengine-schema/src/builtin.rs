//! Renderers for the built-in primitive field types.
//!
//! Every primitive implements all four capabilities, so any resolved type
//! has a complete capability table no matter what its custom ancestors
//! leave out.

use std::sync::Arc;

use serde_json::Value;

use crate::field_type::Primitive;
use crate::render::{
    Capability, ControlSurface, EMPTY_PLACEHOLDER, FieldRenderer, RenderContext, escape_html,
};

pub(crate) fn renderer_for(primitive: Primitive) -> Arc<dyn FieldRenderer> {
    match primitive {
        Primitive::String => Arc::new(TextInput),
        Primitive::Boolean => Arc::new(Checkbox),
        Primitive::Editor => Arc::new(RichTextEditor),
        Primitive::Assets => Arc::new(AssetList),
        Primitive::Reference => Arc::new(ReferencePicker),
    }
}

fn read_trimmed(controls: &dyn ControlSurface, id: &str) -> String {
    controls
        .control_value(id)
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// Single-line text input.
pub struct TextInput;

impl FieldRenderer for TextInput {
    fn capabilities(&self) -> &[Capability] {
        &Capability::ALL
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        format!(
            r#"<input id="{}" type="text" aria-label="{}" value="{}" />"#,
            ctx.control_id("input"),
            escape_html(ctx.label),
            escape_html(&ctx.value_text()),
        )
    }

    fn get_value(&self, ctx: &RenderContext<'_>, controls: &dyn ControlSurface) -> Value {
        Value::String(read_trimmed(controls, &ctx.control_id("input")))
    }

    fn render_output(&self, ctx: &RenderContext<'_>) -> String {
        if ctx.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }
        format!("<span>{}</span>", escape_html(&ctx.value_text()))
    }
}

/// Checkbox for boolean fields.
pub struct Checkbox;

impl FieldRenderer for Checkbox {
    fn capabilities(&self) -> &[Capability] {
        &Capability::ALL
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let checked = if matches!(ctx.value, Some(Value::Bool(true))) {
            " checked"
        } else {
            ""
        };
        format!(
            r#"<input id="{}" type="checkbox" aria-label="{}"{} />"#,
            ctx.control_id("input"),
            escape_html(ctx.label),
            checked,
        )
    }

    fn get_value(&self, ctx: &RenderContext<'_>, controls: &dyn ControlSurface) -> Value {
        let raw = read_trimmed(controls, &ctx.control_id("input")).to_ascii_lowercase();
        Value::Bool(matches!(raw.as_str(), "true" | "on" | "1"))
    }

    fn render_output(&self, ctx: &RenderContext<'_>) -> String {
        match ctx.value {
            Some(Value::Bool(true)) => "<span>Yes</span>".to_string(),
            Some(Value::Bool(false)) => "<span>No</span>".to_string(),
            _ => EMPTY_PLACEHOLDER.to_string(),
        }
    }
}

/// Multi-line rich text editor. The value is kept verbatim.
pub struct RichTextEditor;

impl FieldRenderer for RichTextEditor {
    fn capabilities(&self) -> &[Capability] {
        &Capability::ALL
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        format!(
            r#"<textarea id="{}" aria-label="{}">{}</textarea>"#,
            ctx.control_id("editor"),
            escape_html(ctx.label),
            escape_html(&ctx.value_text()),
        )
    }

    fn get_value(&self, ctx: &RenderContext<'_>, controls: &dyn ControlSurface) -> Value {
        Value::String(
            controls
                .control_value(&ctx.control_id("editor"))
                .unwrap_or_default(),
        )
    }

    fn render_output(&self, ctx: &RenderContext<'_>) -> String {
        if ctx.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }
        format!(
            r#"<div class="fe-editor">{}</div>"#,
            escape_html(&ctx.value_text())
        )
    }
}

/// List of asset URLs, edited as comma-separated text.
pub struct AssetList;

impl FieldRenderer for AssetList {
    fn capabilities(&self) -> &[Capability] {
        &Capability::ALL
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        format!(
            r#"<input id="{}" type="text" inputmode="url" aria-label="{}" value="{}" />"#,
            ctx.control_id("assets"),
            escape_html(ctx.label),
            escape_html(&ctx.value_text()),
        )
    }

    fn get_value(&self, ctx: &RenderContext<'_>, controls: &dyn ControlSurface) -> Value {
        let raw = read_trimmed(controls, &ctx.control_id("assets"));
        Value::Array(
            raw.split(',')
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(|url| Value::String(url.to_string()))
                .collect(),
        )
    }

    fn render_output(&self, ctx: &RenderContext<'_>) -> String {
        if ctx.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }
        let urls: Vec<String> = match ctx.value {
            Some(Value::Array(items)) => items.iter().map(crate::options::scalar_text).collect(),
            _ => vec![ctx.value_text()],
        };
        let items: String = urls
            .iter()
            .map(|url| {
                let url = escape_html(url);
                format!(r#"<li><a href="{url}">{url}</a></li>"#)
            })
            .collect();
        format!(r#"<ul class="fe-assets">{items}</ul>"#)
    }
}

/// Path of a document in another collection.
pub struct ReferencePicker;

impl FieldRenderer for ReferencePicker {
    fn capabilities(&self) -> &[Capability] {
        &Capability::ALL
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        format!(
            r#"<input id="{}" type="text" aria-label="{}" value="{}" />"#,
            ctx.control_id("ref"),
            escape_html(ctx.label),
            escape_html(&ctx.value_text()),
        )
    }

    fn get_value(&self, ctx: &RenderContext<'_>, controls: &dyn ControlSurface) -> Value {
        Value::String(read_trimmed(controls, &ctx.control_id("ref")))
    }

    fn render_output(&self, ctx: &RenderContext<'_>) -> String {
        if ctx.is_empty() {
            return EMPTY_PLACEHOLDER.to_string();
        }
        let path = escape_html(&ctx.value_text());
        format!(r##"<a class="fe-ref" href="#/{path}">{path}</a>"##)
    }
}
