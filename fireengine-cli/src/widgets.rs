//! Renderers shipped with the CLI's default catalog.

use fireengine_schema::{Capability, ControlSurface, FieldRenderer, RenderContext, escape_html};
use serde_json::Value;

/// Catalog name of [`FullNameInput`].
pub const FULL_NAME: &str = "full_name";

const NO_NAME: &str = r#"<span class="fe-empty">No name provided</span>"#;

/// Edits a person's name as separate first and last inputs and stores it as
/// one space-joined string.
pub struct FullNameInput;

impl FullNameInput {
    fn split(value: &str) -> (&str, &str) {
        let value = value.trim();
        match value.split_once(' ') {
            Some((first, last)) => (first, last.trim_start()),
            None => (value, ""),
        }
    }

    fn initial(part: &str) -> String {
        part.chars().next().map(|c| c.to_uppercase().collect()).unwrap_or_default()
    }
}

impl FieldRenderer for FullNameInput {
    fn capabilities(&self) -> &[Capability] {
        &Capability::ALL
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        let text = ctx.value_text();
        let (first, last) = Self::split(&text);
        format!(
            concat!(
                r#"<div class="fe-full-name">"#,
                r#"<input id="{}" placeholder="First name" value="{}" />"#,
                r#"<input id="{}" placeholder="Last name" value="{}" />"#,
                "</div>"
            ),
            ctx.control_id("first"),
            escape_html(first),
            ctx.control_id("last"),
            escape_html(last),
        )
    }

    fn get_value(&self, ctx: &RenderContext<'_>, controls: &dyn ControlSurface) -> Value {
        let first = controls.control_value(&ctx.control_id("first")).unwrap_or_default();
        let last = controls.control_value(&ctx.control_id("last")).unwrap_or_default();
        Value::String(format!("{} {}", first.trim(), last.trim()).trim().to_string())
    }

    fn cleanup(&self, _ctx: &RenderContext<'_>) {}

    fn render_output(&self, ctx: &RenderContext<'_>) -> String {
        if ctx.is_empty() {
            return NO_NAME.to_string();
        }
        let text = ctx.value_text();
        let (first, last) = Self::split(&text);
        let initials = format!("{}{}", Self::initial(first), Self::initial(last));
        format!(
            r#"<div class="fe-full-name"><span class="fe-initials">{}</span><span>{}</span></div>"#,
            escape_html(&initials),
            escape_html(text.trim()),
        )
    }
}
