//! Library side of the `fireengine` command.
//!
//! Loads a configuration file, runs it through the schema core with the
//! default renderer catalog, and formats the result for the terminal.

pub mod install;
pub mod widgets;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use fireengine_schema::{
    CollectionSchema, Configuration, RendererCatalog, ResolvedConfiguration, bootstrap,
};
use tracing::debug;

use crate::widgets::{FULL_NAME, FullNameInput};

/// Renderers available to `customFields` entries by name.
pub fn default_catalog() -> RendererCatalog {
    RendererCatalog::new().with(FULL_NAME, Arc::new(FullNameInput))
}

/// Loads, validates and resolves the configuration at `path`.
pub fn load(path: &Path) -> Result<ResolvedConfiguration> {
    let config = Configuration::from_path(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    debug!(
        path = %path.display(),
        overrides = config.schema_overrides.len(),
        custom_fields = config.custom_fields.len(),
        "configuration loaded"
    );
    let resolved = bootstrap(&config, &default_catalog())
        .with_context(|| format!("Invalid configuration in {}", path.display()))?;
    Ok(resolved)
}

/// One line describing a resolved collection, e.g.
/// `users: 5 fields, export off, title "${email}"`.
pub fn summary_line(schema: &CollectionSchema) -> String {
    let count = schema.fields.len();
    let mut line = format!(
        "{}: {} field{}, export {}",
        schema.name,
        count,
        if count == 1 { "" } else { "s" },
        if schema.download { "on" } else { "off" },
    );
    if let Some(template) = &schema.title_template {
        line.push_str(&format!(", title \"{template}\""));
    }
    line
}

/// Pretty or compact JSON of every resolved collection.
pub fn schemas_json(resolved: &ResolvedConfiguration, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(&resolved.collections)?
    } else {
        serde_json::to_string(&resolved.collections)?
    };
    Ok(json)
}
