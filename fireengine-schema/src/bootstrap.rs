//! Startup handoff: configuration in, resolved schemas and registry out.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::collection::CollectionSchema;
use crate::config::{AdminCredentials, Configuration, CustomFieldSpec, WebappConfig};
use crate::error::{SchemaError, SchemaResult};
use crate::field_type::{FieldTypeDef, FieldTypeRegistry, TypeAttributes};
use crate::options::normalize_options;
use crate::render::FieldRenderer;
use crate::resolver::SchemaResolver;

/// Named renderers that declarative custom fields can refer to.
#[derive(Clone, Default)]
pub struct RendererCatalog {
    renderers: BTreeMap<String, Arc<dyn FieldRenderer>>,
}

impl RendererCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a renderer, replacing any previous one with the same name.
    pub fn register(&mut self, name: impl Into<String>, renderer: Arc<dyn FieldRenderer>) {
        self.renderers.insert(name.into(), renderer);
    }

    pub fn with(mut self, name: impl Into<String>, renderer: Arc<dyn FieldRenderer>) -> Self {
        self.register(name, renderer);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FieldRenderer>> {
        self.renderers.get(name).cloned()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.renderers.keys().map(String::as_str)
    }
}

impl fmt::Debug for RendererCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Everything the admin panel engine needs from the schema core.
#[derive(Debug)]
pub struct ResolvedConfiguration {
    pub collections: BTreeMap<String, CollectionSchema>,
    pub registry: FieldTypeRegistry,
}

impl ResolvedConfiguration {
    pub fn collection(&self, name: &str) -> Option<&CollectionSchema> {
        self.collections.get(name)
    }
}

/// The external engine that turns resolved schemas into a request-handling surface.
pub trait AdminPanelMount {
    type Surface;
    type Error: std::error::Error;

    fn mount(
        &self,
        resolved: &ResolvedConfiguration,
        credentials: &AdminCredentials,
        webapp: Option<&WebappConfig>,
    ) -> Result<Self::Surface, Self::Error>;
}

fn to_definition(
    type_name: &str,
    spec: &CustomFieldSpec,
    catalog: &RendererCatalog,
) -> SchemaResult<FieldTypeDef> {
    let renderer = match &spec.renderer {
        Some(name) => Some(catalog.get(name).ok_or_else(|| SchemaError::UnknownRenderer {
            type_name: type_name.to_string(),
            renderer: name.clone(),
        })?),
        None => None,
    };
    let options = match &spec.options {
        Some(raw) => Some(normalize_options(type_name, raw)?),
        None => None,
    };

    Ok(FieldTypeDef {
        extends: spec.extends.clone(),
        label: spec.label.clone(),
        renderer,
        attributes: TypeAttributes {
            max: spec.max,
            reference_path: spec.reference_path.clone(),
            options,
        },
    })
}

/// Builds the registry from the built-ins plus every declared custom field.
///
/// Custom types are registered in dependency order, so one custom type may
/// extend another regardless of declaration order.
pub fn build_registry(
    config: &Configuration,
    catalog: &RendererCatalog,
) -> SchemaResult<FieldTypeRegistry> {
    let mut registry = FieldTypeRegistry::with_builtins();
    let mut pending: Vec<(&String, &CustomFieldSpec)> = config.custom_fields.iter().collect();

    while !pending.is_empty() {
        let (ready, blocked): (Vec<_>, Vec<_>) = pending
            .into_iter()
            .partition(|(_, spec)| registry.contains(&spec.extends));

        if ready.is_empty() {
            return Err(stuck_error(&blocked));
        }

        for (name, spec) in ready {
            let definition = to_definition(name, spec, catalog)?;
            registry.register(name, definition)?;
        }
        pending = blocked;
    }

    Ok(registry)
}

/// Explains why no blocked type can be registered: either a chain loops
/// among the blocked types, or it ends at a type nobody declares.
fn stuck_error(blocked: &[(&String, &CustomFieldSpec)]) -> SchemaError {
    let by_name: BTreeMap<&str, &CustomFieldSpec> = blocked
        .iter()
        .map(|(name, spec)| (name.as_str(), *spec))
        .collect();

    let mut seen = Vec::new();
    let mut current = blocked[0].0.as_str();
    loop {
        if seen.contains(&current) {
            return SchemaError::CyclicType(current.to_string());
        }
        seen.push(current);
        match by_name.get(current) {
            Some(spec) if by_name.contains_key(spec.extends.as_str()) => {
                current = spec.extends.as_str();
            }
            Some(spec) => {
                return SchemaError::UnknownBaseType {
                    type_name: current.to_string(),
                    base: spec.extends.clone(),
                };
            }
            None => return SchemaError::UnknownType(current.to_string()),
        }
    }
}

/// Validates the configuration, builds the registry and resolves every
/// known collection. Any failure aborts startup.
pub fn bootstrap(
    config: &Configuration,
    catalog: &RendererCatalog,
) -> SchemaResult<ResolvedConfiguration> {
    config.validate()?;
    let registry = build_registry(config, catalog)?;
    let collections = SchemaResolver::new(config, &registry).resolve_all()?;

    info!(
        domain = %config.domain,
        custom_types = registry.custom_names().count(),
        collections = collections.len(),
        "configuration resolved"
    );
    Ok(ResolvedConfiguration {
        collections,
        registry,
    })
}
