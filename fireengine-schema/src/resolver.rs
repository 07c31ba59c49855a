//! Schema override resolution.
//!
//! For each collection the resolver starts from the default schema, lays
//! the override on top (each present attribute replaces the default
//! outright), resolves field types, normalizes options and validates names
//! and references.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::{debug, info, warn};

use crate::collection::CollectionSchema;
use crate::config::Configuration;
use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldOverride, ResolvedField, is_identifier, title_case};
use crate::field_type::{FieldTypeRegistry, Primitive};
use crate::options::normalize_options;

/// Implicit defaults applied to every collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverDefaults {
    /// Type of fields that omit `type`.
    pub field_type: &'static str,
    /// Export policy of collections that do not set `download`.
    pub download: bool,
}

/// The stock defaults: untyped fields are strings and export is allowed.
pub const DEFAULTS: ResolverDefaults = ResolverDefaults {
    field_type: "string",
    download: true,
};

impl Default for ResolverDefaults {
    fn default() -> Self {
        DEFAULTS
    }
}

/// Resolves collection schemas against one configuration and registry.
pub struct SchemaResolver<'a> {
    config: &'a Configuration,
    registry: &'a FieldTypeRegistry,
    defaults: ResolverDefaults,
    known: BTreeSet<&'a str>,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(config: &'a Configuration, registry: &'a FieldTypeRegistry) -> Self {
        Self::with_defaults(config, registry, DEFAULTS)
    }

    pub fn with_defaults(
        config: &'a Configuration,
        registry: &'a FieldTypeRegistry,
        defaults: ResolverDefaults,
    ) -> Self {
        Self {
            config,
            registry,
            defaults,
            known: config.known_collections(),
        }
    }

    /// Resolves one collection. Returns `None` for ignored collections.
    pub fn resolve(&self, collection: &str) -> SchemaResult<Option<CollectionSchema>> {
        if self.config.is_ignored(collection) {
            return Ok(None);
        }

        let mut schema = CollectionSchema {
            name: collection.to_string(),
            title_template: None,
            download: self.defaults.download,
            fields: Vec::new(),
        };

        if let Some(over) = self.config.schema_overrides.get(collection) {
            if let Some(template) = &over.title_template {
                schema.title_template = Some(template.clone());
            }
            if let Some(download) = over.download {
                schema.download = download;
            }
            if let Some(fields) = &over.fields {
                schema.fields = self.resolve_fields(collection, fields)?;
            }
        }

        debug!(
            collection = %collection,
            fields = schema.fields.len(),
            download = schema.download,
            "resolved collection schema"
        );
        Ok(Some(schema))
    }

    /// Resolves every known, non-ignored collection.
    pub fn resolve_all(&self) -> SchemaResult<BTreeMap<String, CollectionSchema>> {
        for name in self.config.schema_overrides.keys() {
            if self.config.is_ignored(name) {
                warn!(collection = %name, "schema override targets an ignored collection");
            }
        }

        let mut resolved = BTreeMap::new();
        for name in &self.known {
            if let Some(schema) = self.resolve(name)? {
                resolved.insert(name.to_string(), schema);
            }
        }

        info!(
            collections = resolved.len(),
            ignored = self.config.ignore_collections.len(),
            "schema resolution complete"
        );
        Ok(resolved)
    }

    fn resolve_fields(
        &self,
        collection: &str,
        fields: &[FieldOverride],
    ) -> SchemaResult<Vec<ResolvedField>> {
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(fields.len());

        for (index, field) in fields.iter().enumerate() {
            let resolved = self.resolve_field(collection, index, field)?;
            if !seen.insert(resolved.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    collection: collection.to_string(),
                    field: resolved.name,
                });
            }
            out.push(resolved);
        }
        Ok(out)
    }

    fn resolve_field(
        &self,
        collection: &str,
        index: usize,
        field: &FieldOverride,
    ) -> SchemaResult<ResolvedField> {
        let name = field
            .name
            .as_deref()
            .ok_or_else(|| SchemaError::MissingFieldName {
                collection: collection.to_string(),
                index,
            })?;
        if !is_identifier(name) {
            return Err(SchemaError::InvalidFieldName {
                collection: collection.to_string(),
                name: name.to_string(),
            });
        }

        let type_name = field.field_type.as_deref().unwrap_or(self.defaults.field_type);
        let field_type = self.registry.resolve(type_name)?;
        let inherited = field_type.attributes();

        let options = match &field.options {
            Some(raw) => normalize_options(name, raw)?,
            None => inherited.options.clone().unwrap_or_default(),
        };
        let reference_path = field
            .reference_path
            .clone()
            .or_else(|| inherited.reference_path.clone());

        let is_relation = field_type.primitive() == Primitive::Reference;
        match &reference_path {
            Some(path) if is_relation && !self.is_known(path) => {
                return Err(SchemaError::UnknownReference {
                    collection: collection.to_string(),
                    field: name.to_string(),
                    reference_path: path.clone(),
                });
            }
            None if is_relation => {
                return Err(SchemaError::MissingReferencePath {
                    collection: collection.to_string(),
                    field: name.to_string(),
                });
            }
            _ => {}
        }

        Ok(ResolvedField {
            name: name.to_string(),
            label: field.label.clone().unwrap_or_else(|| title_case(name)),
            type_name: type_name.to_string(),
            primitive: field_type.primitive(),
            required: field.required,
            default: field.default.clone(),
            options,
            max: field.max.or(inherited.max),
            reference_path,
            field_type,
        })
    }

    /// Reference paths may carry surrounding slashes (`/users/`).
    fn is_known(&self, path: &str) -> bool {
        self.known.contains(path.trim_matches('/'))
    }
}
