//! Field type registry.
//!
//! Types live in an arena addressed by name. A custom type records the name
//! of the type it extends, never a live reference, and every `extends` chain
//! ends at one of the [`Primitive`] types registered by
//! [`FieldTypeRegistry::with_builtins`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::builtin;
use crate::error::{SchemaError, SchemaResult};
use crate::options::SelectOption;
use crate::render::{Capability, ControlSurface, FieldRenderer, RenderContext};

/// Root types every `extends` chain terminates at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    Boolean,
    Editor,
    Assets,
    Reference,
}

impl Primitive {
    pub const ALL: [Primitive; 5] = [
        Primitive::String,
        Primitive::Boolean,
        Primitive::Editor,
        Primitive::Assets,
        Primitive::Reference,
    ];

    /// Registry key of the primitive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Boolean => "boolean",
            Primitive::Editor => "editor",
            Primitive::Assets => "assets",
            Primitive::Reference => "reference",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    fn default_label(&self) -> &'static str {
        match self {
            Primitive::String => "Text",
            Primitive::Boolean => "Checkbox",
            Primitive::Editor => "Rich text",
            Primitive::Assets => "Assets",
            Primitive::Reference => "Reference",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Type-specific attributes. Set values shadow those of the base type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAttributes {
    /// Maximum number of assets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    /// Collection a reference points into.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_path: Option<String>,
    /// Enumeration options.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SelectOption>>,
}

impl TypeAttributes {
    /// `self` laid over `base`: anything set here wins.
    pub fn overlay(&self, base: &TypeAttributes) -> TypeAttributes {
        TypeAttributes {
            max: self.max.or(base.max),
            reference_path: self
                .reference_path
                .clone()
                .or_else(|| base.reference_path.clone()),
            options: self.options.clone().or_else(|| base.options.clone()),
        }
    }
}

/// Definition of a custom field type.
#[derive(Clone)]
pub struct FieldTypeDef {
    /// Name of the registered type this one extends.
    pub extends: String,
    pub label: Option<String>,
    pub renderer: Option<Arc<dyn FieldRenderer>>,
    pub attributes: TypeAttributes,
}

impl FieldTypeDef {
    /// A definition that inherits everything from `base`.
    pub fn extending(base: impl Into<String>) -> Self {
        Self {
            extends: base.into(),
            label: None,
            renderer: None,
            attributes: TypeAttributes::default(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_renderer(mut self, renderer: Arc<dyn FieldRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn with_attributes(mut self, attributes: TypeAttributes) -> Self {
        self.attributes = attributes;
        self
    }
}

impl fmt::Debug for FieldTypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldTypeDef")
            .field("extends", &self.extends)
            .field("label", &self.label)
            .field(
                "renderer",
                &self.renderer.as_ref().map(|r| r.capabilities().to_vec()),
            )
            .field("attributes", &self.attributes)
            .finish()
    }
}

struct TypeRecord {
    name: String,
    extends: Option<String>,
    primitive: Primitive,
    label: Option<String>,
    renderer: Option<Arc<dyn FieldRenderer>>,
    attributes: TypeAttributes,
}

/// Registry of built-in and custom field types.
pub struct FieldTypeRegistry {
    records: Vec<TypeRecord>,
    index: HashMap<String, usize>,
}

impl FieldTypeRegistry {
    /// A registry holding only the primitive types.
    pub fn with_builtins() -> Self {
        let mut registry = Self {
            records: Vec::new(),
            index: HashMap::new(),
        };
        for primitive in Primitive::ALL {
            registry.push(TypeRecord {
                name: primitive.as_str().to_string(),
                extends: None,
                primitive,
                label: Some(primitive.default_label().to_string()),
                renderer: Some(builtin::renderer_for(primitive)),
                attributes: TypeAttributes::default(),
            });
        }
        registry
    }

    fn push(&mut self, record: TypeRecord) {
        self.index.insert(record.name.clone(), self.records.len());
        self.records.push(record);
    }

    fn record(&self, name: &str) -> Option<&TypeRecord> {
        self.index.get(name).map(|&i| &self.records[i])
    }

    /// Registers a custom type.
    ///
    /// # Errors
    ///
    /// - `DuplicateType` if `type_name` is already registered
    /// - `UnknownBaseType` if `definition.extends` is not registered
    /// - `CyclicType` if the base chain leads back to `type_name`
    pub fn register(&mut self, type_name: &str, definition: FieldTypeDef) -> SchemaResult<()> {
        if self.index.contains_key(type_name) {
            return Err(SchemaError::DuplicateType(type_name.to_string()));
        }
        if self.record(&definition.extends).is_none() {
            return Err(SchemaError::UnknownBaseType {
                type_name: type_name.to_string(),
                base: definition.extends,
            });
        }

        let chain = self.chain(&definition.extends)?;
        if chain.iter().any(|r| r.name == type_name) {
            return Err(SchemaError::CyclicType(type_name.to_string()));
        }
        let primitive = chain
            .last()
            .map(|root| root.primitive)
            .ok_or_else(|| SchemaError::UnknownType(definition.extends.clone()))?;

        debug!(
            field_type = %type_name,
            extends = %definition.extends,
            root = %primitive,
            "registered field type"
        );

        self.push(TypeRecord {
            name: type_name.to_string(),
            extends: Some(definition.extends),
            primitive,
            label: definition.label,
            renderer: definition.renderer,
            attributes: definition.attributes,
        });
        Ok(())
    }

    /// Records from `type_name` down to its root primitive.
    fn chain(&self, type_name: &str) -> SchemaResult<Vec<&TypeRecord>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(type_name);

        while let Some(name) = current {
            if !seen.insert(name) {
                return Err(SchemaError::CyclicType(name.to_string()));
            }
            let record = self
                .record(name)
                .ok_or_else(|| SchemaError::UnknownType(name.to_string()))?;
            chain.push(record);
            current = record.extends.as_deref();
        }
        Ok(chain)
    }

    /// Resolves the effective definition of `type_name`.
    ///
    /// Label, attributes and each capability come from the nearest type in
    /// the chain that sets them.
    pub fn resolve(&self, type_name: &str) -> SchemaResult<ResolvedFieldType> {
        let chain = self.chain(type_name)?;
        let root = chain
            .last()
            .ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))?;
        let primitive = root.primitive;

        let label = chain
            .iter()
            .find_map(|r| r.label.clone())
            .unwrap_or_else(|| primitive.default_label().to_string());

        let attributes = chain
            .iter()
            .rev()
            .fold(TypeAttributes::default(), |acc, r| r.attributes.overlay(&acc));

        let provider = |capability: Capability| -> CapabilityProvider {
            chain
                .iter()
                .find_map(|r| {
                    r.renderer
                        .as_ref()
                        .filter(|renderer| renderer.capabilities().contains(&capability))
                        .map(|renderer| CapabilityProvider {
                            source: r.name.clone(),
                            renderer: Arc::clone(renderer),
                        })
                })
                .unwrap_or_else(|| CapabilityProvider {
                    source: primitive.as_str().to_string(),
                    renderer: builtin::renderer_for(primitive),
                })
        };

        Ok(ResolvedFieldType {
            name: type_name.to_string(),
            chain: chain.iter().map(|r| r.name.clone()).collect(),
            primitive,
            label,
            attributes,
            render: provider(Capability::Render),
            get_value: provider(Capability::GetValue),
            cleanup: provider(Capability::Cleanup),
            render_output: provider(Capability::RenderOutput),
        })
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.index.contains_key(type_name)
    }

    /// Registered type names in registration order, primitives first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Custom type names in registration order.
    pub fn custom_names(&self) -> impl Iterator<Item = &str> {
        self.records
            .iter()
            .filter(|r| r.extends.is_some())
            .map(|r| r.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for FieldTypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for FieldTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[derive(Clone)]
struct CapabilityProvider {
    source: String,
    renderer: Arc<dyn FieldRenderer>,
}

/// A field type with its inheritance chain flattened.
#[derive(Clone)]
pub struct ResolvedFieldType {
    name: String,
    chain: Vec<String>,
    primitive: Primitive,
    label: String,
    attributes: TypeAttributes,
    render: CapabilityProvider,
    get_value: CapabilityProvider,
    cleanup: CapabilityProvider,
    render_output: CapabilityProvider,
}

impl ResolvedFieldType {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type names from this type down to its root primitive.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn primitive(&self) -> Primitive {
        self.primitive
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn attributes(&self) -> &TypeAttributes {
        &self.attributes
    }

    /// Name of the type whose renderer supplies `capability`.
    pub fn capability_source(&self, capability: Capability) -> &str {
        &self.provider(capability).source
    }

    fn provider(&self, capability: Capability) -> &CapabilityProvider {
        match capability {
            Capability::Render => &self.render,
            Capability::GetValue => &self.get_value,
            Capability::Cleanup => &self.cleanup,
            Capability::RenderOutput => &self.render_output,
        }
    }

    pub fn render(&self, ctx: &RenderContext<'_>) -> String {
        self.render.renderer.render(ctx)
    }

    pub fn get_value(&self, ctx: &RenderContext<'_>, controls: &dyn ControlSurface) -> Value {
        self.get_value.renderer.get_value(ctx, controls)
    }

    pub fn cleanup(&self, ctx: &RenderContext<'_>) {
        self.cleanup.renderer.cleanup(ctx)
    }

    pub fn render_output(&self, ctx: &RenderContext<'_>) -> String {
        self.render_output.renderer.render_output(ctx)
    }

    /// Renders an editable control and returns a guard that runs `cleanup`
    /// when dropped, whether or not the value was ever read.
    pub fn mount(&self, name: &str, label: &str, value: Option<&Value>) -> MountedField<'_> {
        let markup = self.render(&RenderContext::new(name, label, value));
        MountedField {
            field_type: self,
            name: name.to_string(),
            label: label.to_string(),
            value: value.cloned(),
            markup,
        }
    }
}

impl fmt::Debug for ResolvedFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedFieldType")
            .field("name", &self.name)
            .field("chain", &self.chain)
            .field("label", &self.label)
            .field("attributes", &self.attributes)
            .finish_non_exhaustive()
    }
}

/// A rendered control. Dropping it runs the type's `cleanup` exactly once.
pub struct MountedField<'t> {
    field_type: &'t ResolvedFieldType,
    name: String,
    label: String,
    value: Option<Value>,
    markup: String,
}

impl MountedField<'_> {
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Reads the user-entered value back from the live controls.
    pub fn value(&self, controls: &dyn ControlSurface) -> Value {
        let ctx = RenderContext::new(&self.name, &self.label, self.value.as_ref());
        self.field_type.get_value(&ctx, controls)
    }
}

impl Drop for MountedField<'_> {
    fn drop(&mut self) {
        let ctx = RenderContext::new(&self.name, &self.label, self.value.as_ref());
        self.field_type.cleanup(&ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = FieldTypeRegistry::with_builtins();
        assert_eq!(registry.len(), Primitive::ALL.len());
        for primitive in Primitive::ALL {
            let resolved = registry.resolve(primitive.as_str()).unwrap();
            assert_eq!(resolved.primitive(), primitive);
            assert_eq!(resolved.chain(), &[primitive.as_str().to_string()]);
        }
        assert_eq!(registry.custom_names().count(), 0);
    }

    #[test]
    fn primitive_names_round_trip() {
        for primitive in Primitive::ALL {
            assert_eq!(Primitive::from_name(primitive.as_str()), Some(primitive));
        }
        assert_eq!(Primitive::from_name("number"), None);
    }

    #[test]
    fn overlay_prefers_derived_values() {
        let base = TypeAttributes {
            max: Some(5),
            reference_path: Some("users".into()),
            options: None,
        };
        let derived = TypeAttributes {
            max: Some(1),
            ..TypeAttributes::default()
        };
        let merged = derived.overlay(&base);
        assert_eq!(merged.max, Some(1));
        assert_eq!(merged.reference_path.as_deref(), Some("users"));
        assert!(merged.options.is_none());
    }

    #[test]
    fn self_extension_is_rejected() {
        let mut registry = FieldTypeRegistry::with_builtins();
        let err = registry
            .register("loop", FieldTypeDef::extending("loop"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownBaseType { .. }));
        assert!(!registry.contains("loop"));
    }
}
