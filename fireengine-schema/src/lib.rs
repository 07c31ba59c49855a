//! Schema core for the FireEngine admin panel.
//!
//! Turns a [`Configuration`] into the data the admin panel engine renders from:
//! - [`FieldTypeRegistry`]: built-in primitives plus custom types that extend them
//! - [`SchemaResolver`]: lays per-collection overrides over the defaults and validates them
//! - [`FieldRenderer`]: the four rendering capabilities a field type may provide
//! - [`bootstrap`]: validation, registry construction and resolution in one call
//!
//! Everything here runs once, synchronously, before the panel is mounted.
//! Any error is fatal to startup.

mod bootstrap;
pub mod builtin;
mod collection;
mod config;
mod error;
mod field;
mod field_type;
mod options;
mod render;
mod resolver;

pub use bootstrap::{
    AdminPanelMount, RendererCatalog, ResolvedConfiguration, bootstrap, build_registry,
};
pub use collection::{CollectionOverride, CollectionSchema};
pub use config::{AdminCredentials, Configuration, CustomFieldSpec, WebappConfig};
pub use error::{SchemaError, SchemaResult};
pub use field::{FieldOverride, ResolvedField, is_identifier, title_case};
pub use field_type::{
    FieldTypeDef, FieldTypeRegistry, MountedField, Primitive, ResolvedFieldType, TypeAttributes,
};
pub use options::{SelectOption, normalize_option, normalize_options};
pub use render::{
    Capability, ControlSurface, EMPTY_PLACEHOLDER, FieldRenderer, RenderContext, control_id,
    escape_html,
};
pub use resolver::{DEFAULTS, ResolverDefaults, SchemaResolver};
