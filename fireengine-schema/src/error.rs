//! Error types for schema resolution.

use thiserror::Error;

/// Errors raised while building the field type registry or resolving
/// collection schemas. All of them are fatal to startup.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A custom field type extends a type that is not registered.
    #[error("field type '{type_name}' extends unknown type '{base}'")]
    UnknownBaseType { type_name: String, base: String },

    /// A field type name collides with one already registered.
    #[error("field type already registered: {0}")]
    DuplicateType(String),

    /// A field references a type name that is not registered.
    #[error("unknown field type: {0}")]
    UnknownType(String),

    /// An `extends` chain loops back on itself.
    #[error("cyclic extends chain at field type '{0}'")]
    CyclicType(String),

    /// Two fields in one collection share a name.
    #[error("duplicate field '{field}' in collection '{collection}'")]
    DuplicateField { collection: String, field: String },

    /// A relation field points at a collection the configuration does not know.
    #[error(
        "field '{field}' in collection '{collection}' references unknown collection '{reference_path}'"
    )]
    UnknownReference {
        collection: String,
        field: String,
        reference_path: String,
    },

    /// A reference-typed field has no `referencePath`.
    #[error("reference field '{field}' in collection '{collection}' has no referencePath")]
    MissingReferencePath { collection: String, field: String },

    /// A field definition omits `name`.
    #[error("field #{index} in collection '{collection}' has no name")]
    MissingFieldName { collection: String, index: usize },

    /// A field name is empty or not an identifier.
    #[error("invalid field name '{name}' in collection '{collection}'")]
    InvalidFieldName { collection: String, name: String },

    /// An `options` entry is neither a scalar, a `[value, text]` pair, nor an object.
    #[error("malformed option #{index} on '{field}': {reason}")]
    MalformedOption {
        field: String,
        index: usize,
        reason: String,
    },

    /// A custom field declaration names a renderer missing from the catalog.
    #[error("unknown renderer '{renderer}' for field type '{type_name}'")]
    UnknownRenderer { type_name: String, renderer: String },

    /// The configuration is structurally invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;
