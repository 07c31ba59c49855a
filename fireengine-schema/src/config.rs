//! The root configuration object.
//!
//! Loaded once at startup from JSON or TOML and read-only afterwards. The
//! wire format uses camelCase keys.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::collection::CollectionOverride;
use crate::error::{SchemaError, SchemaResult};

/// Service-account credentials for the admin SDK. Opaque to resolution.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCredentials {
    pub project_id: String,
    pub private_key: String,
    pub client_email: String,
}

impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("project_id", &self.project_id)
            .field("private_key", &"<redacted>")
            .field("client_email", &self.client_email)
            .finish()
    }
}

/// Client-side web app settings handed to the admin panel's sign-in page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebappConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bucket: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
}

/// Declarative custom field type.
///
/// Rendering behavior cannot be expressed in a config file, so `renderer`
/// names an entry in a [`RendererCatalog`](crate::RendererCatalog).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldSpec {
    pub extends: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renderer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<Value>>,
}

impl CustomFieldSpec {
    pub fn extending(base: impl Into<String>) -> Self {
        Self {
            extends: base.into(),
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_renderer(mut self, renderer: impl Into<String>) -> Self {
        self.renderer = Some(renderer.into());
        self
    }
}

/// Root configuration for one admin panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub admin_credentials: AdminCredentials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webapp_config: Option<WebappConfig>,
    /// Account that is always granted admin access.
    pub owner_email: String,
    /// Public domain the panel is served from.
    pub domain: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signin_methods: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_maps_api_key: Option<String>,
    #[serde(default)]
    pub use_firestore_access_rules: bool,
    /// A repeated type name is rejected at load time.
    #[serde(default, deserialize_with = "unique_keys::deserialize")]
    pub custom_fields: BTreeMap<String, CustomFieldSpec>,
    /// A repeated collection name is rejected at load time.
    #[serde(default, deserialize_with = "unique_keys::deserialize")]
    pub schema_overrides: BTreeMap<String, CollectionOverride>,
    #[serde(default)]
    pub ignore_collections: BTreeSet<String>,
    /// Collections present in the data store that have no override.
    #[serde(default)]
    pub collections: BTreeSet<String>,
}

impl Configuration {
    /// A configuration with no custom fields, overrides or collections.
    pub fn new(
        admin_credentials: AdminCredentials,
        owner_email: impl Into<String>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            admin_credentials,
            webapp_config: None,
            owner_email: owner_email.into(),
            domain: domain.into(),
            signin_methods: Vec::new(),
            google_maps_api_key: None,
            use_firestore_access_rules: false,
            custom_fields: BTreeMap::new(),
            schema_overrides: BTreeMap::new(),
            ignore_collections: BTreeSet::new(),
            collections: BTreeSet::new(),
        }
    }

    pub fn with_override(mut self, collection: impl Into<String>, o: CollectionOverride) -> Self {
        self.schema_overrides.insert(collection.into(), o);
        self
    }

    pub fn with_custom_field(mut self, type_name: impl Into<String>, spec: CustomFieldSpec) -> Self {
        self.custom_fields.insert(type_name.into(), spec);
        self
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collections.insert(collection.into());
        self
    }

    pub fn ignoring(mut self, collection: impl Into<String>) -> Self {
        self.ignore_collections.insert(collection.into());
        self
    }

    pub fn from_json_str(s: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml_str(s: &str) -> SchemaResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Loads a configuration file. `.toml` files are read as TOML, anything
    /// else as JSON.
    pub fn from_path(path: &Path) -> SchemaResult<Self> {
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }

    /// Checks structural requirements that serde cannot express.
    pub fn validate(&self) -> SchemaResult<()> {
        let creds = &self.admin_credentials;
        if creds.project_id.trim().is_empty() {
            return Err(SchemaError::InvalidConfig(
                "adminCredentials.projectId is required".into(),
            ));
        }
        if creds.private_key.trim().is_empty() {
            return Err(SchemaError::InvalidConfig(
                "adminCredentials.privateKey is required".into(),
            ));
        }
        if creds.client_email.trim().is_empty() {
            return Err(SchemaError::InvalidConfig(
                "adminCredentials.clientEmail is required".into(),
            ));
        }
        if !self.owner_email.contains('@') {
            return Err(SchemaError::InvalidConfig(format!(
                "ownerEmail must be an e-mail address, got '{}'",
                self.owner_email
            )));
        }
        if self.domain.trim().is_empty() {
            return Err(SchemaError::InvalidConfig("domain is required".into()));
        }
        Ok(())
    }

    pub fn is_ignored(&self, collection: &str) -> bool {
        self.ignore_collections.contains(collection)
    }

    /// Every collection the admin panel will surface: overridden and listed
    /// collections, minus ignored ones.
    pub fn known_collections(&self) -> BTreeSet<&str> {
        self.schema_overrides
            .keys()
            .chain(self.collections.iter())
            .map(String::as_str)
            .filter(|name| !self.is_ignored(name))
            .collect()
    }
}

/// Map deserialization that fails on a repeated key instead of keeping the last entry.
mod unique_keys {
    use std::collections::BTreeMap;
    use std::fmt;
    use std::marker::PhantomData;

    use serde::de::{Error, MapAccess, Visitor};
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<BTreeMap<String, V>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        deserializer.deserialize_map(UniqueKeys(PhantomData))
    }

    struct UniqueKeys<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueKeys<V> {
        type Value = BTreeMap<String, V>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map with unique keys")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut map = BTreeMap::new();
            while let Some((key, value)) = access.next_entry::<String, V>()? {
                if map.contains_key(&key) {
                    return Err(A::Error::custom(format!("duplicate key '{key}'")));
                }
                map.insert(key, value);
            }
            Ok(map)
        }
    }
}
