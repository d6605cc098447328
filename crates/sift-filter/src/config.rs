// config.rs - Registry configuration files.
//
// A RegistryConfig declares every entity type the policy evaluator may hand
// the compiler. It can be written as YAML or TOML:
//
// ```yaml
// types:
//   Repo:
//     storage_id: repos
//     fields: { org_id: id }
//     relations:
//       org: { kind: one, other_type: Org, my_field: org_id, other_field: _id }
// ```
//
// Loading a config always goes through `TypeRegistryBuilder`, so file-based
// registries get the same validation as ones built in code.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::registry::{TypeDescriptor, TypeRegistry};

/// Top-level registry configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Type name → descriptor.
    #[serde(default)]
    pub types: BTreeMap<String, TypeDescriptor>,
}

impl RegistryConfig {
    pub fn from_yaml(text: &str) -> Result<Self, RegistryError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_toml(text: &str) -> Result<Self, RegistryError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a config file; `.toml` files are parsed as TOML, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml(&text),
            _ => Self::from_yaml(&text),
        }
    }

    /// Validate and freeze into a registry.
    pub fn into_registry(self) -> Result<TypeRegistry, RegistryError> {
        self.types
            .into_iter()
            .fold(TypeRegistry::builder(), |builder, (name, mut descriptor)| {
                descriptor.name = name;
                builder.register(descriptor)
            })
            .build()
    }
}
