// registry.rs - Type registry: storage ids, fields and relations per entity type.
//
// The registry is built once through `TypeRegistryBuilder` and is immutable
// afterwards: `build()` consumes the builder and `TypeRegistry` exposes no
// mutating methods, so it can be shared across threads (`Arc<TypeRegistry>`)
// and read by any number of concurrent compilations.
//
// Relation targets and join keys are validated at build time so a typo in a
// registration surfaces immediately instead of as a failed lookup deep inside
// a compilation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{FilterError, RegistryError};

/// The implicit primary key every document carries.
pub const ID_FIELD: &str = "_id";

/// Primitive kind of a declared field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Bool,
    Integer,
    Float,
    List,
    Object,
    Id,
}

/// How many right-hand records a relation yields per left-hand record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[default]
    One,
    Many,
}

/// A named, directed edge from a left type to a right type.
///
/// When `remote_field` is set the relation is a true join: right-hand records
/// live in `right.storage_id` and are matched on `local_field = remote_field`.
/// When it is empty the right-hand record is embedded in the left document
/// under `local_field` and is addressed by dotted path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationDescriptor {
    #[serde(default, alias = "kind")]
    pub cardinality: Cardinality,
    #[serde(alias = "other_type")]
    pub right_type: String,
    #[serde(alias = "my_field")]
    pub local_field: String,
    #[serde(default, alias = "other_field")]
    pub remote_field: Option<String>,
}

impl RelationDescriptor {
    /// A one-to-one true join: `left.local_field = right.remote_field`.
    pub fn join(
        right_type: impl Into<String>,
        local_field: impl Into<String>,
        remote_field: impl Into<String>,
    ) -> Self {
        Self {
            cardinality: Cardinality::One,
            right_type: right_type.into(),
            local_field: local_field.into(),
            remote_field: Some(remote_field.into()),
        }
    }

    /// A one-to-one embedded relation stored under `local_field`.
    pub fn embedded(right_type: impl Into<String>, local_field: impl Into<String>) -> Self {
        Self {
            cardinality: Cardinality::One,
            right_type: right_type.into(),
            local_field: local_field.into(),
            remote_field: None,
        }
    }

    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// The join key on the right type, if this is a true join.
    ///
    /// An empty string is treated the same as no remote field at all.
    pub fn remote_key(&self) -> Option<&str> {
        self.remote_field.as_deref().filter(|f| !f.is_empty())
    }

    pub fn is_true_join(&self) -> bool {
        self.remote_key().is_some()
    }
}

/// Static description of one entity type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// Type name as the policy evaluator refers to it (e.g., "Repo").
    #[serde(skip)]
    pub name: String,
    /// Collection / table holding records of this type.
    #[serde(default)]
    pub storage_id: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldKind>,
    #[serde(default)]
    pub relations: BTreeMap<String, RelationDescriptor>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_id: None,
            fields: BTreeMap::new(),
            relations: BTreeMap::new(),
        }
    }

    pub fn storage_id(mut self, storage_id: impl Into<String>) -> Self {
        self.storage_id = Some(storage_id.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.insert(name.into(), kind);
        self
    }

    pub fn relation(mut self, name: impl Into<String>, relation: RelationDescriptor) -> Self {
        self.relations.insert(name.into(), relation);
        self
    }

    /// Whether a projection may address `field` on this type.
    ///
    /// Relation names count as fields (an embedded document can be compared
    /// whole), and every type carries the implicit `_id`.
    pub fn has_field(&self, field: &str) -> bool {
        field == ID_FIELD || self.fields.contains_key(field) || self.relations.contains_key(field)
    }
}

/// Collects type descriptors before freezing them into a [`TypeRegistry`].
#[derive(Debug, Default)]
pub struct TypeRegistryBuilder {
    types: Vec<TypeDescriptor>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, descriptor: TypeDescriptor) -> Self {
        self.types.push(descriptor);
        self
    }

    /// Validate all registrations and freeze them.
    pub fn build(self) -> Result<TypeRegistry, RegistryError> {
        let mut types = BTreeMap::new();
        for descriptor in self.types {
            if types.contains_key(&descriptor.name) {
                return Err(RegistryError::DuplicateType {
                    type_name: descriptor.name,
                });
            }
            types.insert(descriptor.name.clone(), descriptor);
        }

        for descriptor in types.values() {
            for (relation_name, relation) in &descriptor.relations {
                validate_relation(&types, descriptor, relation_name, relation)?;
            }
        }

        tracing::debug!(types = types.len(), "type registry frozen");
        Ok(TypeRegistry { types })
    }
}

fn validate_relation(
    types: &BTreeMap<String, TypeDescriptor>,
    left: &TypeDescriptor,
    relation_name: &str,
    relation: &RelationDescriptor,
) -> Result<(), RegistryError> {
    if relation.local_field.is_empty() {
        return Err(RegistryError::EmptyLocalField {
            type_name: left.name.clone(),
            relation: relation_name.to_string(),
        });
    }

    let right = types
        .get(&relation.right_type)
        .ok_or_else(|| RegistryError::UnknownRelationTarget {
            type_name: left.name.clone(),
            relation: relation_name.to_string(),
            target: relation.right_type.clone(),
        })?;

    if let Some(remote) = relation.remote_key() {
        if !left.has_field(&relation.local_field) {
            return Err(RegistryError::UnknownLocalField {
                type_name: left.name.clone(),
                relation: relation_name.to_string(),
                field: relation.local_field.clone(),
            });
        }
        if !right.has_field(remote) {
            return Err(RegistryError::UnknownRemoteField {
                type_name: left.name.clone(),
                relation: relation_name.to_string(),
                target: right.name.clone(),
                field: remote.to_string(),
            });
        }
    }
    Ok(())
}

/// Immutable lookup of every registered entity type.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: BTreeMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Look up a type the filter depends on, failing with `UnknownType`.
    pub fn require(&self, name: &str) -> Result<&TypeDescriptor, FilterError> {
        self.get(name).ok_or_else(|| FilterError::UnknownType {
            type_name: name.to_string(),
        })
    }

    /// Look up `type_name.relation`, failing with `MissingRelation`.
    pub fn relation(
        &self,
        type_name: &str,
        relation: &str,
    ) -> Result<&RelationDescriptor, FilterError> {
        self.require(type_name)?
            .relations
            .get(relation)
            .ok_or_else(|| FilterError::MissingRelation {
                type_name: type_name.to_string(),
                relation: relation.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
