// error.rs - Error types for registry construction and filter compilation.
//
// Every compile-time failure is fatal to that compilation and carries the
// offending type / field / relation name so a misconfigured policy or
// registry can be diagnosed from the message alone.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while compiling a filter into a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// A type reached through a true join has no storage id to look up from.
    #[error(
        "type '{type_name}' is joined through relation '{relation}' but has no storage_id"
    )]
    MissingStorageId { type_name: String, relation: String },

    /// The filter's root type has no collection to run the query against.
    #[error("root type '{type_name}' has no storage_id to query")]
    MissingRootStorage { type_name: String },

    /// A condition compares against a whole object instead of a key field.
    #[error(
        "cannot compare against an instance of '{type_name}'; compare a unique key field instead"
    )]
    UnsupportedOperand { type_name: String },

    /// A condition uses a comparator the compiler has no translation for.
    #[error("unsupported comparator '{comparator}'")]
    UnsupportedComparator { comparator: String },

    /// The filter traverses a relation the registry does not declare.
    #[error("type '{type_name}' has no relation named '{relation}'")]
    MissingRelation { type_name: String, relation: String },

    /// The filter names a type that was never registered.
    #[error("unknown type '{type_name}'")]
    UnknownType { type_name: String },

    /// A projection names a field its type does not declare.
    #[error("type '{type_name}' has no field named '{field}'")]
    UnknownField { type_name: String, field: String },

    /// A projection's source type is not reachable from the filter root.
    #[error("type '{type_name}' is not reachable from the filter root")]
    UnreachableType { type_name: String },
}

/// Errors raised while building a [`TypeRegistry`](crate::TypeRegistry).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The same type name was registered twice.
    #[error("type '{type_name}' is registered more than once")]
    DuplicateType { type_name: String },

    /// A relation points at a type that was never registered.
    #[error("relation '{type_name}.{relation}' targets unknown type '{target}'")]
    UnknownRelationTarget {
        type_name: String,
        relation: String,
        target: String,
    },

    /// A true join's local key is not declared on the left-hand type.
    #[error("relation '{type_name}.{relation}' joins from '{field}', which '{type_name}' does not declare")]
    UnknownLocalField {
        type_name: String,
        relation: String,
        field: String,
    },

    /// A relation's remote field is not declared on its right-hand type.
    #[error("relation '{type_name}.{relation}' joins on '{target}.{field}', which is not declared")]
    UnknownRemoteField {
        type_name: String,
        relation: String,
        target: String,
        field: String,
    },

    /// A relation has no local field to join or descend through.
    #[error("relation '{type_name}.{relation}' has an empty local field")]
    EmptyLocalField { type_name: String, relation: String },

    /// Failed to read a registry config file.
    #[error("failed to read registry config at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The registry config file is not valid YAML for the expected shape.
    #[error("invalid YAML registry config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The registry config file is not valid TOML for the expected shape.
    #[error("invalid TOML registry config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_error_names_the_offender() {
        let err = FilterError::MissingStorageId {
            type_name: "Org".to_string(),
            relation: "org".to_string(),
        };
        let display = err.to_string();
        assert!(display.contains("Org"));
        assert!(display.contains("org"));
        assert!(display.contains("storage_id"));
    }

    #[test]
    fn unsupported_operand_suggests_key_field() {
        let err = FilterError::UnsupportedOperand {
            type_name: "User".to_string(),
        };
        assert!(err.to_string().contains("unique key field"));
    }

    #[test]
    fn registry_error_display() {
        let err = RegistryError::UnknownRelationTarget {
            type_name: "Repo".to_string(),
            relation: "org".to_string(),
            target: "Orgg".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "relation 'Repo.org' targets unknown type 'Orgg'"
        );
    }
}
