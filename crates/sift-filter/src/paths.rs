// paths.rs - Relation path resolution.
//
// Walks the relations a filter traverses, starting at the root type, and
// assigns every reachable type a traversal prefix: the sequence of relation
// names leading to it. A projection `Org.is_public` on a `Repo` filter that
// reaches Org through `org` is then addressed as `org.is_public`.
//
// Relations are processed in the order the filter lists them (first
// occurrence wins for duplicates). That order is the join order: a later
// join may descend from the alias an earlier one created, so it must be
// stable across runs.

use std::collections::{HashMap, HashSet};

use crate::error::FilterError;
use crate::filter::{Filter, RelationRef};
use crate::registry::{Cardinality, TypeRegistry};

/// A cross-collection join discovered while resolving paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinStage {
    /// Storage id of the right-hand type.
    pub from: String,
    /// Dotted address of the join key on the left record.
    pub local_key: String,
    /// Join key on the right-hand record.
    pub foreign_key: String,
    /// Dotted address where the right-hand record is attached.
    pub alias: String,
    pub cardinality: Cardinality,
}

/// Traversal prefixes for every type a filter reaches, plus its joins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationPaths {
    prefixes: HashMap<String, Vec<String>>,
    joins: Vec<JoinStage>,
}

impl RelationPaths {
    /// Resolve the prefixes and joins for `filter` against `registry`.
    pub fn resolve(registry: &TypeRegistry, filter: &Filter) -> Result<Self, FilterError> {
        registry.require(&filter.root)?;

        let mut prefixes = HashMap::new();
        prefixes.insert(filter.root.clone(), Vec::new());
        let mut joins = Vec::new();
        let mut seen: HashSet<&RelationRef> = HashSet::new();

        for relation_ref in &filter.relations {
            if !seen.insert(relation_ref) {
                continue;
            }

            let relation = registry.relation(&relation_ref.left, &relation_ref.name)?;
            let left_prefix: Vec<String> = prefixes
                .get(&relation_ref.left)
                .cloned()
                .ok_or_else(|| FilterError::UnreachableType {
                    type_name: relation_ref.left.clone(),
                })?;
            let right = registry.require(&relation.right_type)?;

            let mut right_prefix = left_prefix.clone();
            right_prefix.push(relation_ref.name.clone());

            if let Some(remote_key) = relation.remote_key() {
                let from = right.storage_id.clone().ok_or_else(|| {
                    FilterError::MissingStorageId {
                        type_name: right.name.clone(),
                        relation: relation_ref.name.clone(),
                    }
                })?;
                joins.push(JoinStage {
                    from,
                    local_key: dotted(&left_prefix, &relation.local_field),
                    foreign_key: remote_key.to_string(),
                    alias: right_prefix.join("."),
                    cardinality: relation.cardinality,
                });
            }

            tracing::trace!(
                relation = %format!("{}.{}", relation_ref.left, relation_ref.name),
                right = %right.name,
                prefix = %right_prefix.join("."),
                "resolved relation path"
            );
            prefixes.insert(right.name.clone(), right_prefix);
        }

        Ok(Self { prefixes, joins })
    }

    /// Traversal prefix of `type_name`, if the filter reaches it.
    pub fn prefix(&self, type_name: &str) -> Option<&[String]> {
        self.prefixes.get(type_name).map(Vec::as_slice)
    }

    /// Dotted field address of `source.field` in the joined record.
    pub fn address(&self, source: &str, field: &str) -> Result<String, FilterError> {
        let prefix = self
            .prefix(source)
            .ok_or_else(|| FilterError::UnreachableType {
                type_name: source.to_string(),
            })?;
        Ok(dotted(prefix, field))
    }

    /// True joins in discovery order.
    pub fn joins(&self) -> &[JoinStage] {
        &self.joins
    }
}

fn dotted(prefix: &[String], field: &str) -> String {
    prefix
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(field))
        .collect::<Vec<_>>()
        .join(".")
}
