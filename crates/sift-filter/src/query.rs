// query.rs - Compiled queries and the store-driver seam.
//
// A CompiledQuery is a target collection plus an ordered list of stages:
// the joins discovered during path resolution, then one match stage. It is
// plain data; running it is the job of a `QueryExecutor` implementation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::paths::JoinStage;
use crate::predicate::Predicate;
use crate::registry::Cardinality;

/// An untyped record as returned by a store driver.
pub type Record = Map<String, Value>;

/// One pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Left outer join: attach the records of `from` whose `foreign_field`
    /// equals the left record's `local_field`, as a list under `alias`.
    Lookup {
        from: String,
        local_field: String,
        foreign_field: String,
        alias: String,
    },
    /// Flatten the list under `path` into a single value.
    Unwind {
        path: String,
        preserve_null_and_empty: bool,
    },
    /// Keep only records matching the predicate.
    Match(Predicate),
}

impl Stage {
    /// Stages implementing one join. One-to-one joins are flattened into a
    /// nullable single value; to-many joins keep the list.
    pub fn for_join(join: &JoinStage) -> Vec<Stage> {
        let mut stages = vec![Stage::Lookup {
            from: join.from.clone(),
            local_field: join.local_key.clone(),
            foreign_field: join.foreign_key.clone(),
            alias: join.alias.clone(),
        }];
        if join.cardinality == Cardinality::One {
            stages.push(Stage::Unwind {
                path: join.alias.clone(),
                preserve_null_and_empty: true,
            });
        }
        stages
    }

    /// Render as a MongoDB aggregation stage.
    pub fn to_document(&self) -> Value {
        match self {
            Stage::Lookup {
                from,
                local_field,
                foreign_field,
                alias,
            } => json!({
                "$lookup": {
                    "from": from,
                    "localField": local_field,
                    "foreignField": foreign_field,
                    "as": alias,
                }
            }),
            Stage::Unwind {
                path,
                preserve_null_and_empty,
            } => json!({
                "$unwind": {
                    "path": format!("${}", path),
                    "preserveNullAndEmptyArrays": preserve_null_and_empty,
                }
            }),
            Stage::Match(predicate) => json!({ "$match": predicate.to_document() }),
        }
    }
}

/// A store-ready query: stages to run against `target`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompiledQuery {
    /// Storage id of the filter's root type.
    pub target: String,
    pub stages: Vec<Stage>,
}

impl CompiledQuery {
    /// Append a narrowing match stage (e.g., restrict to one `_id`).
    pub fn and_match(mut self, predicate: Predicate) -> Self {
        self.stages.push(Stage::Match(predicate));
        self
    }

    /// Number of cross-collection lookups in the pipeline.
    pub fn join_count(&self) -> usize {
        self.stages
            .iter()
            .filter(|stage| matches!(stage, Stage::Lookup { .. }))
            .count()
    }

    /// The access predicate (first match stage), if any.
    pub fn predicate(&self) -> Option<&Predicate> {
        self.stages.iter().find_map(|stage| match stage {
            Stage::Match(predicate) => Some(predicate),
            _ => None,
        })
    }

    /// The pipeline in MongoDB aggregation syntax.
    pub fn pipeline(&self) -> Vec<Value> {
        self.stages.iter().map(Stage::to_document).collect()
    }
}

/// Runs compiled queries against a concrete store.
///
/// Implementations issue the stages against `query.target` and return the
/// raw matching records. Mapping records to typed entities is the caller's
/// responsibility.
pub trait QueryExecutor: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn execute(&self, query: &CompiledQuery) -> Result<Vec<Record>, Self::Error>;

    /// Driver display name (for logs and CLI output).
    fn name(&self) -> &str;
}
