// memory.rs - In-memory document store implementing QueryExecutor.
//
// Holds collections of JSON documents keyed by storage id and runs compiled
// pipelines over them stage by stage:
//
// - Lookup: left outer join; every left record gets the (possibly empty)
//   list of matching right records under the alias
// - Unwind: one output record per list element; with
//   `preserve_null_and_empty` a record whose list is empty or missing is
//   kept instead of dropped
// - Match: keep records satisfying the predicate (see eval.rs)
//
// Intended for tests, demos and fixtures, not for large data sets.

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value;
use sift_filter::{CompiledQuery, QueryExecutor, Record, Stage};

use crate::error::StoreError;
use crate::eval::{get_path, matches, path_values, remove_path, set_path, NULL};

/// Collections of JSON documents held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: HashMap<String, Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document to `collection`, creating it if needed.
    pub fn insert(&mut self, collection: impl Into<String>, record: Record) {
        self.collections
            .entry(collection.into())
            .or_default()
            .push(record);
    }

    /// Append a JSON value, which must be an object.
    pub fn insert_value(
        &mut self,
        collection: impl Into<String>,
        value: Value,
    ) -> Result<(), StoreError> {
        let collection = collection.into();
        match value {
            Value::Object(record) => {
                self.insert(collection, record);
                Ok(())
            }
            _ => Err(StoreError::InvalidDocument {
                index: self.collections.get(&collection).map_or(0, Vec::len),
                collection,
            }),
        }
    }

    /// Load every `<collection>.json` file in `dir`; each holds a JSON array
    /// of documents.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut store = Self::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let Some(collection) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };

            let text = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let documents: Vec<Value> =
                serde_json::from_str(&text).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?;
            let count = documents.len();
            for document in documents {
                store.insert_value(collection, document)?;
            }
            // Empty fixture files still declare the collection.
            store.collections.entry(collection.to_string()).or_default();
            tracing::debug!(collection, documents = count, "loaded fixture collection");
        }
        Ok(store)
    }

    pub fn collection(&self, name: &str) -> Option<&[Record]> {
        self.collections.get(name).map(Vec::as_slice)
    }

    fn run_stage(&self, stage: &Stage, rows: Vec<Record>) -> Vec<Record> {
        match stage {
            Stage::Lookup {
                from,
                local_field,
                foreign_field,
                alias,
            } => {
                let foreign = self.collection(from).unwrap_or(&[]);
                rows.into_iter()
                    .map(|mut row| {
                        let joined = lookup(&row, local_field, foreign, foreign_field);
                        set_path(&mut row, alias, Value::Array(joined));
                        row
                    })
                    .collect()
            }
            Stage::Unwind {
                path,
                preserve_null_and_empty,
            } => rows
                .into_iter()
                .flat_map(|row| unwind(row, path, *preserve_null_and_empty))
                .collect(),
            Stage::Match(predicate) => rows
                .into_iter()
                .filter(|row| matches(predicate, row))
                .collect(),
        }
    }
}

/// Right-hand records whose `foreign_field` equals `row.local_field`.
///
/// A missing key on either side compares as null; an array key matches any
/// of its elements.
fn lookup(row: &Record, local_field: &str, foreign: &[Record], foreign_field: &str) -> Vec<Value> {
    let keys = join_keys(path_values(row, local_field));
    foreign
        .iter()
        .filter(|candidate| {
            join_keys(path_values(candidate, foreign_field))
                .iter()
                .any(|key| keys.contains(key))
        })
        .map(|candidate| Value::Object(candidate.clone()))
        .collect()
}

fn join_keys(reached: Vec<&Value>) -> Vec<&Value> {
    if reached.is_empty() {
        return vec![&NULL];
    }
    reached
        .into_iter()
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .collect()
}

fn unwind(row: Record, path: &str, preserve_null_and_empty: bool) -> Vec<Record> {
    let current = get_path(&row, path).cloned();
    match current {
        Some(Value::Array(items)) if !items.is_empty() => items
            .into_iter()
            .map(|item| {
                let mut out = row.clone();
                set_path(&mut out, path, item);
                out
            })
            .collect(),
        Some(Value::Array(_)) if preserve_null_and_empty => {
            let mut out = row;
            remove_path(&mut out, path);
            vec![out]
        }
        None | Some(Value::Null) if preserve_null_and_empty => vec![row],
        Some(Value::Array(_)) | None | Some(Value::Null) => Vec::new(),
        Some(_) => vec![row],
    }
}

impl QueryExecutor for MemoryStore {
    type Error = StoreError;

    fn execute(&self, query: &CompiledQuery) -> Result<Vec<Record>, StoreError> {
        let Some(documents) = self.collection(&query.target) else {
            tracing::warn!(target_collection = %query.target, "query against unknown collection");
            return Err(StoreError::UnknownCollection {
                name: query.target.clone(),
            });
        };

        let rows = query
            .stages
            .iter()
            .fold(documents.to_vec(), |rows, stage| self.run_stage(stage, rows));
        tracing::debug!(
            target_collection = %query.target,
            stages = query.stages.len(),
            matched = rows.len(),
            "executed query"
        );
        Ok(rows)
    }

    fn name(&self) -> &str {
        "memory"
    }
}
