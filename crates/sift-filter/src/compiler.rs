// compiler.rs - Filter compiler entry point.
//
// Compiles a Filter into a CompiledQuery:
// 1. Resolve relation paths from the root (prefixes + true joins)
// 2. Compile every condition into a field-addressed predicate
// 3. Compose the predicates as OR-of-ANDs with the vacuous defaults
// 4. Assemble join stages + one match stage against the root's storage id
//
// Compilation is a pure function of the registry and the filter: no I/O,
// no shared mutable state. One compiler can serve any number of threads.

use crate::condition::compile_condition;
use crate::error::FilterError;
use crate::filter::Filter;
use crate::formula::compile_formula;
use crate::paths::RelationPaths;
use crate::query::{CompiledQuery, Stage};
use crate::registry::TypeRegistry;

/// Compiles filters against a frozen type registry.
#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> FilterCompiler<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Compile `filter` into a store-ready query.
    pub fn compile(&self, filter: &Filter) -> Result<CompiledQuery, FilterError> {
        let root = self.registry.require(&filter.root)?;
        let target = root
            .storage_id
            .clone()
            .ok_or_else(|| FilterError::MissingRootStorage {
                type_name: root.name.clone(),
            })?;

        let paths = RelationPaths::resolve(self.registry, filter)?;

        let conjuncts = filter
            .disjuncts
            .iter()
            .map(|conjunct| {
                conjunct
                    .iter()
                    .map(|condition| compile_condition(self.registry, &paths, condition))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;
        let predicate = compile_formula(conjuncts);

        let mut stages: Vec<Stage> = paths.joins().iter().flat_map(Stage::for_join).collect();
        stages.push(Stage::Match(predicate));

        let query = CompiledQuery { target, stages };
        tracing::debug!(
            root = %filter.root,
            fingerprint = %filter.fingerprint(),
            collection = %query.target,
            stages = query.stages.len(),
            "compiled filter"
        );
        tracing::debug!(
            "pipeline: {}",
            serde_json::Value::Array(query.pipeline())
        );
        Ok(query)
    }
}

/// Compile `filter` against `registry`.
pub fn compile(registry: &TypeRegistry, filter: &Filter) -> Result<CompiledQuery, FilterError> {
    FilterCompiler::new(registry).compile(filter)
}
