// query.rs - `sift query`: compile a filter and run it against fixtures.
//
// Fixtures are a directory of `<storage_id>.json` files, each a JSON array
// of documents, loaded into the in-memory store driver.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use sift_filter::{Filter, FilterCompiler, Predicate, QueryExecutor, Record, TypeRegistry};
use sift_store::MemoryStore;

use super::FilterInputs;

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[command(flatten)]
    pub inputs: FilterInputs,

    /// Directory of `<collection>.json` fixture files.
    #[arg(long)]
    pub data: PathBuf,

    /// Only return the record with this `_id` (JSON value, or a bare string).
    #[arg(long)]
    pub id: Option<String>,
}

pub fn execute(args: &QueryArgs) -> anyhow::Result<()> {
    let (registry, filter) = args.inputs.load()?;
    let store = MemoryStore::load_dir(&args.data)
        .with_context(|| format!("loading fixtures from {}", args.data.display()))?;
    let records = run(&registry, &filter, &store, args.id.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

/// Compile `filter`, optionally narrow it to one `_id`, and execute it.
pub fn run(
    registry: &TypeRegistry,
    filter: &Filter,
    store: &MemoryStore,
    id: Option<&str>,
) -> anyhow::Result<Vec<Record>> {
    let mut query = FilterCompiler::new(registry).compile(filter)?;
    if let Some(id) = id {
        query = query.and_match(Predicate::id_eq(parse_id(id)));
    }
    let records = store
        .execute(&query)
        .with_context(|| format!("executing against '{}' ({})", query.target, store.name()))?;
    tracing::info!(matched = records.len(), "query finished");
    Ok(records)
}

fn parse_id(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
