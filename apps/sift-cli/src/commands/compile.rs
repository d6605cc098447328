// compile.rs - `sift compile`: print the pipeline a filter compiles to.

use clap::Args;
use serde_json::{json, Value};
use sift_filter::{CompiledQuery, Filter, FilterCompiler, TypeRegistry};

use super::FilterInputs;

#[derive(Args, Debug, Clone)]
pub struct CompileArgs {
    #[command(flatten)]
    pub inputs: FilterInputs,

    /// Print the typed stage list instead of the MongoDB pipeline.
    #[arg(long)]
    pub stages: bool,
}

pub fn execute(args: &CompileArgs) -> anyhow::Result<()> {
    let (registry, filter) = args.inputs.load()?;
    let output = render(&registry, &filter, args.stages)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Compile and render the command's JSON output.
pub fn render(registry: &TypeRegistry, filter: &Filter, stages: bool) -> anyhow::Result<Value> {
    let query = FilterCompiler::new(registry).compile(filter)?;
    let body = if stages {
        serde_json::to_value(&query.stages)?
    } else {
        Value::Array(query.pipeline())
    };
    Ok(describe(filter, &query, body))
}

fn describe(filter: &Filter, query: &CompiledQuery, body: Value) -> Value {
    json!({
        "target": query.target,
        "fingerprint": filter.fingerprint(),
        "joins": query.join_count(),
        "pipeline": body,
    })
}
