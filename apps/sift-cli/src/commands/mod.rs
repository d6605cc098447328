pub mod compile;
pub mod query;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use sift_filter::{Filter, RegistryConfig, TypeRegistry};

/// Inputs shared by every command: the type registry and the filter.
#[derive(Args, Debug, Clone)]
pub struct FilterInputs {
    /// Registry config (YAML, or TOML with a .toml extension).
    #[arg(long)]
    pub registry: PathBuf,

    /// Filter JSON as produced by the policy evaluator.
    #[arg(long)]
    pub filter: PathBuf,
}

impl FilterInputs {
    pub fn load(&self) -> anyhow::Result<(TypeRegistry, Filter)> {
        let registry = RegistryConfig::load(&self.registry)
            .and_then(RegistryConfig::into_registry)
            .with_context(|| format!("loading registry {}", self.registry.display()))?;
        let filter = load_filter(&self.filter)?;
        tracing::debug!(
            types = registry.len(),
            root = %filter.root,
            "loaded registry and filter"
        );
        Ok((registry, filter))
    }
}

fn load_filter(path: &Path) -> anyhow::Result<Filter> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading filter {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing filter {}", path.display()))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let (registry, filter) = fixtures::write(dir.path());
        let inputs = FilterInputs { registry, filter };
        let (registry, filter) = inputs.load().unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(filter.root, "Repo");
    }

    #[test]
    fn bad_filter_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let (registry, filter) = fixtures::write(dir.path());
        std::fs::write(&filter, "{ nope").unwrap();
        let err = FilterInputs { registry, filter }.load().unwrap_err();
        assert!(format!("{:#}", err).contains("filter.json"));
    }
}
