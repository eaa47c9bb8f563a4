//! `jtype run`: load a universe file and answer its queries.

use crate::args::RunArgs;
use crate::query::run_queries;
use crate::universe::{Universe, UniverseFile};
use anyhow::{Context, Result};
use jtype_solver::EngineConfig;
use std::path::Path;
use tracing::info;

pub fn run(args: &RunArgs) -> Result<String> {
    let file = read_universe(&args.file)?;
    let config = match args.max_depth {
        Some(max_depth) => EngineConfig::default().with_max_depth(max_depth),
        None => EngineConfig::default(),
    };
    let universe = Universe::load(&file.classes, config)
        .with_context(|| format!("failed to load classes from {}", args.file.display()))?;

    let results = run_queries(&universe, &file.queries)?;
    info!(
        file = %args.file.display(),
        queries = results.len(),
        "queries answered"
    );

    let output = if args.pretty {
        serde_json::to_string_pretty(&results)
    } else {
        serde_json::to_string(&results)
    };
    output.context("failed to serialize query results")
}

pub fn read_universe(path: &Path) -> Result<UniverseFile> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

#[cfg(test)]
#[path = "../tests/driver_tests.rs"]
mod tests;
