use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the jtype binary.
#[derive(Parser, Debug)]
#[command(
    name = "jtype",
    version,
    about = "Generic type queries over a JSON class universe"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the classes of a universe file and answer its queries.
    Run(RunArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSON file with `classes` and `queries`.
    pub file: PathBuf,

    /// Pretty-print the JSON results.
    #[arg(long)]
    pub pretty: bool,

    /// Recursion depth limit for substitution, erasure and hierarchy walks.
    #[arg(long = "max-depth", value_name = "N")]
    pub max_depth: Option<u32>,
}
