use anyhow::Result;
use clap::Parser;
use jtype_cli::args::{CliArgs, Command};
use jtype_cli::{driver, tracing_config};

fn main() -> Result<()> {
    tracing_config::init_tracing();
    let args = CliArgs::parse();

    match args.command {
        Command::Run(run) => {
            let output = driver::run(&run)?;
            println!("{output}");
        }
    }
    Ok(())
}
