use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;
mod ingest;
mod normalize;
mod output;
mod partition;
mod render;
mod report;
mod schema;
mod serialize;
mod staging;
mod theme;
mod workflow;

use cli::{Command, RootArgs};
use schema::{SchemaError, COLUMN_MAP};

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            if err.downcast_ref::<SchemaError>().is_some() {
                let expected: Vec<&str> = COLUMN_MAP.iter().map(|(name, _)| *name).collect();
                eprintln!(
                    "hint: check that the spreadsheet columns match the expected model ({})",
                    expected.join(", ")
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: RootArgs) -> Result<()> {
    match args.command {
        Command::Generate(args) => workflow::run_generate(args),
        Command::Preview(args) => workflow::run_preview(args),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
