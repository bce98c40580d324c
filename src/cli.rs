//! CLI argument parsing for report generation.
use crate::serialize::RenderFormat;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "ireport",
    version,
    about = "Per-theme initiative reports from a spreadsheet",
    after_help = "Examples:\n  ireport generate --input iniciativas.xlsx --out-dir relatorios\n  ireport generate --input iniciativas.xlsx --out-dir relatorios --combined\n  ireport preview --input iniciativas.json --theme \"SEGURANÇA E CIDADANIA\"",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Log progress (equivalent to RUST_LOG=info)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Generate(GenerateArgs),
    Preview(PreviewArgs),
}

/// Input table selection shared by every command.
#[derive(Parser, Debug)]
pub struct InputArgs {
    /// Initiative table (.xlsx, .xlsm, .xlsb, .xls, .ods or .json)
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,

    /// Worksheet to read (defaults to the first sheet)
    #[arg(long, value_name = "NAME")]
    pub sheet: Option<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Write one report per strategic theme")]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Directory receiving the reports and manifest.json
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    /// Output document format
    #[arg(long, value_enum, default_value_t = RenderFormat::Docx)]
    pub format: RenderFormat,

    /// Write a single document holding every theme
    #[arg(long)]
    pub combined: bool,

    /// Generation date used in file names (YYYY-MM-DD, defaults to today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Worker threads used to render themes
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: Option<u16>,
}

#[derive(Parser, Debug)]
#[command(about = "Print the text rendering of each theme")]
pub struct PreviewArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only print this theme
    #[arg(long, value_name = "NAME")]
    pub theme: Option<String>,
}
