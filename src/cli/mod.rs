pub mod compare;
pub mod parse;
pub mod schema;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reportlens")]
#[command(
    author,
    version,
    about = "Structured parsing of LLM-generated PLC security analysis reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose/debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse report files and write structured reports
    Parse(ParseArgs),

    /// Compare an analysis report against its baseline
    Compare(CompareArgs),

    /// Print JSON Schema for parsed documents or the config file
    Schema(SchemaArgs),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Markdown,
}

#[derive(Parser, Clone)]
pub struct ParseArgs {
    /// Report files or directories of report files
    #[arg(value_name = "INPUT", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Path to config file
    #[arg(short, long, default_value = "reportlens.yaml")]
    pub config: PathBuf,

    /// Override output directory
    #[arg(long)]
    pub report_dir: Option<PathBuf>,

    /// Override max parallel files
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Print parsed documents instead of writing report files
    #[arg(long)]
    pub stdout: bool,

    /// Output format for --stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Parser, Clone)]
pub struct CompareArgs {
    /// Analysis report (raw text or analyzer JSON)
    pub analysis: PathBuf,

    /// Baseline report to compare against
    pub baseline: PathBuf,

    /// Path to config file
    #[arg(short, long, default_value = "reportlens.yaml")]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Exit 1 if the analysis is more severe than the baseline (CI mode)
    #[arg(long)]
    pub fail_on_escalation: bool,
}

#[derive(Parser, Clone)]
pub struct SchemaArgs {
    /// Print the config file schema instead of the document schema
    #[arg(long)]
    pub config: bool,
}
