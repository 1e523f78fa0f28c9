use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing - only show logs with --verbose
    let filter = if cli.verbose {
        EnvFilter::new("reportlens=debug")
    } else {
        EnvFilter::new("reportlens=warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse(args) => cli::parse::execute(args).await,
        Commands::Compare(args) => cli::compare::execute(args),
        Commands::Schema(args) => cli::schema::execute(args),
    }
}
