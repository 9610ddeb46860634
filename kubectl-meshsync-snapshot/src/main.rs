use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod capture;
mod cleanup;
mod deploy;
mod import;
mod utils;
mod validate;

#[derive(Parser)]
#[clap(author, version, about = "Capture a snapshot of cluster resources with the MeshSync agent", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy the MeshSync agent and wait until it is ready.
    Deploy(deploy::Arg),
    /// Capture cluster resources into a snapshot file.
    Capture(capture::Arg),
    /// Upload a snapshot file to Meshery.
    Import(import::Arg),
    /// Remove the MeshSync agent from the cluster.
    Cleanup(cleanup::Arg),
    /// Check that the MeshSync agent is deployed and ready.
    Validate(validate::Arg),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    dotenv::dotenv().ok();

    let config = utils::load_config(cli.config.as_deref())?;

    // init tracing
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", &config.log_level);
    }
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Deploy(arg) => arg.handle(&config).await?,
        Commands::Capture(arg) => arg.handle(&config).await?,
        Commands::Import(arg) => arg.handle(&config).await?,
        Commands::Cleanup(arg) => arg.handle(&config).await?,
        Commands::Validate(arg) => arg.handle(&config).await?,
    }

    Ok(())
}
