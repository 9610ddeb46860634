use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use meshsync::CleanupOptions;
use resources::config::cli::CliConfig;

use crate::utils::{call_context, cluster_client};

#[derive(Args)]
pub struct Arg {
    /// Namespace where MeshSync is deployed [default: from config, "meshery"]
    #[clap(short, long)]
    pub namespace: Option<String>,
    /// Time allowed for the whole cleanup
    #[clap(short, long, default_value = "60s", parse(try_from_str = humantime::parse_duration))]
    pub timeout: Duration,
    /// Also delete the namespace when nothing else runs in it
    #[clap(short, long)]
    pub force: bool,
    /// Keep deleting the remaining objects after a failure
    #[clap(long)]
    pub continue_on_error: bool,
}

impl Arg {
    pub async fn handle(&self, config: &CliConfig) -> Result<()> {
        let namespace = self.namespace.as_deref().unwrap_or(&config.namespace);
        let client = cluster_client(config)?;
        let ctx = call_context(self.timeout);

        let options = CleanupOptions {
            namespace: namespace.to_owned(),
            force: self.force,
            continue_on_error: self.continue_on_error,
        };
        meshsync::cleanup(&ctx, &client, options)
            .await
            .with_context(|| format!("Failed to clean up MeshSync in namespace {}", namespace))?;
        println!("MeshSync removed from namespace {}", namespace);
        Ok(())
    }
}
