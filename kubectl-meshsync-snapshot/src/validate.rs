use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use resources::config::cli::CliConfig;

use crate::utils::{call_context, cluster_client};

#[derive(Args)]
pub struct Arg {
    /// Namespace where MeshSync is deployed [default: from config, "meshery"]
    #[clap(short, long)]
    pub namespace: Option<String>,
    #[clap(short, long, default_value = "30s", parse(try_from_str = humantime::parse_duration))]
    pub timeout: Duration,
}

impl Arg {
    pub async fn handle(&self, config: &CliConfig) -> Result<()> {
        let namespace = self.namespace.as_deref().unwrap_or(&config.namespace);
        let client = cluster_client(config)?;
        let ctx = call_context(self.timeout);

        meshsync::validate(&ctx, &client, namespace)
            .await
            .with_context(|| format!("MeshSync in namespace {} is not usable", namespace))?;
        println!("MeshSync in namespace {} is ready", namespace);
        Ok(())
    }
}
