use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use meshsync::DeployOptions;
use resources::config::cli::CliConfig;

use crate::utils::{call_context, cluster_client};

#[derive(Args)]
pub struct Arg {
    /// Namespace to deploy MeshSync to [default: from config, "meshery"]
    #[clap(short, long)]
    pub namespace: Option<String>,
    /// MeshSync image tag
    #[clap(short, long, default_value = "latest")]
    pub version: String,
    /// Time allowed for the whole deployment
    #[clap(short, long, default_value = "120s", parse(try_from_str = humantime::parse_duration))]
    pub timeout: Duration,
}

impl Arg {
    pub async fn handle(&self, config: &CliConfig) -> Result<()> {
        let namespace = self.namespace.as_deref().unwrap_or(&config.namespace);
        let client = cluster_client(config)?;
        let ctx = call_context(self.timeout);

        meshsync::deploy(&ctx, &client, DeployOptions::new(namespace, &self.version))
            .await
            .with_context(|| format!("Failed to deploy MeshSync to namespace {}", namespace))?;
        println!("MeshSync {} deployed to namespace {}", self.version, namespace);
        Ok(())
    }
}
