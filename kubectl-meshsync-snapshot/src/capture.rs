use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Args;
use meshsync::CaptureOptions;
use resources::config::cli::CliConfig;

use crate::utils::{call_context, cluster_client};

#[derive(Args)]
pub struct Arg {
    /// Namespace where MeshSync is deployed [default: from config, "meshery"]
    #[clap(short, long)]
    pub namespace: Option<String>,
    /// Output file for the snapshot
    #[clap(short, long, default_value = "meshsync-snapshot.yaml")]
    pub output: PathBuf,
    /// Output format, "json" or "yaml"
    #[clap(short, long, default_value = "yaml")]
    pub format: String,
    /// Time allowed for validation and capture
    #[clap(short, long, default_value = "60s", parse(try_from_str = humantime::parse_duration))]
    pub timeout: Duration,
    /// Capture resources from all namespaces
    #[clap(short = 'A', long)]
    pub all_namespaces: bool,
    /// Fail on the first resource that can not be decoded
    #[clap(long)]
    pub strict: bool,
}

impl Arg {
    pub async fn handle(&self, config: &CliConfig) -> Result<()> {
        let namespace = self.namespace.as_deref().unwrap_or(&config.namespace);
        let client = cluster_client(config)?;
        let ctx = call_context(self.timeout);

        meshsync::validate(&ctx, &client, namespace)
            .await
            .with_context(|| format!("MeshSync in namespace {} is not usable", namespace))?;

        let options = CaptureOptions {
            namespace: namespace.to_owned(),
            all_namespaces: self.all_namespaces,
            strict: self.strict,
        };
        let snapshot = meshsync::capture_snapshot(&ctx, &client, options)
            .await
            .with_context(|| "Failed to capture snapshot".to_string())?;

        meshsync::save_snapshot(&snapshot, &self.output, &self.format)
            .with_context(|| format!("Failed to save snapshot to {}", self.output.display()))?;
        println!(
            "Captured {} resources to {}",
            snapshot.resources.len(),
            self.output.display()
        );
        Ok(())
    }
}
