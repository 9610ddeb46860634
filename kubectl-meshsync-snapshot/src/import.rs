use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Args;
use meshsync::MesheryClient;
use resources::config::cli::CliConfig;

use crate::utils::call_context;

#[derive(Args)]
pub struct Arg {
    /// Meshery server URL [default: from config, "http://localhost:9081"]
    #[clap(short, long)]
    pub url: Option<String>,
    /// Meshery authentication token
    #[clap(short, long)]
    pub token: Option<String>,
    /// Snapshot file to upload
    #[clap(short, long, default_value = "meshsync-snapshot.yaml")]
    pub input: PathBuf,
    /// Time allowed for the upload [default: from config, 30s]
    #[clap(long, parse(try_from_str = humantime::parse_duration))]
    pub timeout: Option<Duration>,
}

impl Arg {
    pub async fn handle(&self, config: &CliConfig) -> Result<()> {
        let url = self.url.as_deref().unwrap_or(&config.meshery.url);
        let token = self.token.clone().or_else(|| config.meshery.token.clone());
        let timeout = self
            .timeout
            .unwrap_or_else(|| Duration::from_secs(config.meshery.timeout));

        let client = MesheryClient::new(url, token, timeout)?;
        let ctx = call_context(timeout);
        client
            .import_snapshot(&ctx, &self.input)
            .await
            .with_context(|| format!("Failed to import {}", self.input.display()))?;
        println!("Imported {} into Meshery at {}", self.input.display(), url);
        Ok(())
    }
}
