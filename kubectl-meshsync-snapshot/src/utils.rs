use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use meshsync::{CallContext, HttpClusterClient};
use resources::config::cli::CliConfig;

const DEFAULT_CONFIG_PATH: &str = "meshsync-snapshot.yaml";

/// Reads the configuration file, if any, overlaid with `MESHSYNC_` variables.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_PATH).required(false),
    };
    Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix("MESHSYNC").separator("__"))
        .build()
        .with_context(|| "Failed to read config".to_string())?
        .try_deserialize::<CliConfig>()
        .with_context(|| "Failed to parse config".to_string())
}

pub fn cluster_client(config: &CliConfig) -> Result<HttpClusterClient> {
    HttpClusterClient::from_config(&config.cluster)
        .with_context(|| "Failed to create cluster client".to_string())
}

/// Context bounded by `timeout` that is also cancelled on Ctrl-C.
pub fn call_context(timeout: Duration) -> CallContext {
    let ctx = CallContext::with_timeout(timeout);
    let token = ctx.token();
    tokio::spawn(async move {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                if result.is_ok() {
                    tracing::warn!("Interrupted, cancelling");
                    token.cancel();
                }
            },
            _ = token.cancelled() => {},
        }
    });
    ctx
}
