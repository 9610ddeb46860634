use serde::{Deserialize, Serialize};

use super::{ClusterConfig, MesheryConfig};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct CliConfig {
    /// Default tracing filter when RUST_LOG is not set.
    /// Defaults to "info".
    pub log_level: String,
    /// Namespace the agent is deployed to when none is given.
    /// Defaults to "meshery".
    pub namespace: String,
    pub cluster: ClusterConfig,
    pub meshery: MesheryConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            log_level: "info".to_string(),
            namespace: "meshery".to_string(),
            cluster: ClusterConfig::default(),
            meshery: MesheryConfig::default(),
        }
    }
}
