pub mod cli;

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterConfig {
    /// API server URL. When unset the client falls back to the
    /// in-cluster service environment, then to a local `kubectl proxy`.
    pub api_server_url: Option<String>,
    /// Bearer token sent with every control plane request.
    pub token: Option<String>,
    /// Path of a file holding the bearer token.
    pub token_file: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct MesheryConfig {
    /// Meshery server URL
    pub url: String,
    /// Meshery authentication token
    pub token: Option<String>,
    /// Request timeout for snapshot imports.
    /// In seconds. Default: 30 sec
    pub timeout: u64,
}

impl Default for MesheryConfig {
    fn default() -> Self {
        MesheryConfig {
            url: "http://localhost:9081".to_string(),
            token: None,
            timeout: 30,
        }
    }
}
