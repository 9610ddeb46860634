use serde::{Deserialize, Serialize};

/// Envelope the control plane returns for list calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct List<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

/// Failure description the control plane returns with non-success codes.
#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Status {
    pub message: Option<String>,
    pub reason: Option<String>,
    pub code: Option<u16>,
}

/// Body returned by the snapshot import endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl ImportResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
