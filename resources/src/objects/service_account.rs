use serde::{Deserialize, Serialize};

use super::{Metadata, Object};

/// Identity for processes that run in a pod.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceAccount {
    pub metadata: Metadata,
}

impl Object for ServiceAccount {
    const API_VERSION: &'static str = "v1";
    const KIND: &'static str = "ServiceAccount";
    const KIND_PLURAL: &'static str = "serviceaccounts";

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}
