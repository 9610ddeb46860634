use serde::{Deserialize, Serialize};

use super::{Labels, Metadata, Object};
use crate::snapshot::Mapping;

/// Deployment keeps a specified number of pod replicas running
/// from a single pod template.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Deployment {
    pub metadata: Metadata,
    /// Specification of the desired behavior of the Deployment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<DeploymentSpec>,
    /// Most recently observed status of the Deployment.
    /// Populated by the system. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeploymentStatus>,
}

impl Object for Deployment {
    const API_VERSION: &'static str = "apps/v1";
    const KIND: &'static str = "Deployment";
    const KIND_PLURAL: &'static str = "deployments";

    fn metadata(&self) -> &Metadata {
        &self.metadata
    }
}

impl Deployment {
    /// Number of ready replicas, zero when no status was reported yet.
    pub fn ready_replicas(&self) -> u32 {
        self.status
            .as_ref()
            .map(|status| status.ready_replicas)
            .unwrap_or_default()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentSpec {
    /// Number of desired pods. Defaults to 1.
    #[serde(default = "default_replicas")]
    pub replicas: u32,
    /// Label selector for pods. It must match the pod template's labels.
    pub selector: LabelSelector,
    /// Template describes the pods that will be created.
    pub template: PodTemplateSpec,
    /// Fields not modelled above, kept as received.
    #[serde(flatten)]
    pub extra: Mapping,
}

fn default_replicas() -> u32 {
    1
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default)]
    pub match_labels: Labels,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct PodTemplateSpec {
    #[serde(default)]
    pub metadata: Metadata,
    pub spec: PodSpec,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PodSpec {
    /// Name of the ServiceAccount used to run this pod.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    /// List of containers belonging to the pod.
    /// There must be at least one container in a Pod.
    pub containers: Vec<Container>,
    /// Fields not modelled above, kept as received.
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    /// Name of the container specified as a DNS_LABEL.
    pub name: String,
    /// Container image name.
    pub image: String,
    /// List of ports to expose from the container.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<ContainerPort>,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPort {
    /// An IANA_SVC_NAME, unique within the pod.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Number of port to expose on the pod's IP address.
    pub container_port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DeploymentStatus {
    /// Total number of non-terminated pods targeted by this deployment.
    pub replicas: u32,
    /// Number of pods targeted by this Deployment with a Ready Condition.
    pub ready_replicas: u32,
    pub available_replicas: u32,
    pub updated_replicas: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    /// Conditions and any other reported fields.
    #[serde(flatten)]
    pub extra: Mapping,
}
