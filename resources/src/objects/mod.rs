use std::{collections::BTreeMap, fmt::Debug};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::snapshot::Mapping;

pub mod deployment;
pub mod namespace;
pub mod service;
pub mod service_account;

/// A typed object served by the cluster control plane.
pub trait Object: Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Group and version the kind is served under, e.g. `apps/v1`.
    const API_VERSION: &'static str;
    const KIND: &'static str;
    /// Lowercase plural used in resource paths.
    const KIND_PLURAL: &'static str;
    /// Whether the kind lives inside a namespace.
    const NAMESPACED: bool = true;

    fn metadata(&self) -> &Metadata;

    fn name(&self) -> &String {
        &self.metadata().name
    }

    /// Path of the collection holding objects of this kind.
    fn collection_uri(namespace: &str) -> String {
        let prefix = if Self::API_VERSION.contains('/') {
            format!("apis/{}", Self::API_VERSION)
        } else {
            format!("api/{}", Self::API_VERSION)
        };
        if Self::NAMESPACED {
            format!("{}/namespaces/{}/{}", prefix, namespace, Self::KIND_PLURAL)
        } else {
            format!("{}/{}", prefix, Self::KIND_PLURAL)
        }
    }

    /// Path of a single named object of this kind.
    fn object_uri(namespace: &str, name: &str) -> String {
        format!("{}/{}", Self::collection_uri(namespace), name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Name must be unique within a namespace.
    /// Optional on pod templates, required everywhere else.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Namespace defines the space within which each name must be unique.
    /// Absent for cluster-scoped objects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Map of string keys and values that can be used to organize
    /// and categorize objects.
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    /// Populated by the system. Read-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<i64>,
    /// RFC 3339 creation time, set by the control plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    /// Owner references, finalizers and other fields kept as received.
    #[serde(flatten)]
    pub extra: Mapping,
}

impl Metadata {
    pub fn named(name: &str, namespace: &str) -> Self {
        Metadata {
            name: name.to_owned(),
            namespace: Some(namespace.to_owned()),
            ..Default::default()
        }
    }

    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }
}

/// A port given either by number or by name.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Labels(pub BTreeMap<String, String>);

impl Labels {
    pub fn new() -> Self {
        Labels(BTreeMap::new())
    }

    pub fn insert(mut self, key: &str, value: &str) -> Self {
        self.0.insert(key.to_owned(), value.to_owned());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every key of `selector` is present here with the same value.
    pub fn matches(&self, selector: &Labels) -> bool {
        selector
            .0
            .iter()
            .all(|(key, value)| self.0.get(key) == Some(value))
    }
}
