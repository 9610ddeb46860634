use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const SNAPSHOT_API_VERSION: &str = "meshery.layer5.io/v1alpha1";
pub const SNAPSHOT_KIND: &str = "MeshSync";
/// Logical name given to snapshots captured from a live cluster.
pub const SNAPSHOT_NAME: &str = "kubernetes-snapshot";

const NAME_KEY: &str = "name";
const TIMESTAMP_KEY: &str = "timestamp";

/// Open string keyed mapping. Keys are kept sorted so encoding is deterministic.
pub type Mapping = serde_json::Map<String, Value>;

/// Point in time inventory of cluster resources.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    metadata: Mapping,
    /// Discovery order: namespace iteration order, then listing order.
    #[serde(default)]
    pub resources: Vec<Resource>,
}

impl Snapshot {
    pub fn new(name: &str, taken_at: DateTime<Utc>) -> Self {
        let mut metadata = Mapping::new();
        metadata.insert(NAME_KEY.to_owned(), Value::from(name));
        metadata.insert(
            TIMESTAMP_KEY.to_owned(),
            Value::from(taken_at.to_rfc3339_opts(SecondsFormat::Secs, true)),
        );
        Snapshot {
            api_version: SNAPSHOT_API_VERSION.to_owned(),
            kind: SNAPSHOT_KIND.to_owned(),
            metadata,
            resources: Vec::new(),
        }
    }

    pub fn metadata(&self) -> &Mapping {
        &self.metadata
    }

    pub fn name(&self) -> Option<&str> {
        self.metadata.get(NAME_KEY).and_then(Value::as_str)
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.metadata.get(TIMESTAMP_KEY).and_then(Value::as_str)
    }

    /// Adds a metadata entry. The timestamp can not be replaced once set,
    /// `false` is returned when that is attempted.
    pub fn annotate(&mut self, key: &str, value: Value) -> bool {
        if key == TIMESTAMP_KEY && self.metadata.contains_key(TIMESTAMP_KEY) {
            return false;
        }
        self.metadata.insert(key.to_owned(), value);
        true
    }
}

/// One captured cluster object.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub api_version: String,
    pub kind: String,
    #[serde(default)]
    pub metadata: Mapping,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Mapping>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Mapping>,
}

impl Resource {
    pub fn name(&self) -> Option<&str> {
        self.metadata.get("name").and_then(Value::as_str)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.metadata.get("namespace").and_then(Value::as_str)
    }
}
