use chrono::Utc;
use resources::{
    objects::{deployment::Deployment, Object},
    snapshot::{Mapping, Resource, Snapshot, SNAPSHOT_NAME},
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    client::ClusterClient,
    context::CallContext,
    error::{Error, Result},
};

#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    pub namespace: String,
    /// Capture every namespace visible to the client instead of `namespace`.
    pub all_namespaces: bool,
    /// Fail on the first object that can not be decoded instead of
    /// substituting an empty mapping for the broken part.
    pub strict: bool,
}

/// Result of a capture: the snapshot plus every decode problem that was recovered from.
#[derive(Debug)]
pub struct Capture {
    pub snapshot: Snapshot,
    pub issues: Vec<Error>,
}

/// A captured object and the problems met while decoding it.
#[derive(Debug)]
pub struct Conversion {
    pub resource: Resource,
    pub issues: Vec<Error>,
}

/// Captures the deployments in scope into a snapshot, all or nothing.
pub async fn capture_snapshot(
    ctx: &CallContext,
    client: &dyn ClusterClient,
    options: CaptureOptions,
) -> Result<Snapshot> {
    capture(ctx, client, options)
        .await
        .map(|capture| capture.snapshot)
}

pub async fn capture(
    ctx: &CallContext,
    client: &dyn ClusterClient,
    options: CaptureOptions,
) -> Result<Capture> {
    let namespaces = target_namespaces(ctx, client, &options).await?;
    let mut snapshot = Snapshot::new(SNAPSHOT_NAME, Utc::now());
    let mut issues = Vec::new();

    for namespace in &namespaces {
        let deployments = ctx
            .call(
                &format!("list deployments in namespace {}", namespace),
                client.list_deployments(namespace),
            )
            .await?;
        tracing::debug!(
            "Found {} deployments in namespace {}",
            deployments.len(),
            namespace
        );
        for deployment in &deployments {
            let conversion = to_resource::<Deployment>(deployment, namespace, options.strict)?;
            snapshot.resources.push(conversion.resource);
            issues.extend(conversion.issues);
        }
    }

    if !issues.is_empty() {
        tracing::warn!(
            "{} objects were only partially captured, see warnings above",
            issues.len()
        );
    }
    tracing::info!(
        "Captured {} resources from {} namespaces",
        snapshot.resources.len(),
        namespaces.len()
    );
    Ok(Capture { snapshot, issues })
}

async fn target_namespaces(
    ctx: &CallContext,
    client: &dyn ClusterClient,
    options: &CaptureOptions,
) -> Result<Vec<String>> {
    if !options.all_namespaces {
        return Ok(vec![options.namespace.to_owned()]);
    }
    let namespaces = ctx
        .call("list namespaces", client.list_namespaces())
        .await?;
    Ok(namespaces
        .into_iter()
        .map(|namespace| namespace.metadata.name)
        .collect())
}

/// Folds a typed object listed from `namespace` into a [`Resource`].
pub fn to_resource<T: Object>(object: &T, namespace: &str, strict: bool) -> Result<Conversion> {
    fold_object(T::API_VERSION, T::KIND, object, namespace, strict)
}

/// Splits the generic form of `object` into metadata, spec and status mappings.
///
/// Absent or null parts are left unset. A part of the wrong shape is a
/// [`Error::Transform`]: fatal when `strict`, otherwise it is logged,
/// recorded and replaced by an empty mapping.
pub fn fold_object<T: Serialize + ?Sized>(
    api_version: &str,
    kind: &str,
    object: &T,
    namespace: &str,
    strict: bool,
) -> Result<Conversion> {
    let mut issues = Vec::new();
    let mut fields = match serde_json::to_value(object) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            let err = transform_error(kind, "<unnamed>", "object", &other);
            recover(err, strict, &mut issues)?;
            Mapping::new()
        },
        Err(err) => {
            let err = Error::Transform {
                kind: kind.to_owned(),
                name: "<unnamed>".to_owned(),
                field: "object",
                message: err.to_string(),
            };
            recover(err, strict, &mut issues)?;
            Mapping::new()
        },
    };
    let name = fields
        .get("metadata")
        .and_then(|metadata| metadata.get("name"))
        .and_then(Value::as_str)
        .map(|name| format!("{}/{}", namespace, name))
        .unwrap_or_else(|| format!("{}/<unnamed>", namespace));

    let mut take = |field: &'static str| -> Result<Option<Mapping>> {
        match fields.remove(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(mapping)) => Ok(Some(mapping)),
            Some(other) => {
                recover(transform_error(kind, &name, field, &other), strict, &mut issues)?;
                Ok(Some(Mapping::new()))
            },
        }
    };
    let mut metadata = take("metadata")?.unwrap_or_default();
    let spec = take("spec")?;
    let status = take("status")?;

    if !metadata.contains_key("namespace") {
        metadata.insert("namespace".to_owned(), Value::from(namespace));
    }

    Ok(Conversion {
        resource: Resource {
            api_version: api_version.to_owned(),
            kind: kind.to_owned(),
            metadata,
            spec,
            status,
        },
        issues,
    })
}

fn transform_error(kind: &str, name: &str, field: &'static str, found: &Value) -> Error {
    Error::Transform {
        kind: kind.to_owned(),
        name: name.to_owned(),
        field,
        message: format!("expected a mapping, found {}", shape(found)),
    }
}

fn recover(err: Error, strict: bool, issues: &mut Vec<Error>) -> Result<()> {
    if strict {
        return Err(err);
    }
    tracing::warn!("{}, substituting an empty mapping", err);
    issues.push(err);
    Ok(())
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::client::{
        fake::{deployment, FakeCluster},
        ClientError,
    };

    fn options(namespace: &str) -> CaptureOptions {
        CaptureOptions {
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn captures_only_the_requested_namespace() {
        let cluster = FakeCluster::new()
            .with_namespace("ns-a")
            .with_namespace("ns-b")
            .with_deployment("ns-a", "web", 1)
            .with_deployment("ns-b", "db", 1)
            .with_deployment("ns-a", "api", 0);
        let snapshot = capture_snapshot(&CallContext::new(), &cluster, options("ns-a"))
            .await
            .unwrap();

        assert_eq!(snapshot.resources.len(), 2);
        let names = snapshot
            .resources
            .iter()
            .map(|resource| resource.name().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["web", "api"]);
        for resource in &snapshot.resources {
            assert_eq!(resource.namespace(), Some("ns-a"));
            assert_eq!(resource.api_version, "apps/v1");
            assert_eq!(resource.kind, "Deployment");
        }
        assert_eq!(snapshot.name(), Some(SNAPSHOT_NAME));
        assert!(snapshot.timestamp().is_some());
    }

    #[tokio::test]
    async fn all_namespaces_follow_listing_order() {
        let cluster = FakeCluster::new()
            .with_namespace("ns-b")
            .with_namespace("ns-a")
            .with_deployment("ns-a", "web", 1)
            .with_deployment("ns-b", "db", 1);
        let snapshot = capture_snapshot(
            &CallContext::new(),
            &cluster,
            CaptureOptions {
                all_namespaces: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let namespaces = snapshot
            .resources
            .iter()
            .map(|resource| resource.namespace().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(namespaces, vec!["ns-b", "ns-a"]);
    }

    #[tokio::test]
    async fn listing_failure_aborts_the_capture() {
        let cluster = FakeCluster::new()
            .with_namespace("ns-a")
            .with_deployment("ns-a", "web", 1)
            .fail_on(
                "list_deployments",
                ClientError::Connection("connection reset".to_string()),
            );
        let err = capture_snapshot(
            &CallContext::new(),
            &cluster,
            CaptureOptions {
                all_namespaces: true,
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed to list deployments in namespace ns-a: connection error: connection reset"
        );
    }

    #[tokio::test]
    async fn empty_namespace_yields_empty_resources() {
        let cluster = FakeCluster::new();
        let snapshot = capture_snapshot(&CallContext::new(), &cluster, options("empty"))
            .await
            .unwrap();
        assert!(snapshot.resources.is_empty());
    }

    #[tokio::test]
    async fn absent_status_is_left_unset() {
        let cluster = FakeCluster::new().with_object(deployment("ns-a", "fresh", None));
        let capture = capture(&CallContext::new(), &cluster, options("ns-a"))
            .await
            .unwrap();
        let resource = &capture.snapshot.resources[0];
        assert!(resource.status.is_none());
        assert!(resource.spec.is_none());
        assert!(capture.issues.is_empty());
    }

    #[tokio::test]
    async fn captured_deployments_keep_every_reported_field() {
        let listed: Deployment = serde_json::from_value(json!({
            "metadata": {
                "name": "web",
                "namespace": "ns-a",
                "uid": "1f0c",
                "ownerReferences": [{"kind": "Application", "name": "shop"}]
            },
            "spec": {
                "replicas": 2,
                "strategy": {"type": "RollingUpdate", "rollingUpdate": {"maxSurge": "25%"}},
                "selector": {"matchLabels": {"app": "web"}},
                "template": {
                    "metadata": {"labels": {"app": "web"}},
                    "spec": {
                        "volumes": [{"name": "cache", "emptyDir": {}}],
                        "containers": [{
                            "name": "web",
                            "image": "nginx",
                            "env": [{"name": "MODE", "value": "prod"}],
                            "resources": {"limits": {"memory": "128Mi"}}
                        }]
                    }
                }
            },
            "status": {
                "replicas": 2,
                "readyReplicas": 2,
                "conditions": [{"type": "Available", "status": "True"}]
            }
        }))
        .unwrap();
        let cluster = FakeCluster::new().with_object(listed);
        let capture = capture(
            &CallContext::new(),
            &cluster,
            CaptureOptions {
                strict: true,
                ..options("ns-a")
            },
        )
        .await
        .unwrap();

        let resource = &capture.snapshot.resources[0];
        let spec = resource.spec.as_ref().unwrap();
        let status = resource.status.as_ref().unwrap();
        assert_eq!(spec["strategy"]["rollingUpdate"]["maxSurge"], json!("25%"));
        assert_eq!(spec["template"]["spec"]["volumes"][0]["name"], json!("cache"));
        let container = &spec["template"]["spec"]["containers"][0];
        assert_eq!(container["env"][0]["value"], json!("prod"));
        assert_eq!(container["resources"]["limits"]["memory"], json!("128Mi"));
        assert_eq!(status["conditions"][0]["type"], json!("Available"));
        assert_eq!(resource.metadata["ownerReferences"][0]["name"], json!("shop"));
        assert!(capture.issues.is_empty());
    }

    #[test]
    fn malformed_parts_are_replaced_when_lenient() {
        let object = json!({
            "metadata": {"name": "odd"},
            "spec": {"replicas": 2},
            "status": "Running"
        });
        let conversion = fold_object("apps/v1", "Deployment", &object, "ns-a", false).unwrap();
        assert_eq!(conversion.resource.status, Some(Mapping::new()));
        assert_eq!(conversion.resource.spec.as_ref().unwrap()["replicas"], json!(2));
        assert_eq!(conversion.resource.namespace(), Some("ns-a"));
        assert_eq!(conversion.issues.len(), 1);
        assert_eq!(
            conversion.issues[0].to_string(),
            "cannot decode status of Deployment ns-a/odd: expected a mapping, found a string"
        );
    }

    #[test]
    fn malformed_parts_fail_when_strict() {
        let object = json!({"metadata": {"name": "odd"}, "spec": ["not", "a", "mapping"]});
        let err = fold_object("apps/v1", "Deployment", &object, "ns-a", true).unwrap_err();
        assert!(matches!(err, Error::Transform { field: "spec", .. }));
    }

    #[test]
    fn non_object_input_degrades_to_empty_metadata() {
        let conversion = fold_object("v1", "Pod", &json!(42), "ns-a", false).unwrap();
        assert_eq!(conversion.issues.len(), 1);
        assert_eq!(conversion.resource.namespace(), Some("ns-a"));
        assert!(conversion.resource.spec.is_none());
    }

    #[test]
    fn typed_objects_round_trip_into_mappings() {
        let object = crate::provision::agent_deployment("meshery", "v0.6.0");
        let conversion = to_resource(&object, "meshery", true).unwrap();
        let spec = conversion.resource.spec.unwrap();
        assert_eq!(
            spec["template"]["spec"]["containers"][0]["image"],
            json!("layer5/meshsync:v0.6.0")
        );
        assert_eq!(conversion.resource.metadata["labels"]["app"], json!("meshsync"));
    }
}
