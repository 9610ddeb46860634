use resources::objects::{
    deployment::{
        Container, ContainerPort, Deployment, DeploymentSpec, LabelSelector, PodSpec,
        PodTemplateSpec,
    },
    namespace::Namespace,
    service::{Protocol, Service, ServicePort, ServiceSpec},
    service_account::ServiceAccount,
    IntOrString, Labels, Metadata,
};

use crate::{
    client::ClusterClient,
    context::CallContext,
    error::{Error, Result},
    wait::{poll_until, PollPolicy},
};

/// Well-known name shared by every object backing the agent.
pub const AGENT_NAME: &str = "meshsync";
pub const AGENT_IMAGE: &str = "layer5/meshsync";
pub const AGENT_PORT_NAME: &str = "api";
pub const AGENT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub namespace: String,
    /// Image tag of the agent.
    pub version: String,
    pub readiness: PollPolicy,
}

impl DeployOptions {
    pub fn new(namespace: &str, version: &str) -> Self {
        DeployOptions {
            namespace: namespace.to_owned(),
            version: version.to_owned(),
            readiness: PollPolicy::default(),
        }
    }
}

pub fn agent_labels() -> Labels {
    Labels::new().insert("app", AGENT_NAME)
}

pub fn agent_deployment(namespace: &str, version: &str) -> Deployment {
    Deployment {
        metadata: Metadata::named(AGENT_NAME, namespace).with_labels(agent_labels()),
        spec: Some(DeploymentSpec {
            replicas: 1,
            selector: LabelSelector {
                match_labels: agent_labels(),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Metadata {
                    labels: agent_labels(),
                    ..Default::default()
                },
                spec: PodSpec {
                    service_account_name: Some(AGENT_NAME.to_owned()),
                    containers: vec![Container {
                        name: AGENT_NAME.to_owned(),
                        image: format!("{}:{}", AGENT_IMAGE, version),
                        ports: vec![ContainerPort {
                            name: Some(AGENT_PORT_NAME.to_owned()),
                            container_port: AGENT_PORT,
                        }],
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            },
            extra: Default::default(),
        }),
        status: None,
    }
}

pub fn agent_service_account(namespace: &str) -> ServiceAccount {
    ServiceAccount {
        metadata: Metadata::named(AGENT_NAME, namespace),
    }
}

pub fn agent_service(namespace: &str) -> Service {
    Service {
        metadata: Metadata::named(AGENT_NAME, namespace),
        spec: ServiceSpec {
            selector: agent_labels(),
            ports: vec![ServicePort {
                name: Some(AGENT_PORT_NAME.to_owned()),
                port: AGENT_PORT,
                target_port: Some(IntOrString::Int(AGENT_PORT.into())),
                protocol: Protocol::Tcp,
            }],
            cluster_ip: None,
        },
    }
}

/// Creates `namespace` unless it already exists.
pub async fn ensure_namespace(
    ctx: &CallContext,
    client: &dyn ClusterClient,
    namespace: &str,
) -> Result<()> {
    let op = format!("get namespace {}", namespace);
    match ctx.call(&op, client.get_namespace(namespace)).await {
        Ok(_) => {
            tracing::debug!("Namespace {} already exists", namespace);
            Ok(())
        },
        Err(Error::NotFound { .. }) => {
            let op = format!("create namespace {}", namespace);
            match ctx
                .call(&op, client.create_namespace(&Namespace::new(namespace)))
                .await
            {
                Ok(_) => {
                    tracing::info!("Created namespace {}", namespace);
                    Ok(())
                },
                // Someone else created it between the lookup and the create.
                Err(Error::Api { status: 409, .. }) => Ok(()),
                Err(err) => Err(err),
            }
        },
        Err(err) => Err(err),
    }
}

/// Provisions the agent into `options.namespace` and waits for it to become ready.
///
/// Objects created before a failure are left in place; run
/// [`cleanup`](crate::teardown::cleanup) to remove them.
pub async fn deploy(
    ctx: &CallContext,
    client: &dyn ClusterClient,
    options: DeployOptions,
) -> Result<()> {
    let namespace = options.namespace.as_str();
    ensure_namespace(ctx, client, namespace).await?;

    let deployment = agent_deployment(namespace, &options.version);
    ctx.call(
        &format!("create deployment {}/{}", namespace, AGENT_NAME),
        client.create_deployment(namespace, &deployment),
    )
    .await?;
    tracing::info!(
        "Created deployment {}/{} running {}:{}",
        namespace,
        AGENT_NAME,
        AGENT_IMAGE,
        options.version
    );

    ctx.call(
        &format!("create service account {}/{}", namespace, AGENT_NAME),
        client.create_service_account(namespace, &agent_service_account(namespace)),
    )
    .await?;
    tracing::info!("Created service account {}/{}", namespace, AGENT_NAME);

    ctx.call(
        &format!("create service {}/{}", namespace, AGENT_NAME),
        client.create_service(namespace, &agent_service(namespace)),
    )
    .await?;
    tracing::info!("Created service {}/{}", namespace, AGENT_NAME);

    wait_until_ready(ctx, client, namespace, options.readiness).await
}

/// Polls the agent deployment until at least one replica is ready.
pub async fn wait_until_ready(
    ctx: &CallContext,
    client: &dyn ClusterClient,
    namespace: &str,
    policy: PollPolicy,
) -> Result<()> {
    let what = format!("deployment {}/{} to become ready", namespace, AGENT_NAME);
    let op = format!("get deployment {}/{}", namespace, AGENT_NAME);
    let op = op.as_str();
    poll_until(ctx, policy, &what, move || async move {
        let deployment = ctx
            .call(op, client.get_deployment(namespace, AGENT_NAME))
            .await?;
        Ok(deployment.ready_replicas() >= 1)
    })
    .await?;
    tracing::info!("Deployment {}/{} is ready", namespace, AGENT_NAME);
    Ok(())
}
