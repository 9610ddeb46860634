use strum::{Display, EnumIter, IntoEnumIterator};

use crate::{
    client::ClusterClient,
    context::CallContext,
    error::{Error, Result},
    provision::AGENT_NAME,
};

#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    pub namespace: String,
    /// Also delete the namespace when no deployments are left in it.
    pub force: bool,
    /// Attempt every deletion even after one failed. The first failure is
    /// still returned and the namespace is then left alone.
    pub continue_on_error: bool,
}

/// Agent objects in deletion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
enum AgentObject {
    #[strum(serialize = "deployment")]
    Deployment,
    #[strum(serialize = "service")]
    Service,
    #[strum(serialize = "service account")]
    ServiceAccount,
}

impl AgentObject {
    async fn delete(self, ctx: &CallContext, client: &dyn ClusterClient, namespace: &str) -> Result<()> {
        let op = format!("delete {} {}/{}", self, namespace, AGENT_NAME);
        match self {
            AgentObject::Deployment => {
                ctx.call(&op, client.delete_deployment(namespace, AGENT_NAME))
                    .await
            },
            AgentObject::Service => ctx.call(&op, client.delete_service(namespace, AGENT_NAME)).await,
            AgentObject::ServiceAccount => {
                ctx.call(&op, client.delete_service_account(namespace, AGENT_NAME))
                    .await
            },
        }
    }
}

/// Removes the agent's deployment, service and service account, in that order.
pub async fn cleanup(ctx: &CallContext, client: &dyn ClusterClient, options: CleanupOptions) -> Result<()> {
    let namespace = options.namespace.as_str();
    let mut first_failure: Option<Error> = None;

    for object in AgentObject::iter() {
        match object.delete(ctx, client, namespace).await {
            Ok(()) => tracing::info!("Deleted {} {}/{}", object, namespace, AGENT_NAME),
            Err(err) if options.continue_on_error && !err.is_cancelled() => {
                tracing::warn!("{}, continuing with the remaining objects", err);
                first_failure.get_or_insert(err);
            },
            Err(err) => return Err(err),
        }
    }
    if let Some(err) = first_failure {
        return Err(err);
    }

    if options.force {
        reclaim_namespace(ctx, client, namespace).await?;
    }
    Ok(())
}

/// Deletes `namespace` if it holds no deployments, otherwise leaves it in place.
async fn reclaim_namespace(ctx: &CallContext, client: &dyn ClusterClient, namespace: &str) -> Result<()> {
    let remaining = ctx
        .call(
            &format!("list deployments in namespace {}", namespace),
            client.list_deployments(namespace),
        )
        .await?;
    if !remaining.is_empty() {
        tracing::info!(
            "Namespace {} still holds {} deployments, leaving it in place",
            namespace,
            remaining.len()
        );
        return Ok(());
    }
    ctx.call(
        &format!("delete namespace {}", namespace),
        client.delete_namespace(namespace),
    )
    .await?;
    tracing::info!("Deleted namespace {}", namespace);
    Ok(())
}
