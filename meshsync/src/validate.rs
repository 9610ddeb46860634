use crate::{
    client::ClusterClient,
    context::CallContext,
    error::{Error, Result},
    provision::AGENT_NAME,
};

/// Checks that the agent deployment has a ready replica and its service exists.
///
/// Read only. A single failed read is reported as is; retrying is up to the caller.
pub async fn validate(ctx: &CallContext, client: &dyn ClusterClient, namespace: &str) -> Result<()> {
    let deployment = ctx
        .call(
            &format!("get deployment {}/{}", namespace, AGENT_NAME),
            client.get_deployment(namespace, AGENT_NAME),
        )
        .await?;
    let ready = deployment.ready_replicas();
    if ready == 0 {
        return Err(Error::NotReady {
            kind: "deployment",
            name: format!("{}/{}", namespace, AGENT_NAME),
            ready,
        });
    }

    ctx.call(
        &format!("get service {}/{}", namespace, AGENT_NAME),
        client.get_service(namespace, AGENT_NAME),
    )
    .await?;
    tracing::debug!("Agent in namespace {} is healthy", namespace);
    Ok(())
}
