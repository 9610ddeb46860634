use async_trait::async_trait;
use resources::objects::{
    deployment::Deployment, namespace::Namespace, service::Service,
    service_account::ServiceAccount,
};
use thiserror::Error;

#[cfg(test)]
pub mod fake;
mod http;

pub use http::HttpClusterClient;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientError {
    #[error("{kind} {name} not found")]
    NotFound { kind: &'static str, name: String },
    #[error("{0}")]
    Connection(String),
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
}

/// Capabilities the agent lifecycle needs from the cluster control plane.
///
/// Every call is scoped to a namespace and reports an absent object as
/// [`ClientError::NotFound`].
#[async_trait]
pub trait ClusterClient: Send + Sync {
    async fn get_namespace(&self, name: &str) -> ClientResult<Namespace>;
    async fn create_namespace(&self, namespace: &Namespace) -> ClientResult<Namespace>;
    async fn delete_namespace(&self, name: &str) -> ClientResult<()>;
    async fn list_namespaces(&self) -> ClientResult<Vec<Namespace>>;

    async fn get_deployment(&self, namespace: &str, name: &str) -> ClientResult<Deployment>;
    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> ClientResult<Deployment>;
    async fn delete_deployment(&self, namespace: &str, name: &str) -> ClientResult<()>;
    async fn list_deployments(&self, namespace: &str) -> ClientResult<Vec<Deployment>>;

    async fn create_service_account(
        &self,
        namespace: &str,
        account: &ServiceAccount,
    ) -> ClientResult<ServiceAccount>;
    async fn delete_service_account(&self, namespace: &str, name: &str) -> ClientResult<()>;

    async fn get_service(&self, namespace: &str, name: &str) -> ClientResult<Service>;
    async fn create_service(&self, namespace: &str, service: &Service) -> ClientResult<Service>;
    async fn delete_service(&self, namespace: &str, name: &str) -> ClientResult<()>;
}
