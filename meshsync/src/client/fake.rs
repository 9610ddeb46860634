//! In-memory control plane used by the lifecycle tests.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use async_trait::async_trait;
use resources::objects::{
    deployment::{Deployment, DeploymentStatus},
    namespace::Namespace,
    service::Service,
    service_account::ServiceAccount,
    Metadata, Object,
};

use super::{ClientError, ClientResult, ClusterClient};

#[derive(Default)]
struct State {
    namespaces: Vec<Namespace>,
    deployments: Vec<Deployment>,
    services: Vec<Service>,
    accounts: Vec<ServiceAccount>,
    /// Deployment reads that report zero ready replicas before the
    /// deployment turns ready. `None` keeps it unready forever.
    ready_after: Option<usize>,
    reads: usize,
    failures: HashMap<&'static str, ClientError>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct FakeCluster {
    state: Mutex<State>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(self, name: &str) -> Self {
        self.state.lock().unwrap().namespaces.push(Namespace::new(name));
        self
    }

    pub fn with_deployment(self, namespace: &str, name: &str, ready: u32) -> Self {
        self.state
            .lock()
            .unwrap()
            .deployments
            .push(deployment(namespace, name, Some(ready)));
        self
    }

    pub fn with_object(self, object: Deployment) -> Self {
        self.state.lock().unwrap().deployments.push(object);
        self
    }

    pub fn with_service(self, namespace: &str, name: &str) -> Self {
        self.state.lock().unwrap().services.push(Service {
            metadata: Metadata::named(name, namespace),
            spec: Default::default(),
        });
        self
    }

    pub fn with_service_account(self, namespace: &str, name: &str) -> Self {
        self.state.lock().unwrap().accounts.push(ServiceAccount {
            metadata: Metadata::named(name, namespace),
        });
        self
    }

    /// Deployments created through the client report ready after `reads` polls.
    pub fn ready_after(self, reads: usize) -> Self {
        self.state.lock().unwrap().ready_after = Some(reads);
        self
    }

    /// Makes every call named `call` (e.g. `"delete_service"`) fail with `err`.
    pub fn fail_on(self, call: &'static str, err: ClientError) -> Self {
        self.state.lock().unwrap().failures.insert(call, err);
        self
    }

    /// Calls received so far, as `name(namespace/object)`.
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .namespaces
            .iter()
            .any(|namespace| namespace.metadata.name == name)
    }

    pub fn deployment_names(&self, namespace: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .deployments
            .iter()
            .filter(|deployment| in_namespace(*deployment, namespace))
            .map(|deployment| deployment.metadata.name.clone())
            .collect()
    }

    pub fn service_count(&self) -> usize {
        self.state.lock().unwrap().services.len()
    }

    pub fn service_account_count(&self) -> usize {
        self.state.lock().unwrap().accounts.len()
    }

    pub fn reads(&self) -> usize {
        self.state.lock().unwrap().reads
    }

    fn enter(&self, call: &'static str, target: &str) -> ClientResult<MutexGuard<'_, State>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(format!("{}({})", call, target));
        if let Some(err) = state.failures.get(call).cloned() {
            return Err(err);
        }
        Ok(state)
    }
}

pub fn deployment(namespace: &str, name: &str, ready: Option<u32>) -> Deployment {
    Deployment {
        metadata: Metadata::named(name, namespace),
        spec: None,
        status: ready.map(|ready| DeploymentStatus {
            replicas: 1,
            ready_replicas: ready,
            ..Default::default()
        }),
    }
}

fn in_namespace<T: Object>(object: &T, namespace: &str) -> bool {
    object.metadata().namespace.as_deref() == Some(namespace)
}

fn not_found(kind: &'static str, namespace: &str, name: &str) -> ClientError {
    ClientError::NotFound {
        kind,
        name: format!("{}/{}", namespace, name),
    }
}

fn conflict(kind: &str, name: &str) -> ClientError {
    ClientError::Api {
        status: 409,
        message: format!("{} {} already exists", kind, name),
    }
}

fn remove<T: Object>(objects: &mut Vec<T>, namespace: &str, name: &str) -> ClientResult<()> {
    match objects
        .iter()
        .position(|object| in_namespace(object, namespace) && object.name() == name)
    {
        Some(index) => {
            objects.remove(index);
            Ok(())
        },
        None => Err(not_found(T::KIND, namespace, name)),
    }
}

fn insert<T: Object>(objects: &mut Vec<T>, namespace: &str, object: &T) -> ClientResult<T> {
    if objects
        .iter()
        .any(|existing| in_namespace(existing, namespace) && existing.name() == object.name())
    {
        return Err(conflict(T::KIND, object.name()));
    }
    objects.push(object.clone());
    Ok(object.clone())
}

#[async_trait]
impl ClusterClient for FakeCluster {
    async fn get_namespace(&self, name: &str) -> ClientResult<Namespace> {
        let state = self.enter("get_namespace", name)?;
        state
            .namespaces
            .iter()
            .find(|namespace| namespace.metadata.name == name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound {
                kind: "Namespace",
                name: name.to_owned(),
            })
    }

    async fn create_namespace(&self, namespace: &Namespace) -> ClientResult<Namespace> {
        let mut state = self.enter("create_namespace", &namespace.metadata.name)?;
        if state
            .namespaces
            .iter()
            .any(|existing| existing.metadata.name == namespace.metadata.name)
        {
            return Err(conflict("Namespace", &namespace.metadata.name));
        }
        state.namespaces.push(namespace.clone());
        Ok(namespace.clone())
    }

    async fn delete_namespace(&self, name: &str) -> ClientResult<()> {
        let mut state = self.enter("delete_namespace", name)?;
        let before = state.namespaces.len();
        state.namespaces.retain(|namespace| namespace.metadata.name != name);
        if state.namespaces.len() == before {
            return Err(ClientError::NotFound {
                kind: "Namespace",
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    async fn list_namespaces(&self) -> ClientResult<Vec<Namespace>> {
        let state = self.enter("list_namespaces", "")?;
        Ok(state.namespaces.clone())
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> ClientResult<Deployment> {
        let mut state = self.enter("get_deployment", &format!("{}/{}", namespace, name))?;
        state.reads += 1;
        let reads = state.reads;
        let ready_after = state.ready_after;
        let deployment = state
            .deployments
            .iter_mut()
            .find(|deployment| {
                in_namespace(&**deployment, namespace) && deployment.metadata.name == name
            })
            .ok_or_else(|| not_found("Deployment", namespace, name))?;
        if let (Some(after), Some(status)) = (ready_after, deployment.status.as_mut()) {
            if reads > after {
                status.ready_replicas = 1;
            }
        }
        Ok(deployment.clone())
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> ClientResult<Deployment> {
        let mut state =
            self.enter("create_deployment", &format!("{}/{}", namespace, deployment.name()))?;
        let mut created = deployment.clone();
        created.status = Some(DeploymentStatus {
            replicas: 1,
            ..Default::default()
        });
        insert(&mut state.deployments, namespace, &created)
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> ClientResult<()> {
        let mut state = self.enter("delete_deployment", &format!("{}/{}", namespace, name))?;
        remove(&mut state.deployments, namespace, name)
    }

    async fn list_deployments(&self, namespace: &str) -> ClientResult<Vec<Deployment>> {
        let state = self.enter("list_deployments", namespace)?;
        Ok(state
            .deployments
            .iter()
            .filter(|deployment| in_namespace(*deployment, namespace))
            .cloned()
            .collect())
    }

    async fn create_service_account(
        &self,
        namespace: &str,
        account: &ServiceAccount,
    ) -> ClientResult<ServiceAccount> {
        let mut state =
            self.enter("create_service_account", &format!("{}/{}", namespace, account.name()))?;
        insert(&mut state.accounts, namespace, account)
    }

    async fn delete_service_account(&self, namespace: &str, name: &str) -> ClientResult<()> {
        let mut state =
            self.enter("delete_service_account", &format!("{}/{}", namespace, name))?;
        remove(&mut state.accounts, namespace, name)
    }

    async fn get_service(&self, namespace: &str, name: &str) -> ClientResult<Service> {
        let state = self.enter("get_service", &format!("{}/{}", namespace, name))?;
        state
            .services
            .iter()
            .find(|service| in_namespace(*service, namespace) && service.metadata.name == name)
            .cloned()
            .ok_or_else(|| not_found("Service", namespace, name))
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> ClientResult<Service> {
        let mut state = self.enter("create_service", &format!("{}/{}", namespace, service.name()))?;
        insert(&mut state.services, namespace, service)
    }

    async fn delete_service(&self, namespace: &str, name: &str) -> ClientResult<()> {
        let mut state = self.enter("delete_service", &format!("{}/{}", namespace, name))?;
        remove(&mut state.services, namespace, name)
    }
}
