use std::{env, fs};

use async_trait::async_trait;
use reqwest::{Certificate, Client, RequestBuilder, Response, StatusCode, Url};
use resources::{
    config::ClusterConfig,
    models::{List, Status},
    objects::{
        deployment::Deployment, namespace::Namespace, service::Service,
        service_account::ServiceAccount, Object,
    },
};
use serde::Serialize;

use super::{ClientError, ClientResult, ClusterClient};

const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";
/// Address `kubectl proxy` listens on by default.
const PROXY_URL: &str = "http://127.0.0.1:8001/";

/// Talks to a Kubernetes style REST control plane.
#[derive(Debug, Clone)]
pub struct HttpClusterClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

/// Wire form of a typed object, with its type identifiers filled in.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Manifest<'a, T> {
    api_version: &'static str,
    kind: &'static str,
    #[serde(flatten)]
    object: &'a T,
}

impl HttpClusterClient {
    pub fn new(base_url: &str, token: Option<String>) -> ClientResult<Self> {
        Self::with_client(Client::new(), base_url, token)
    }

    fn with_client(client: Client, base_url: &str, token: Option<String>) -> ClientResult<Self> {
        let mut base_url = Url::parse(base_url).map_err(|err| {
            ClientError::Connection(format!("invalid API server URL {}: {}", base_url, err))
        })?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Builds a client from configuration, falling back to the in-cluster
    /// service environment and then to a local `kubectl proxy`.
    pub fn from_config(config: &ClusterConfig) -> ClientResult<Self> {
        let token = match (&config.token, &config.token_file) {
            (Some(token), _) => Some(token.to_owned()),
            (None, Some(path)) => Some(read_token(path)?),
            (None, None) => None,
        };
        if let Some(url) = &config.api_server_url {
            return Self::new(url, token);
        }

        match (
            env::var("KUBERNETES_SERVICE_HOST"),
            env::var("KUBERNETES_SERVICE_PORT"),
        ) {
            (Ok(host), Ok(port)) => {
                tracing::debug!("Using in-cluster API server at {}:{}", host, port);
                let token = match token {
                    Some(token) => Some(token),
                    None => Some(read_token(&format!("{}/token", SERVICE_ACCOUNT_DIR))?),
                };
                let mut builder = Client::builder();
                if let Ok(pem) = fs::read(format!("{}/ca.crt", SERVICE_ACCOUNT_DIR)) {
                    let ca = Certificate::from_pem(&pem).map_err(|err| {
                        ClientError::Connection(format!("invalid cluster CA: {}", err))
                    })?;
                    builder = builder.add_root_certificate(ca);
                }
                let client = builder
                    .build()
                    .map_err(|err| ClientError::Connection(err.to_string()))?;
                Self::with_client(client, &format!("https://{}:{}/", host, port), token)
            },
            _ => Self::new(PROXY_URL, token),
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request(&self, method: reqwest::Method, uri: &str) -> ClientResult<RequestBuilder> {
        let url = self
            .base_url
            .join(uri)
            .map_err(|err| ClientError::Connection(format!("invalid path {}: {}", uri, err)))?;
        let request = self.client.request(method, url);
        Ok(match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder, kind: &'static str, name: &str) -> ClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| ClientError::Connection(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                kind,
                name: name.to_owned(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Status>(&body)
                .ok()
                .and_then(|status| status.message)
                .unwrap_or(body);
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn decode<T: Object>(response: Response) -> ClientResult<T> {
        let status = response.status().as_u16();
        response.json::<T>().await.map_err(|err| ClientError::Api {
            status,
            message: format!("malformed {} in response: {}", T::KIND, err),
        })
    }

    async fn get<T: Object>(&self, namespace: &str, name: &str) -> ClientResult<T> {
        let request = self.request(reqwest::Method::GET, &T::object_uri(namespace, name))?;
        let response = self.send(request, T::KIND, &qualified(namespace, name)).await?;
        Self::decode(response).await
    }

    async fn list<T: Object>(&self, namespace: &str) -> ClientResult<Vec<T>> {
        let request = self.request(reqwest::Method::GET, &T::collection_uri(namespace))?;
        let response = self.send(request, T::KIND, namespace).await?;
        let status = response.status().as_u16();
        let list = response.json::<List<T>>().await.map_err(|err| ClientError::Api {
            status,
            message: format!("malformed {} list in response: {}", T::KIND, err),
        })?;
        Ok(list.items)
    }

    async fn create<T: Object>(&self, namespace: &str, object: &T) -> ClientResult<T> {
        let manifest = Manifest {
            api_version: T::API_VERSION,
            kind: T::KIND,
            object,
        };
        let request = self
            .request(reqwest::Method::POST, &T::collection_uri(namespace))?
            .json(&manifest);
        let response = self
            .send(request, T::KIND, &qualified(namespace, object.name()))
            .await?;
        Self::decode(response).await
    }

    async fn delete<T: Object>(&self, namespace: &str, name: &str) -> ClientResult<()> {
        let request = self.request(reqwest::Method::DELETE, &T::object_uri(namespace, name))?;
        self.send(request, T::KIND, &qualified(namespace, name))
            .await?;
        Ok(())
    }
}

fn qualified(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{}/{}", namespace, name)
    }
}

fn read_token(path: &str) -> ClientResult<String> {
    fs::read_to_string(path)
        .map(|token| token.trim().to_owned())
        .map_err(|err| ClientError::Connection(format!("cannot read token {}: {}", path, err)))
}

#[async_trait]
impl ClusterClient for HttpClusterClient {
    async fn get_namespace(&self, name: &str) -> ClientResult<Namespace> {
        self.get("", name).await
    }

    async fn create_namespace(&self, namespace: &Namespace) -> ClientResult<Namespace> {
        self.create("", namespace).await
    }

    async fn delete_namespace(&self, name: &str) -> ClientResult<()> {
        self.delete::<Namespace>("", name).await
    }

    async fn list_namespaces(&self) -> ClientResult<Vec<Namespace>> {
        self.list("").await
    }

    async fn get_deployment(&self, namespace: &str, name: &str) -> ClientResult<Deployment> {
        self.get(namespace, name).await
    }

    async fn create_deployment(
        &self,
        namespace: &str,
        deployment: &Deployment,
    ) -> ClientResult<Deployment> {
        self.create(namespace, deployment).await
    }

    async fn delete_deployment(&self, namespace: &str, name: &str) -> ClientResult<()> {
        self.delete::<Deployment>(namespace, name).await
    }

    async fn list_deployments(&self, namespace: &str) -> ClientResult<Vec<Deployment>> {
        self.list(namespace).await
    }

    async fn create_service_account(
        &self,
        namespace: &str,
        account: &ServiceAccount,
    ) -> ClientResult<ServiceAccount> {
        self.create(namespace, account).await
    }

    async fn delete_service_account(&self, namespace: &str, name: &str) -> ClientResult<()> {
        self.delete::<ServiceAccount>(namespace, name).await
    }

    async fn get_service(&self, namespace: &str, name: &str) -> ClientResult<Service> {
        self.get(namespace, name).await
    }

    async fn create_service(&self, namespace: &str, service: &Service) -> ClientResult<Service> {
        self.create(namespace, service).await
    }

    async fn delete_service(&self, namespace: &str, name: &str) -> ClientResult<()> {
        self.delete::<Service>(namespace, name).await
    }
}
