use std::{path::Path, time::Duration};

use reqwest::{header::CONTENT_TYPE, Client, StatusCode, Url};
use resources::{config::MesheryConfig, models::ImportResponse};

use crate::{
    context::CallContext,
    error::{Error, Result},
    serializer::Format,
};

const IMPORT_PATH: &str = "api/meshsync/snapshot/import";

/// Uploads snapshot files to a Meshery server.
#[derive(Debug, Clone)]
pub struct MesheryClient {
    client: Client,
    endpoint: Url,
    token: Option<String>,
}

impl MesheryClient {
    pub fn new(url: &str, token: Option<String>, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(url)
            .map_err(|err| Error::Config(format!("invalid Meshery URL {}: {}", url, err)))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base
            .join(IMPORT_PATH)
            .map_err(|err| Error::Config(format!("invalid Meshery URL {}: {}", url, err)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| Error::Config(format!("cannot build HTTP client: {}", err)))?;
        Ok(Self {
            client,
            endpoint,
            token: token.filter(|token| !token.is_empty()),
        })
    }

    pub fn from_config(config: &MesheryConfig) -> Result<Self> {
        Self::new(
            &config.url,
            config.token.to_owned(),
            Duration::from_secs(config.timeout),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends the snapshot file at `path` and checks that the server accepted it.
    pub async fn import_snapshot(&self, ctx: &CallContext, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await.map_err(|source| Error::Io {
            op: "read snapshot file",
            path: path.to_owned(),
            source,
        })?;
        let format = Format::from_path(path);

        let mut request = self
            .client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, format.content_type())
            .body(data);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let op = format!("import snapshot {}", path.display());
        let (status, body) = ctx
            .run(&op, async {
                let response = request.send().await.map_err(|err| Error::Connection {
                    op: op.to_owned(),
                    message: err.to_string(),
                })?;
                let status = response.status();
                let body = response.text().await.map_err(|err| Error::Connection {
                    op: op.to_owned(),
                    message: format!("failed to read response body: {}", err),
                })?;
                Ok((status, body))
            })
            .await?;

        if status != StatusCode::OK {
            return Err(self.rejected(Some(status), format!("status {}: {}", status.as_u16(), body)));
        }
        let response: ImportResponse = serde_json::from_str(&body).map_err(|err| {
            self.rejected(Some(status), format!("unexpected response {:?}: {}", body, err))
        })?;
        if !response.is_success() {
            return Err(self.rejected(Some(status), response.message));
        }
        tracing::info!("Imported {} into {}", path.display(), self.endpoint);
        Ok(())
    }

    fn rejected(&self, status: Option<StatusCode>, message: String) -> Error {
        Error::RemoteRejection {
            url: self.endpoint.to_string(),
            status: status.map(|status| status.as_u16()),
            message,
        }
    }
}
