use askabroad::vector_store::{
    Cloud, IndexDescription, IndexProvisioner, IndexSpec, Metric, VectorStoreError,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const PINECONE_API_VERSION: &str = "2025-01";

/// Provisions serverless indexes through the [Pinecone](https://pinecone.io) control plane.
///
/// Only index management is covered (list, create, describe); records are
/// never read or written through this type.
///
/// # Usage
///
/// ```rust,no_run
/// use askabroad::vector_store::{IndexProvisioner, IndexSpec};
/// use askabroad_pinecone::PineconeProvisioner;
///
/// # async fn run() -> Result<(), askabroad::vector_store::VectorStoreError> {
/// let pinecone = PineconeProvisioner::new("my-api-key");
/// pinecone.ensure_index_exists(&IndexSpec::default()).await?;
/// # Ok(())
/// # }
/// ```
pub struct PineconeProvisioner {
    client: Client,
    api_key: String,
    base_url: String,
}

impl PineconeProvisioner {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: CONTROL_PLANE_URL.to_string(),
        }
    }

    /// Talk to a different control plane, e.g. a mock server.
    #[must_use]
    pub fn with_control_plane_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", PINECONE_API_VERSION)
    }
}

// Pinecone control plane data structures
#[derive(Debug, Serialize)]
struct CreateIndexRequest<'a> {
    name: &'a str,
    dimension: u32,
    metric: Metric,
    spec: IndexModelSpec<'a>,
}

#[derive(Debug, Serialize)]
struct IndexModelSpec<'a> {
    serverless: ServerlessSpec<'a>,
}

#[derive(Debug, Serialize)]
struct ServerlessSpec<'a> {
    cloud: Cloud,
    region: &'a str,
}

impl<'a> From<&'a IndexSpec> for CreateIndexRequest<'a> {
    fn from(spec: &'a IndexSpec) -> Self {
        Self {
            name: &spec.name,
            dimension: spec.dimension,
            metric: spec.metric,
            spec: IndexModelSpec {
                serverless: ServerlessSpec {
                    cloud: spec.placement.cloud,
                    region: &spec.placement.region,
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexModel>,
}

#[derive(Debug, Deserialize)]
struct IndexModel {
    name: String,
    dimension: Option<u32>,
    #[serde(default)]
    metric: Metric,
    #[serde(default)]
    host: String,
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

impl From<IndexModel> for IndexDescription {
    fn from(model: IndexModel) -> Self {
        Self {
            name: model.name,
            dimension: model.dimension.unwrap_or_default(),
            metric: model.metric,
            host: model.host,
            ready: model.status.is_some_and(|s| s.ready),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

async fn error_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    format!("HTTP Status {}: {message}", status.as_u16())
}

#[allow(clippy::needless_pass_by_value)]
fn into_vec_store_error(e: reqwest::Error) -> VectorStoreError {
    error!(error = ?e, "Request to Pinecone failed");
    VectorStoreError::Provider(e.to_string())
}

#[async_trait]
impl IndexProvisioner for PineconeProvisioner {
    #[instrument(skip_all)]
    async fn list_indexes(&self) -> Result<Vec<String>, VectorStoreError> {
        let response = self.get("indexes").send().await.map_err(into_vec_store_error)?;

        if !response.status().is_success() {
            return Err(VectorStoreError::Provider(error_message(response).await));
        }

        let list: IndexList = response.json().await.map_err(into_vec_store_error)?;
        let names: Vec<String> = list.indexes.into_iter().map(|i| i.name).collect();
        debug!(count = names.len(), "Listed indexes");
        Ok(names)
    }

    #[instrument(skip_all, fields(index = %spec.name))]
    async fn create_index(&self, spec: &IndexSpec) -> Result<(), VectorStoreError> {
        let body = CreateIndexRequest::from(spec);
        let response = self
            .post("indexes")
            .json(&body)
            .send()
            .await
            .map_err(into_vec_store_error)?;

        match response.status() {
            s if s.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(VectorStoreError::IndexAlreadyExists(spec.name.clone())),
            _ => {
                let message = error_message(response).await;
                error!(%message, "Pinecone rejected index creation");
                Err(VectorStoreError::FailedToCreateIndex(message))
            }
        }
    }

    #[instrument(skip(self))]
    async fn describe_index(&self, name: &str) -> Result<IndexDescription, VectorStoreError> {
        let response = self
            .get(&format!("indexes/{name}"))
            .send()
            .await
            .map_err(into_vec_store_error)?;

        match response.status() {
            StatusCode::OK => {
                let model: IndexModel = response.json().await.map_err(into_vec_store_error)?;
                Ok(model.into())
            }
            StatusCode::NOT_FOUND => Err(VectorStoreError::IndexNotFound(name.to_string())),
            _ => Err(VectorStoreError::Provider(error_message(response).await)),
        }
    }
}
