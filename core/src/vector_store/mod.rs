mod in_memory;

pub use in_memory::InMemoryProvisioner;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{info, instrument};

pub const DEFAULT_INDEX_NAME: &str = "quickstart";
pub const DEFAULT_DIMENSION: u32 = 1024;
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VectorStoreError {
    #[error("Index `{0}` already exists")]
    IndexAlreadyExists(String),
    #[error("Index `{0}` not found")]
    IndexNotFound(String),
    #[error("Failed to create index: {0}")]
    FailedToCreateIndex(String),
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Similarity metric an index ranks vectors by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Cosine,
    Euclidean,
    Dotproduct,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cosine => "cosine",
            Self::Euclidean => "euclidean",
            Self::Dotproduct => "dotproduct",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Cloud {
    #[default]
    Aws,
    Gcp,
    Azure,
}

/// Where a serverless index lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub cloud: Cloud,
    pub region: String,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            cloud: Cloud::Aws,
            region: DEFAULT_REGION.to_string(),
        }
    }
}

/// Everything needed to create an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: String,
    pub dimension: u32,
    pub metric: Metric,
    pub placement: Placement,
}

impl IndexSpec {
    pub fn new(name: impl Into<String>, dimension: u32, metric: Metric, placement: Placement) -> Self {
        Self {
            name: name.into(),
            dimension,
            metric,
            placement,
        }
    }
}

impl Default for IndexSpec {
    /// The `quickstart` index: 1024 dimensions, cosine, aws `us-east-1`.
    fn default() -> Self {
        Self::new(
            DEFAULT_INDEX_NAME,
            DEFAULT_DIMENSION,
            Metric::Cosine,
            Placement::default(),
        )
    }
}

/// An index as reported back by the backing store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: u32,
    pub metric: Metric,
    pub host: String,
    pub ready: bool,
}

/// Outcome of [`IndexProvisioner::ensure_index_exists`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Created,
    AlreadyExisted,
}

#[async_trait]
pub trait IndexProvisioner: Send + Sync {
    /// Names of all indexes currently in the store.
    async fn list_indexes(&self) -> Result<Vec<String>, VectorStoreError>;

    /// Issue one creation request for `spec`.
    async fn create_index(&self, spec: &IndexSpec) -> Result<(), VectorStoreError>;

    async fn describe_index(&self, name: &str) -> Result<IndexDescription, VectorStoreError>;

    /// Create the index described by `spec` unless one with the same name exists.
    ///
    /// Safe to call on every startup: lists once, and only creates when the name
    /// is absent. A creation rejected with [`VectorStoreError::IndexAlreadyExists`]
    /// (someone else created it in between) also counts as already existing.
    #[instrument(skip(self, spec), fields(index = %spec.name))]
    async fn ensure_index_exists(&self, spec: &IndexSpec) -> Result<Provisioned, VectorStoreError> {
        let indexes = self.list_indexes().await?;
        if indexes.iter().any(|name| name == &spec.name) {
            info!("Index '{}' already exists. Skipping creation.", spec.name);
            return Ok(Provisioned::AlreadyExisted);
        }

        match self.create_index(spec).await {
            Ok(()) => {
                info!(
                    dimension = spec.dimension,
                    metric = %spec.metric,
                    region = %spec.placement.region,
                    "Created index '{}'", spec.name
                );
                Ok(Provisioned::Created)
            }
            Err(VectorStoreError::IndexAlreadyExists(_)) => {
                info!("Index '{}' already exists. Skipping creation.", spec.name);
                Ok(Provisioned::AlreadyExisted)
            }
            Err(e) => Err(e),
        }
    }
}
