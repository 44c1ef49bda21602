use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{IndexDescription, IndexProvisioner, IndexSpec, VectorStoreError};

/// Process-local index registry for tests and examples.
///
/// Behaves like a remote control plane that creates indexes instantly,
/// and counts the calls it receives.
#[derive(Default)]
pub struct InMemoryProvisioner {
    indexes: RwLock<HashMap<String, IndexSpec>>,
    list_calls: AtomicUsize,
    create_calls: AtomicUsize,
}

impl InMemoryProvisioner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start out with indexes that already exist.
    #[must_use]
    pub fn with_indexes(specs: impl IntoIterator<Item = IndexSpec>) -> Self {
        let indexes = specs.into_iter().map(|s| (s.name.clone(), s)).collect();
        Self {
            indexes: RwLock::new(indexes),
            ..Self::default()
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IndexProvisioner for InMemoryProvisioner {
    async fn list_indexes(&self) -> Result<Vec<String>, VectorStoreError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let indexes = self.indexes.read().await;
        Ok(indexes.keys().cloned().collect())
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<(), VectorStoreError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let mut indexes = self.indexes.write().await;
        if indexes.contains_key(&spec.name) {
            return Err(VectorStoreError::IndexAlreadyExists(spec.name.clone()));
        }
        indexes.insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription, VectorStoreError> {
        let indexes = self.indexes.read().await;
        let spec = indexes
            .get(name)
            .ok_or_else(|| VectorStoreError::IndexNotFound(name.to_string()))?;
        Ok(IndexDescription {
            name: spec.name.clone(),
            dimension: spec.dimension,
            metric: spec.metric,
            host: format!("{}.local", spec.name),
            ready: true,
        })
    }
}
