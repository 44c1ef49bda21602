use crate::{
    completion::CompletionError, config::ConfigError, shell::ShellError,
    vector_store::VectorStoreError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),
    #[error("VectorStore error: {0}")]
    VectorStore(#[from] VectorStoreError),
    #[error("Shell error: {0}")]
    Shell(#[from] ShellError),
}
