use std::fmt;
use thiserror::Error;

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const PINECONE_API_KEY_VAR: &str = "PINECONE_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} is missing in your environment variables.")]
    MissingSecret(&'static str),
}

/// API keys for the completion service and the vector store.
///
/// Built once at process entry and handed to the provider constructors.
/// The `Debug` impl never prints the secrets.
#[derive(Clone)]
pub struct Credentials {
    gemini_api_key: String,
    pinecone_api_key: String,
}

impl Credentials {
    /// Reads both keys from the process environment.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSecret`] naming the first key that is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads both keys through `lookup`, `GEMINI_API_KEY` first.
    ///
    /// # Errors
    /// Returns [`ConfigError::MissingSecret`] naming the first key that is unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let gemini_api_key = required(&lookup, GEMINI_API_KEY_VAR)?;
        let pinecone_api_key = required(&lookup, PINECONE_API_KEY_VAR)?;
        Ok(Self {
            gemini_api_key,
            pinecone_api_key,
        })
    }

    #[must_use]
    pub fn gemini_api_key(&self) -> &str {
        &self.gemini_api_key
    }

    #[must_use]
    pub fn pinecone_api_key(&self) -> &str {
        &self.pinecone_api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("gemini_api_key", &"<redacted>")
            .field("pinecone_api_key", &"<redacted>")
            .finish()
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingSecret(name))
}
