use tracing::{info, instrument};

use crate::config::Credentials;
use crate::error::Error;
use crate::vector_store::{IndexDescription, IndexProvisioner, IndexSpec, Provisioned};

/// What startup produced, ready to hand to the shell.
#[derive(Debug)]
pub struct Bootstrapped<P: IndexProvisioner> {
    pub credentials: Credentials,
    pub provisioner: P,
    pub provisioned: Provisioned,
    pub index: IndexDescription,
}

/// Validate credentials, then make sure the index exists and look it up.
///
/// `connect` is only called once both secrets are present, so a missing key
/// fails before anything touches the network.
///
/// # Errors
/// A missing credential, or any failure reported by the provisioner.
#[instrument(skip_all, fields(index = %spec.name))]
pub async fn bootstrap<L, P, F>(lookup: L, connect: F, spec: &IndexSpec) -> Result<Bootstrapped<P>, Error>
where
    L: Fn(&str) -> Option<String>,
    P: IndexProvisioner,
    F: FnOnce(&Credentials) -> Result<P, Error>,
{
    let credentials = Credentials::from_lookup(lookup)?;
    let provisioner = connect(&credentials)?;

    let provisioned = provisioner.ensure_index_exists(spec).await?;
    let index = provisioner.describe_index(&spec.name).await?;
    info!(host = %index.host, ready = index.ready, "Connected to index '{}'", index.name);

    Ok(Bootstrapped {
        credentials,
        provisioner,
        provisioned,
        index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, GEMINI_API_KEY_VAR, PINECONE_API_KEY_VAR};
    use crate::vector_store::{InMemoryProvisioner, VectorStoreError};
    use std::cell::Cell;

    fn env_without(missing: &'static str) -> impl Fn(&str) -> Option<String> {
        move |name: &str| (name != missing).then(|| format!("{name}-value"))
    }

    #[tokio::test]
    async fn test_missing_gemini_key_stops_before_connecting() {
        let connected = Cell::new(false);
        let result = bootstrap(
            env_without(GEMINI_API_KEY_VAR),
            |_| {
                connected.set(true);
                Ok(InMemoryProvisioner::new())
            },
            &IndexSpec::default(),
        )
        .await;

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingSecret(GEMINI_API_KEY_VAR)))
        ));
        assert!(!connected.get());
    }

    #[tokio::test]
    async fn test_missing_pinecone_key_stops_before_connecting() {
        let connected = Cell::new(false);
        let result = bootstrap(
            env_without(PINECONE_API_KEY_VAR),
            |_| {
                connected.set(true);
                Ok(InMemoryProvisioner::new())
            },
            &IndexSpec::default(),
        )
        .await;

        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::MissingSecret(PINECONE_API_KEY_VAR)))
        ));
        assert!(!connected.get());
    }

    #[tokio::test]
    async fn test_bootstrap_provisions_and_describes() {
        let done = bootstrap(
            env_without("NOTHING"),
            |creds| {
                assert_eq!(creds.pinecone_api_key(), "PINECONE_API_KEY-value");
                Ok(InMemoryProvisioner::new())
            },
            &IndexSpec::default(),
        )
        .await
        .unwrap();

        assert_eq!(done.provisioned, Provisioned::Created);
        assert_eq!(done.index.name, "quickstart");
        assert_eq!(done.index.dimension, 1024);
        assert_eq!(done.provisioner.create_calls(), 1);
        assert_eq!(done.credentials.gemini_api_key(), "GEMINI_API_KEY-value");
    }

    #[tokio::test]
    async fn test_second_startup_does_not_recreate() {
        let existing = InMemoryProvisioner::with_indexes([IndexSpec::default()]);
        let done = bootstrap(env_without("NOTHING"), |_| Ok(existing), &IndexSpec::default())
            .await
            .unwrap();

        assert_eq!(done.provisioned, Provisioned::AlreadyExisted);
        assert_eq!(done.provisioner.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_connect_failure_propagates() {
        let result = bootstrap::<_, InMemoryProvisioner, _>(
            env_without("NOTHING"),
            |_| Err(VectorStoreError::Provider("bad host".to_string()).into()),
            &IndexSpec::default(),
        )
        .await;
        assert!(matches!(
            result,
            Err(Error::VectorStore(VectorStoreError::Provider(_)))
        ));
    }
}
