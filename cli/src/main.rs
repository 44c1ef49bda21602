mod terminal;

use anyhow::{Context, Result};
use askabroad::prelude::*;
use askabroad_gemini::GeminiCompletionModel;
use askabroad_pinecone::PineconeProvisioner;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use terminal::{TerminalDisplay, TerminalInput};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    fmt()
        .with_env_filter(env_filter(rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let spec = IndexSpec::default();
    let ready = bootstrap(
        |name| std::env::var(name).ok(),
        |creds| Ok(PineconeProvisioner::new(creds.pinecone_api_key())),
        &spec,
    )
    .await
    .context("Startup failed")?;
    info!(outcome = ?ready.provisioned, "Index '{}' is in place", ready.index.name);

    let model = GeminiCompletionModel::new(ready.credentials.gemini_api_key());
    info!(model = model.model(), "Completion model ready");

    let mut shell = Shell::new(Client::new(model), TerminalInput::new(), TerminalDisplay::new());
    shell.run().await?;
    Ok(())
}

/// `RUST_LOG` directives when set and valid, `info` otherwise.
fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}
