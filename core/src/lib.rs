//! # askabroad - Core API Documentation
//!
//! askabroad is a small question-answering front end: a user types a question,
//! it is sent verbatim to a hosted LLM, and the reply is shown.
//! On startup it also makes sure a named vector index exists in the backing store.
//!
//! ## Building blocks
//!
//! - **Config**: API keys read once from the environment into [`config::Credentials`]
//! - **Vector Stores**: idempotent index provisioning behind [`vector_store::IndexProvisioner`]
//! - **LLM Clients**: single-shot completions behind [`completion::CompletionModel`]
//! - **Shell**: the input → completion → display loop in [`shell::Shell`]
//!
//! Provider implementations live in their own crates (`askabroad_gemini`,
//! `askabroad_pinecone`); this crate holds the traits, the loop and the
//! in-memory stand-ins.
//!
//! ## Example
//!
//! ```rust,no_run
//! use askabroad::prelude::*;
//! # struct MyModel;
//! # #[async_trait::async_trait]
//! # impl CompletionModel for MyModel {
//! #     async fn send(&mut self, m: Message) -> Result<(Message, TokenUsage), CompletionError> {
//! #         Ok((Message::Assistant(m.content().to_string()), TokenUsage::default()))
//! #     }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), askabroad::error::Error> {
//!     let done = bootstrap(
//!         |name| std::env::var(name).ok(),
//!         |_creds| Ok(InMemoryProvisioner::new()),
//!         &IndexSpec::default(),
//!     )
//!     .await?;
//!     println!("index ready at {}", done.index.host);
//!
//!     let mut client = Client::new(MyModel);
//!     let answer = client.complete("Tell me about study in Türkiye").await?;
//!     println!("{answer}");
//!     Ok(())
//! }
//! ```

/// Language model completions
///
/// Contains:
/// - the `CompletionModel` trait providers implement
/// - a single-shot `Client` that tracks token usage
pub mod completion;

/// Credentials read from the environment
pub mod config;

/// Error types for all library operations
pub mod error;

/// Convenience prelude exports
pub mod prelude;

/// Interactive question/answer loop
pub mod shell;

/// Startup sequence: credentials, then index provisioning
pub mod startup;

/// Vector index provisioning
pub mod vector_store;
