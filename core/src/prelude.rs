pub use crate::completion::{Client, CompletionError, CompletionModel, Message, TokenUsage};
pub use crate::config::Credentials;
pub use crate::shell::{DisplaySink, InputSource, Shell, ShellEvent, ShellOutput};
pub use crate::startup::bootstrap;
pub use crate::vector_store::{
    InMemoryProvisioner, IndexProvisioner, IndexSpec, Metric, Placement, Provisioned,
};
