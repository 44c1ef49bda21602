use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, instrument};

/// Message exchanged with a completion model
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Message sent by the user
    User(String),
    /// Response from the assistant
    Assistant(String),
}

impl Message {
    #[must_use]
    pub fn content(&self) -> &str {
        match self {
            Self::User(s) | Self::Assistant(s) => s,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: Option<u64>,
    pub completion_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionError {
    #[error("Provider error -> HTTP Status {0}: {1}")]
    ProviderError(u16, String),
    #[error("RequestError: {0}")]
    RequestError(String),
    #[error("ParseError: {0}")]
    ParseError(String),
}

#[async_trait]
pub trait CompletionModel: Send {
    /// Send a single message to the LLM and get a reply.
    ///
    /// No history or system prompt is attached, every call stands alone.
    async fn send(&mut self, message: Message) -> Result<(Message, TokenUsage), CompletionError>;
}

/// Single-shot prompt client over a [`CompletionModel`].
///
/// Keeps no conversation state apart from a running token count.
pub struct Client<M: CompletionModel> {
    completion_model: M,
    token_usage: TokenUsage,
}

impl<M: CompletionModel> Client<M> {
    pub fn new(completion_model: M) -> Self {
        Self {
            completion_model,
            token_usage: TokenUsage::default(),
        }
    }

    /// Sends `prompt` verbatim and returns the text of the model's reply.
    ///
    /// # Errors
    /// Whatever the model reports: transport, provider or parse failures.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub async fn complete(&mut self, prompt: &str) -> Result<String, CompletionError> {
        let message = Message::User(prompt.to_string());
        let (response, token_usage) = self.completion_model.send(message).await?;

        self.update_token_usage(&token_usage);
        if token_usage.total_tokens.is_some() {
            info!(
                "Prompt used up: {:?} tokens, Total tokens used: {:?}",
                token_usage.total_tokens, self.token_usage.total_tokens
            );
        }

        match response {
            Message::Assistant(content) => Ok(content),
            Message::User(_) => Err(CompletionError::ParseError(
                "Model replied with a user message".to_string(),
            )),
        }
    }

    #[must_use]
    pub fn token_usage(&self) -> &TokenUsage {
        &self.token_usage
    }

    #[must_use]
    pub fn model(&self) -> &M {
        &self.completion_model
    }

    fn update_token_usage(&mut self, usage: &TokenUsage) {
        self.token_usage.prompt_tokens =
            combine_options(self.token_usage.prompt_tokens, usage.prompt_tokens);
        self.token_usage.completion_tokens =
            combine_options(self.token_usage.completion_tokens, usage.completion_tokens);
        self.token_usage.total_tokens =
            combine_options(self.token_usage.total_tokens, usage.total_tokens);
    }
}

fn combine_options(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a_val), Some(b_val)) => Some(a_val + b_val),
        (None, Some(b_val)) => Some(b_val),
        (a, None) => a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoModel {
        calls: usize,
    }

    #[async_trait]
    impl CompletionModel for EchoModel {
        async fn send(&mut self, message: Message) -> Result<(Message, TokenUsage), CompletionError> {
            self.calls += 1;
            let usage = TokenUsage {
                prompt_tokens: Some(2),
                completion_tokens: Some(3),
                total_tokens: Some(5),
            };
            Ok((Message::Assistant(format!("echo: {}", message.content())), usage))
        }
    }

    struct ConfusedModel;

    #[async_trait]
    impl CompletionModel for ConfusedModel {
        async fn send(&mut self, message: Message) -> Result<(Message, TokenUsage), CompletionError> {
            Ok((message, TokenUsage::default()))
        }
    }

    #[tokio::test]
    async fn test_complete_returns_assistant_text() {
        let mut client = Client::new(EchoModel { calls: 0 });
        let reply = client.complete("hello").await.unwrap();
        assert_eq!(reply, "echo: hello");
        assert_eq!(client.model().calls, 1);
    }

    #[tokio::test]
    async fn test_token_usage_accumulates() {
        let mut client = Client::new(EchoModel { calls: 0 });
        client.complete("a").await.unwrap();
        client.complete("b").await.unwrap();
        assert_eq!(
            client.token_usage(),
            &TokenUsage {
                prompt_tokens: Some(4),
                completion_tokens: Some(6),
                total_tokens: Some(10),
            }
        );
    }

    #[tokio::test]
    async fn test_non_assistant_reply_is_parse_error() {
        let mut client = Client::new(ConfusedModel);
        let err = client.complete("hi").await.unwrap_err();
        assert!(matches!(err, CompletionError::ParseError(_)));
    }

    #[test]
    fn test_combine_options() {
        assert_eq!(combine_options(Some(1), Some(2)), Some(3));
        assert_eq!(combine_options(None, Some(2)), Some(2));
        assert_eq!(combine_options(Some(1), None), Some(1));
        assert_eq!(combine_options(None, None), None);
    }
}
