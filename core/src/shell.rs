//! Interactive question/answer loop.
//!
//! The shell owns the current input value and re-renders from scratch on
//! every change: a non-empty value always triggers a fresh completion call,
//! nothing is cached between renders.

use thiserror::Error;
use tracing::{debug, error, instrument};

use crate::completion::{Client, CompletionModel};

pub const TITLE: &str = "Gen AI Conversation AI Agent";
pub const INPUT_LABEL: &str = "Ask a question about studying abroad:";
pub const DEFAULT_QUERY: &str = "Tell me about study in Türkiye";

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("Failed to read input: {0}")]
    Input(String),
    #[error("Failed to write output: {0}")]
    Output(String),
}

/// Something that happened on the input side
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    InputChanged(String),
    Closed,
}

/// What the shell asks the display to show after a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellOutput {
    Response(String),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellState {
    Idle,
    Querying,
}

/// Source of user input. `current` is the value the field holds right now.
pub trait InputSource {
    fn next_event(&mut self, label: &str, current: &str) -> Result<ShellEvent, ShellError>;
}

pub trait DisplaySink {
    fn title(&mut self, title: &str) -> Result<(), ShellError>;
    fn show(&mut self, output: &ShellOutput) -> Result<(), ShellError>;
}

#[must_use]
pub fn format_error(details: &dyn std::fmt::Display) -> String {
    format!("An error occurred while generating response: {details}")
}

pub struct Shell<M: CompletionModel, I: InputSource, D: DisplaySink> {
    client: Client<M>,
    input: I,
    display: D,
    value: String,
    state: ShellState,
}

impl<M, I, D> Shell<M, I, D>
where
    M: CompletionModel,
    I: InputSource,
    D: DisplaySink,
{
    pub fn new(client: Client<M>, input: I, display: D) -> Self {
        Self {
            client,
            input,
            display,
            value: DEFAULT_QUERY.to_string(),
            state: ShellState::Idle,
        }
    }

    /// Current contents of the input field
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn state(&self) -> ShellState {
        self.state
    }

    #[must_use]
    pub fn client(&self) -> &Client<M> {
        &self.client
    }

    #[must_use]
    pub fn display(&self) -> &D {
        &self.display
    }

    /// Render once, then keep handling input events until the input closes.
    ///
    /// # Errors
    /// Only input/output failures end the loop; completion failures are shown inline.
    pub async fn run(&mut self) -> Result<(), ShellError> {
        self.display.title(TITLE)?;
        self.render().await?;
        loop {
            match self.input.next_event(INPUT_LABEL, &self.value)? {
                ShellEvent::Closed => {
                    debug!("Input closed, leaving shell");
                    return Ok(());
                }
                event @ ShellEvent::InputChanged(_) => {
                    self.handle(event).await?;
                }
            }
        }
    }

    /// Apply one event and re-render.
    ///
    /// Returns what was shown, or `None` when the input was empty or closed.
    ///
    /// # Errors
    /// Fails only if the display does.
    pub async fn handle(&mut self, event: ShellEvent) -> Result<Option<ShellOutput>, ShellError> {
        match event {
            ShellEvent::InputChanged(text) => {
                self.value = text;
                self.render().await
            }
            ShellEvent::Closed => Ok(None),
        }
    }

    /// Query the model with the current value, if there is one, and display the outcome.
    ///
    /// # Errors
    /// Fails only if the display does.
    #[instrument(skip(self))]
    pub async fn render(&mut self) -> Result<Option<ShellOutput>, ShellError> {
        if self.value.is_empty() {
            return Ok(None);
        }

        self.state = ShellState::Querying;
        let result = self.client.complete(&self.value).await;
        self.state = ShellState::Idle;

        let output = match result {
            Ok(text) => ShellOutput::Response(text),
            Err(e) => {
                error!(error = %e, "Completion failed");
                ShellOutput::Error(format_error(&e))
            }
        };
        self.display.show(&output)?;
        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionError, Message, TokenUsage};
    use async_trait::async_trait;
    use std::collections::VecDeque;

    /// Replies with a fixed text, or fails with the configured error.
    struct MockModel {
        reply: Result<String, CompletionError>,
        prompts: Vec<String>,
    }

    impl MockModel {
        fn replying(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                prompts: vec![],
            }
        }

        fn failing(e: CompletionError) -> Self {
            Self {
                reply: Err(e),
                prompts: vec![],
            }
        }
    }

    #[async_trait]
    impl CompletionModel for MockModel {
        async fn send(&mut self, message: Message) -> Result<(Message, TokenUsage), CompletionError> {
            self.prompts.push(message.content().to_string());
            let text = self.reply.clone()?;
            Ok((Message::Assistant(text), TokenUsage::default()))
        }
    }

    struct ScriptedInput {
        events: VecDeque<ShellEvent>,
        seen_values: Vec<String>,
    }

    impl ScriptedInput {
        fn new(events: impl IntoIterator<Item = ShellEvent>) -> Self {
            Self {
                events: events.into_iter().collect(),
                seen_values: vec![],
            }
        }
    }

    impl InputSource for ScriptedInput {
        fn next_event(&mut self, label: &str, current: &str) -> Result<ShellEvent, ShellError> {
            assert_eq!(label, INPUT_LABEL);
            self.seen_values.push(current.to_string());
            Ok(self.events.pop_front().unwrap_or(ShellEvent::Closed))
        }
    }

    #[derive(Default)]
    struct RecordingDisplay {
        titles: Vec<String>,
        outputs: Vec<ShellOutput>,
    }

    impl DisplaySink for RecordingDisplay {
        fn title(&mut self, title: &str) -> Result<(), ShellError> {
            self.titles.push(title.to_string());
            Ok(())
        }
        fn show(&mut self, output: &ShellOutput) -> Result<(), ShellError> {
            self.outputs.push(output.clone());
            Ok(())
        }
    }

    const NO_EVENTS: [ShellEvent; 0] = [];

    fn shell_with(
        model: MockModel,
        events: impl IntoIterator<Item = ShellEvent>,
    ) -> Shell<MockModel, ScriptedInput, RecordingDisplay> {
        Shell::new(
            Client::new(model),
            ScriptedInput::new(events),
            RecordingDisplay::default(),
        )
    }

    #[tokio::test]
    async fn test_pass_through() {
        let mut shell = shell_with(MockModel::replying("X"), NO_EVENTS);
        let out = shell
            .handle(ShellEvent::InputChanged("hello".to_string()))
            .await
            .unwrap();
        assert_eq!(out, Some(ShellOutput::Response("X".to_string())));
        assert_eq!(shell.display().outputs, vec![ShellOutput::Response("X".to_string())]);
        assert_eq!(shell.client().model().prompts, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_error_is_surfaced_and_shell_keeps_going() {
        let model = MockModel::failing(CompletionError::RequestError("timeout".to_string()));
        let mut shell = shell_with(
            model,
            [
                ShellEvent::InputChanged("first".to_string()),
                ShellEvent::InputChanged("second".to_string()),
            ],
        );
        shell.run().await.unwrap();

        let outputs = &shell.display().outputs;
        // default render + two inputs
        assert_eq!(outputs.len(), 3);
        for output in outputs {
            match output {
                ShellOutput::Error(msg) => {
                    assert!(msg.starts_with("An error occurred while generating response: "));
                    assert!(msg.contains("timeout"));
                }
                ShellOutput::Response(_) => panic!("expected an error"),
            }
        }
        assert_eq!(shell.state(), ShellState::Idle);
    }

    #[tokio::test]
    async fn test_default_query_is_sent_on_first_render() {
        let mut shell = shell_with(MockModel::replying("ok"), NO_EVENTS);
        assert_eq!(shell.value(), DEFAULT_QUERY);

        shell.run().await.unwrap();

        assert_eq!(shell.display().titles, vec![TITLE.to_string()]);
        assert_eq!(shell.client().model().prompts, vec![DEFAULT_QUERY.to_string()]);
        assert_eq!(shell.input.seen_values, vec![DEFAULT_QUERY.to_string()]);
    }

    #[tokio::test]
    async fn test_identical_queries_are_not_memoized() {
        let mut shell = shell_with(
            MockModel::replying("answer"),
            [
                ShellEvent::InputChanged("A".to_string()),
                ShellEvent::InputChanged("A".to_string()),
            ],
        );
        shell.run().await.unwrap();
        assert_eq!(
            shell.client().model().prompts,
            vec![DEFAULT_QUERY.to_string(), "A".to_string(), "A".to_string()]
        );
    }

    #[tokio::test]
    async fn test_empty_input_does_not_query() {
        let mut shell = shell_with(MockModel::replying("unused"), NO_EVENTS);
        let out = shell
            .handle(ShellEvent::InputChanged(String::new()))
            .await
            .unwrap();
        assert_eq!(out, None);
        assert!(shell.client().model().prompts.is_empty());
        assert!(shell.display().outputs.is_empty());
    }

    #[tokio::test]
    async fn test_input_field_keeps_last_value() {
        let mut shell = shell_with(
            MockModel::replying("r"),
            [ShellEvent::InputChanged("What about Canada?".to_string())],
        );
        shell.run().await.unwrap();
        assert_eq!(
            shell.input.seen_values,
            vec![DEFAULT_QUERY.to_string(), "What about Canada?".to_string()]
        );
    }
}
