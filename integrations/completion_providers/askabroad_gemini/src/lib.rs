use askabroad::completion::{CompletionError, CompletionModel, Message, TokenUsage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

const URL: &str = "https://generativelanguage.googleapis.com";
const API_VERSION: &str = "v1beta";
pub const DEFAULT_MODEL: &str = "models/gemini-1.5-pro-latest";

/// Implementation of askabroad's `CompletionModel` trait for [Google Gemini](https://ai.google.dev).
///
/// Every call is a single `generateContent` request carrying only the user's
/// prompt: no history, no system instruction. Generation parameters are left
/// to the provider's defaults unless set explicitly.
///
/// # Examples
///
/// ```rust,no_run
/// use askabroad::completion::Client;
/// use askabroad_gemini::GeminiCompletionModel;
///
/// # async fn run() -> Result<(), askabroad::completion::CompletionError> {
/// let model = GeminiCompletionModel::new("my-api-key");
/// let mut client = Client::new(model);
/// let answer = client.complete("Tell me about study in Türkiye").await?;
/// # Ok(())
/// # }
/// ```
pub struct GeminiCompletionModel {
    api_key: String,
    api_url: String,
    client: reqwest::Client,
    model: String,
    temperature: Option<f64>,
    max_output_tokens: Option<u32>,
}

impl GeminiCompletionModel {
    /// Creates a model client for [`DEFAULT_MODEL`] on the public endpoint.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: URL.to_string(),
            client: reqwest::Client::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Point at a different host, e.g. a proxy or a mock server.
    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Use another model. The `models/` prefix is optional.
    #[must_use]
    pub fn with_model(mut self, model: impl AsRef<str>) -> Self {
        let model = model.as_ref();
        self.model = if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{model}")
        };
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = Some(max_output_tokens);
        self
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{API_VERSION}/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.temperature.is_none() && self.max_output_tokens.is_none() {
            return None;
        }
        Some(GenerationConfig {
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        })
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Content {
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize, Debug)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

impl From<Message> for Content {
    fn from(value: Message) -> Self {
        let (role, text) = match value {
            Message::User(s) => ("user", s),
            Message::Assistant(s) => ("model", s),
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![Part { text: Some(text) }],
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
    total_token_count: Option<u64>,
}

impl From<UsageMetadata> for TokenUsage {
    fn from(u: UsageMetadata) -> Self {
        Self {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        }
    }
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize, Debug)]
struct ErrorDetail {
    message: String,
}

impl GenerateContentResponse {
    fn into_text(self) -> Result<(String, TokenUsage), CompletionError> {
        let usage = self.usage_metadata.map(TokenUsage::from).unwrap_or_default();

        let Some(candidate) = self.candidates.into_iter().next() else {
            let reason = self
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map_or_else(|| "no candidates in response".to_string(), |r| format!("prompt blocked: {r}"));
            return Err(CompletionError::ParseError(reason));
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.is_empty() {
            let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
            return Err(CompletionError::ParseError(format!(
                "Empty response, finish reason: {reason}"
            )));
        }
        Ok((text, usage))
    }
}

#[async_trait]
impl CompletionModel for GeminiCompletionModel {
    #[instrument(skip_all)]
    async fn send(&mut self, message: Message) -> Result<(Message, TokenUsage), CompletionError> {
        let request_body = GenerateContentRequest {
            contents: vec![message.into()],
            generation_config: self.generation_config(),
        };

        debug!(model = %self.model, "Sending request to Gemini");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Request failed");
                CompletionError::RequestError(e.to_string())
            })?;

        let status = response.status();
        debug!(%status, "Received API response");

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!(code = status.as_u16(), message = %message, "Gemini API error");
            return Err(CompletionError::ProviderError(status.as_u16(), message));
        }

        let response: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse response JSON");
            CompletionError::ParseError(e.to_string())
        })?;

        let (text, usage) = response.into_text()?;
        Ok((Message::Assistant(text), usage))
    }
}
