//! Groq chat-completions client.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::{ChatModel, LlmError, LlmResult, Message};

/// Groq's OpenAI-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 10_000;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Connection and sampling settings for [`GroqClient`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl LlmConfig {
    /// Settings with the provider defaults and the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

/// Chat-completions client for Groq.
pub struct GroqClient {
    client: Client,
    config: LlmConfig,
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl GroqClient {
    /// Create a new client.
    ///
    /// # Errors
    /// Returns [`LlmError::MissingApiKey`] when the key is blank.
    pub fn new(config: LlmConfig) -> LlmResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        info!("Initialized LLM client for {} ({})", config.base_url, config.model);

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }
}

/// Extract the first choice's content from a chat-completions body.
pub fn parse_completion(body: &str) -> LlmResult<String> {
    let response: CompletionResponse =
        serde_json::from_str(body).map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or(LlmError::EmptyResponse)
}

#[async_trait]
impl ChatModel for GroqClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, messages: &[Message]) -> LlmResult<String> {
        let request = CompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Received completion for {} messages", messages.len());
        parse_completion(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let messages = vec![Message::system("You are a travel planner."), Message::user("Paris?")];
        let request = CompletionRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.1-8b-instant");
        assert_eq!(json["temperature"], 0.7);
        assert_eq!(json["max_tokens"], 10000);
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "Paris?");
    }

    #[test]
    fn test_parse_completion_takes_first_choice() {
        let body = r#"{
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "First"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "Second"}, "finish_reason": "stop"}
            ]
        }"#;
        assert_eq!(parse_completion(body).unwrap(), "First");
    }

    #[test]
    fn test_parse_completion_empty_choices() {
        let err = parse_completion(r#"{"choices": []}"#).unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse));
    }

    #[test]
    fn test_parse_completion_malformed() {
        let err = parse_completion(r#"{"choices": "nope"}"#).unwrap_err();
        assert!(matches!(err, LlmError::InvalidResponse(_)));
        assert!(parse_completion("not json").is_err());
    }

    #[test]
    fn test_parse_completion_null_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "");
    }

    #[test]
    fn test_blank_api_key_is_rejected() {
        assert!(matches!(
            GroqClient::new(LlmConfig::new("  ")),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn test_completions_url_joins_base() {
        let mut config = LlmConfig::new("key");
        assert_eq!(
            config.completions_url(),
            "https://api.groq.com/openai/v1/chat/completions"
        );

        config.base_url = "http://localhost:9999/v1/".to_string();
        assert_eq!(config.completions_url(), "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_client_name_is_model() {
        let client = GroqClient::new(LlmConfig::new("key")).unwrap();
        assert_eq!(client.name(), DEFAULT_MODEL);
        assert_eq!(client.config().max_tokens, DEFAULT_MAX_TOKENS);
    }
}
