//! Hosted chat-completion backend (OpenAI-compatible wire format).

use crate::config::BackendCredentials;
use crate::generation::{ErrorKind, GenerationRequest, GenerationResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

pub const MISSING_CHAT_KEY: &str = "remote chat credential not configured";

/// Upper bound on the provider body echoed back in a `ProviderError`.
pub(crate) const ERROR_BODY_CHARS: usize = 200;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: usize,
    temperature: f64,
    top_p: f64,
}

#[derive(Deserialize, Debug)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
struct Choice {
    message: Message,
}

/// Stateless apart from configuration; cheap to clone.
#[derive(Clone)]
pub struct RemoteChatBackend {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl RemoteChatBackend {
    pub fn new(http: reqwest::Client, credentials: &BackendCredentials) -> Self {
        Self {
            http,
            api_key: credentials.chat_api_key.clone(),
            model: credentials.chat_model.clone(),
            endpoint: credentials.chat_endpoint.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// One attempt, no retry. Never returns an `Err`; every failure is a
    /// `GenerationResult` with its kind set.
    pub async fn complete(&self, request: &GenerationRequest) -> GenerationResult {
        let Some(api_key) = &self.api_key else {
            warn!("remote chat requested without a credential");
            return GenerationResult::failure(ErrorKind::ConfigurationError, MISSING_CHAT_KEY);
        };

        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system_text {
            messages.push(Message {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(Message {
            role: "user".to_string(),
            content: request.prompt_text.clone(),
        });

        let body = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens: request.max_output_tokens,
            temperature: request.temperature,
            top_p: request.top_p,
        };
        debug!(model = %self.model, max_tokens = body.max_tokens, "sending chat completion");

        let response = match self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("chat completion transport error: {}", e);
                return GenerationResult::failure(ErrorKind::TransportError, e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "chat completion rejected by provider");
            return GenerationResult::failure(
                ErrorKind::ProviderError,
                format!(
                    "chat completion failed with status {}: {}",
                    status.as_u16(),
                    truncate_chars(&text, ERROR_BODY_CHARS)
                ),
            );
        }

        match response.json::<ChatCompletionResponse>().await {
            Ok(parsed) => match parsed.choices.into_iter().next() {
                Some(choice) => GenerationResult::ok(choice.message.content.trim()),
                None => GenerationResult::failure(
                    ErrorKind::ProviderError,
                    "chat completion response contained no choices",
                ),
            },
            Err(e) => {
                error!("chat completion body could not be decoded: {}", e);
                GenerationResult::failure(ErrorKind::TransportError, e.to_string())
            }
        }
    }
}

pub(crate) fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 200), "short");
    }

    #[tokio::test]
    async fn missing_key_is_a_configuration_error() {
        let backend = RemoteChatBackend::new(reqwest::Client::new(), &BackendCredentials::default());
        assert!(!backend.is_configured());
        let result = backend.complete(&GenerationRequest::new("hello", 10)).await;
        assert_eq!(result.error_kind, Some(ErrorKind::ConfigurationError));
        assert_eq!(result.error_detail, MISSING_CHAT_KEY);
    }

    #[test]
    fn request_serializes_system_before_user() {
        let body = ChatCompletionRequest {
            model: "m",
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: "s".to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: "u".to_string(),
                },
            ],
            max_tokens: 5,
            temperature: 0.8,
            top_p: 0.95,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "u");
        assert_eq!(value["max_tokens"], 5);
    }
}
