//! OpenAI-compatible chat-completions client.

use async_trait::async_trait;
use lyceum_core::{ChatRequest, ChatResponse, Role};
use lyceum_error::{LyceumResult, ProviderError, ProviderErrorKind};
use lyceum_interface::ChatProvider;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Wire request for `/chat/completions`.
#[derive(Debug, Clone, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<ApiMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

/// HTTP client for OpenAI-compatible chat-completion APIs.
///
/// The model identifier comes from each request rather than the client, so a
/// single client serves every tier's route.
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiCompatClient {
    /// Creates a client against the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client against a compatible server at `base_url`.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer token for the API
    /// * `base_url` - Endpoint root, e.g. "http://localhost:8000/v1"
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let base_url = base_url.into();
        debug!(base_url, "Creating new OpenAI-compatible client");
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `OPENAI_API_KEY` (required) and `OPENAI_BASE_URL` (optional),
    /// loading a `.env` file first when present.
    ///
    /// # Errors
    ///
    /// Returns an error if `OPENAI_API_KEY` is not set.
    pub fn from_env() -> LyceumResult<Self> {
        dotenvy::dotenv().ok();
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| ProviderError::new(ProviderErrorKind::MissingApiKey))?;
        let base_url =
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Ok(Self::with_base_url(api_key, base_url))
    }

    fn convert_request(request: &ChatRequest) -> ApiRequest {
        ApiRequest {
            model: request.model.clone(),
            messages: request
                .messages
                .iter()
                .map(|message| ApiMessage {
                    role: role_name(message.role).to_string(),
                    content: message.content.clone(),
                })
                .collect(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

#[async_trait]
impl ChatProvider for OpenAiCompatClient {
    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn chat(&self, request: &ChatRequest) -> LyceumResult<ChatResponse> {
        debug!("Sending chat completion request");
        let body = Self::convert_request(request);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to provider");
                ProviderError::new(ProviderErrorKind::Http(format!("Request failed: {}", e)))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            error!(status, body = %message, "Provider returned error");
            return Err(ProviderError::new(ProviderErrorKind::Api { status, message }).into());
        }

        let parsed: ApiResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse provider response");
            ProviderError::new(ProviderErrorKind::Parse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::new(ProviderErrorKind::EmptyResponse))?;

        debug!("Received chat completion");
        Ok(ChatResponse {
            text: choice.message.content,
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lyceum_core::Message;

    #[test]
    fn converts_roles_and_parameters() {
        let request = ChatRequest {
            model: "gpt-4o-mini".to_string(),
            messages: vec![
                Message::system("You are a patient tutor."),
                Message::user("What is 7 x 8?"),
                Message::assistant("56."),
            ],
            max_tokens: 128,
            temperature: 0.2,
        };

        let body = OpenAiCompatClient::convert_request(&request);
        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.max_tokens, 128);
        let roles: Vec<_> = body.messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, vec!["system", "user", "assistant"]);
    }

    #[test]
    fn parses_completion_response() {
        let raw = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {
                    "index": 0,
                    "message": {"role": "assistant", "content": "56."},
                    "finish_reason": "stop"
                }
            ]
        }"#;

        let parsed: ApiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.choices[0].message.content, "56.");
    }
}
