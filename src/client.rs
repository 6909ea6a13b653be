use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{LlmProvider, LlmSettings};

/// Single-turn text completion: one user prompt in, the model's text out.
#[async_trait]
pub trait CompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

pub type DynCompletionClient = dyn CompletionClient + Send + Sync;

/// Client for OpenAI-compatible `/chat/completions` endpoints.
#[derive(Debug, Clone)]
pub struct AIClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
    user_agent: String,
    provider: LlmProvider,
}

impl AIClient {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            user_agent: settings.user_agent.clone(),
            provider: settings.provider,
        })
    }

    pub async fn chat_completion(
        &self,
        request: ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        let url = format!("{}/chat/completions", self.base_url);

        let mut req_builder = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("User-Agent", &self.user_agent)
            .header("Content-Type", "application/json")
            .json(&request);

        if matches!(self.provider, LlmProvider::OpenRouter) {
            req_builder = req_builder.header("X-Title", "taskplan");
        }

        let response = req_builder
            .send()
            .await
            .context("Failed to send request to chat completions endpoint")?;

        match response.status() {
            reqwest::StatusCode::OK => response
                .json::<ChatCompletionResponse>()
                .await
                .context("Failed to parse chat completion response JSON"),
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let error_text = response.text().await.unwrap_or_default();
                Err(anyhow!(
                    "Too many requests to the completion service (API response: {})",
                    error_text
                ))
            }
            reqwest::StatusCode::UNAUTHORIZED => Err(anyhow!(
                "Invalid API key. Please check your API key configuration."
            )),
            reqwest::StatusCode::BAD_REQUEST => {
                let error_text = response.text().await.unwrap_or_default();
                Err(anyhow!("Invalid request: {}", error_text))
            }
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
            | reqwest::StatusCode::SERVICE_UNAVAILABLE => Err(anyhow!(
                "Completion service is temporarily unavailable."
            )),
            status => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(anyhow!("API error (status {}): {}", status, error_text))
            }
        }
    }
}

#[async_trait]
impl CompletionClient for AIClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: ChatMessageRole::User,
                content: prompt.to_string(),
            }],
        };

        let response = self.chat_completion(request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Completion service returned no choices"))?;

        debug!(
            finish_reason = ?choice.finish_reason,
            chars = choice.message.content.len(),
            "completion received"
        );

        Ok(choice.message.content)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatMessageRole,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    pub finish_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn settings_for(server: &MockServer) -> LlmSettings {
        LlmSettings {
            base_url: server.url("/v1"),
            api_key: "test-key".to_string(),
            model: "test/model".to_string(),
            user_agent: "taskplan/test".to_string(),
            ..LlmSettings::default()
        }
    }

    #[tokio::test]
    async fn complete_sends_single_user_message() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1/chat/completions")
                    .header("Authorization", "Bearer test-key")
                    .json_body(json!({
                        "model": "test/model",
                        "messages": [
                            { "role": "user", "content": "hello there" }
                        ]
                    }));

                then.status(200).json_body(json!({
                    "choices": [
                        {
                            "index": 0,
                            "finish_reason": "stop",
                            "message": { "role": "assistant", "content": "general kenobi" }
                        },
                        {
                            "index": 1,
                            "finish_reason": "stop",
                            "message": { "role": "assistant", "content": "ignored" }
                        }
                    ]
                }));
            })
            .await;

        let client = AIClient::new(&settings_for(&server)).unwrap();
        let text = client.complete("hello there").await.unwrap();

        assert_eq!(text, "general kenobi");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn complete_errors_when_no_choices() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let client = AIClient::new(&settings_for(&server)).unwrap();
        let err = client.complete("anything").await.unwrap_err();

        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn complete_maps_unauthorized() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(401).body("nope");
            })
            .await;

        let client = AIClient::new(&settings_for(&server)).unwrap();
        let err = client.complete("anything").await.unwrap_err();

        assert!(err.to_string().contains("Invalid API key"));
    }

    #[tokio::test]
    async fn complete_errors_on_malformed_provider_body() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path("/v1/chat/completions");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let client = AIClient::new(&settings_for(&server)).unwrap();
        let err = client.complete("anything").await.unwrap_err();

        assert!(err.to_string().contains("Failed to parse chat completion response JSON"));
    }

    #[test]
    fn new_trims_trailing_slash() {
        let settings = LlmSettings {
            base_url: "http://localhost:1234/v1/".to_string(),
            ..LlmSettings::default()
        };
        let client = AIClient::new(&settings).unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/v1");
        assert_eq!(client.model, settings.model);
    }
}
