//! Itinerary text generation through an OpenAI-compatible chat completions API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::ClientError;
use crate::services::prompt::PromptTemplate;

const TEMPERATURE: f32 = 0.7;

#[async_trait]
pub trait ItineraryLlm: Send + Sync {
    /// Raw model reply for `prompt`. Expected to contain a JSON object.
    async fn complete(&self, prompt: &PromptTemplate) -> Result<String, ClientError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

pub struct OpenAiItineraryClient {
    http_client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl OpenAiItineraryClient {
    pub fn new(http_client: reqwest::Client, config: &AppConfig) -> Self {
        Self {
            http_client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.openai_model.clone(),
        }
    }
}

#[async_trait]
impl ItineraryLlm for OpenAiItineraryClient {
    async fn complete(&self, prompt: &PromptTemplate) -> Result<String, ClientError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ClientError::NotConfigured("OpenAI API key"))?;

        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: TEMPERATURE,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        log::info!("Requesting itinerary completion from model {}", self.model);
        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::from_status(status, body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("Failed to parse completion: {}", e)))?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| ClientError::Decode("Completion contained no content".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{bearer_token, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> OpenAiItineraryClient {
        let config = AppConfig {
            openai_api_key: Some("sk-test".to_string()),
            openai_base_url: server.uri(),
            ..AppConfig::default()
        };
        OpenAiItineraryClient::new(reqwest::Client::new(), &config)
    }

    fn prompt() -> PromptTemplate {
        PromptTemplate {
            system: "system".to_string(),
            user: "user".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "{\"plans\": []}" } }]
            })))
            .mount(&server)
            .await;

        let content = client_for(&server).complete(&prompt()).await.unwrap();
        assert_eq!(content, "{\"plans\": []}");
    }

    #[tokio::test]
    async fn rate_limit_is_classified() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        let err = client_for(&server).complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, ClientError::RateLimited));
    }

    #[tokio::test]
    async fn empty_choices_are_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
            .mount(&server)
            .await;
        let err = client_for(&server).complete(&prompt()).await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
