use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ResponseFormat};
use crate::ai::TextGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Chat-completions text gateway for OpenAI and Groq.
pub struct OpenAiTextClient {
    http: OpenAiHttpClient,
    model: String,
    temperature: f32,
}

impl OpenAiTextClient {
    pub fn new(api_key: String, model: String, temperature: f32) -> Self {
        Self::new_with_client(api_key, model, temperature, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        temperature: f32,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, Duration::from_secs(30), client),
            model,
            temperature,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl TextGenerationService for OpenAiTextClient {
    async fn generate_text(&self, instruction: &str) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "system".to_string(),
                content: Some(instruction.to_string()),
            }],
            temperature: Some(self.temperature),
            response_format: Some(ResponseFormat::json_object()),
        };

        tracing::debug!(
            "Requesting poster fields from {} (model: {})",
            self.http.base_url(),
            self.model
        );
        let response: ChatCompletionResponse =
            self.http.post("/v1/chat/completions", &request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::AiProvider("No choices in chat response".to_string()))?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!("Chat response was truncated at the token limit");
        }

        choice
            .message
            .content
            .ok_or_else(|| Error::AiProvider("Chat response has no content".to_string()))
    }
}
