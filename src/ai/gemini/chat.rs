use super::client::GeminiHttpClient;
use super::types::{Content, GenerateContentResponse};
use crate::ai::TextGenerationService;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct TextRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: TextGenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextGenerationConfig {
    temperature: f32,
    response_mime_type: String,
}

pub struct GeminiTextClient {
    http: GeminiHttpClient,
    temperature: f32,
}

impl GeminiTextClient {
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
            http: GeminiHttpClient::new_with_client(
                api_key,
                model,
                Duration::from_secs(30),
                client,
            ),
            temperature,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }
}

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn generate_text(&self, instruction: &str) -> Result<String> {
        // generateContent needs at least one content turn, so the instruction
        // travels as the user message.
        let request = TextRequest {
            contents: vec![Content::user_text(instruction)],
            generation_config: TextGenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json".to_string(),
            },
        };

        tracing::debug!("Requesting poster fields from Gemini ({})", self.http.model());
        let response: GenerateContentResponse = self.http.generate_content(&request).await?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| Error::AiProvider("No text in Gemini response".to_string()))
    }
}
