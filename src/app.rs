//! Orchestration of the two poster stages.
//!
//! Stage one turns a [`FieldRequest`] into a [`FieldMapping`] through the text
//! model. Stage two renders a (possibly edited) mapping into an image. The
//! stages share no state; each call makes exactly one provider attempt.

use crate::ai::mime::image_mime_or_default;
use crate::ai::openai::GROQ_BASE_URL;
use crate::ai::{
    GeminiImageClient, GeminiTextClient, ImageGenerationService, OpenAiImageClient,
    OpenAiTextClient, TextGenerationService,
};
use crate::fields::{missing_fields, parse_fields, resolve_theme};
use crate::models::{AiProvider, Config, FieldMapping, FieldRequest};
use crate::prompts::{compose_field_instruction, compose_poster_prompt};
use crate::{Error, Result};
use base64::Engine as _;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Rendered poster bytes with their detected MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl PosterImage {
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }
}

/// Coordinates prompt composition and the provider gateways.
pub struct App {
    text: Box<dyn TextGenerationService>,
    image: Box<dyn ImageGenerationService>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub text: Box<dyn TextGenerationService>,
    pub image: Box<dyn ImageGenerationService>,
}

impl App {
    pub fn with_services(services: AppServices) -> Self {
        Self {
            text: services.text,
            image: services.image,
        }
    }

    fn build_text_client(
        config: &Config,
        http_client: reqwest::Client,
    ) -> Result<Box<dyn TextGenerationService>> {
        let provider = config.text_provider;
        let api_key = config.api_key_for(provider)?;
        let model = config.text_model.clone();
        let temperature = config.text_temperature;
        info!("Text provider: {} (model: {})", provider, model);

        let client: Box<dyn TextGenerationService> = match provider {
            AiProvider::Groq => Box::new(
                OpenAiTextClient::new_with_client(api_key, model, temperature, http_client)
                    .with_base_url(GROQ_BASE_URL.to_string()),
            ),
            AiProvider::OpenAi => {
                let client =
                    OpenAiTextClient::new_with_client(api_key, model, temperature, http_client);
                match &config.openai_base_url {
                    Some(base_url) => Box::new(client.with_base_url(base_url.clone())),
                    None => Box::new(client),
                }
            }
            AiProvider::Gemini => Box::new(GeminiTextClient::new_with_client(
                api_key,
                model,
                temperature,
                http_client,
            )),
        };
        Ok(client)
    }

    fn build_image_client(
        config: &Config,
        http_client: reqwest::Client,
    ) -> Result<Box<dyn ImageGenerationService>> {
        let provider = config.image_provider;
        let api_key = config.api_key_for(provider)?;
        let model = config.image_model.clone();
        info!("Image provider: {} (model: {})", provider, model);

        let client: Box<dyn ImageGenerationService> = match provider {
            AiProvider::Groq => {
                return Err(Error::Config(
                    "groq does not support image generation".to_string(),
                ));
            }
            AiProvider::OpenAi => {
                let client = OpenAiImageClient::new_with_client(api_key, model, http_client);
                match &config.openai_base_url {
                    Some(base_url) => Box::new(client.with_base_url(base_url.clone())),
                    None => Box::new(client),
                }
            }
            AiProvider::Gemini => Box::new(GeminiImageClient::new_with_client(
                api_key,
                model,
                http_client,
            )),
        };
        Ok(client)
    }

    /// Build provider-backed gateways from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        Ok(Self::with_services(AppServices {
            text: Self::build_text_client(config, http_client.clone())?,
            image: Self::build_image_client(config, http_client)?,
        }))
    }

    /// Stage one: ask the text model for the requested poster copy.
    pub async fn generate_fields(&self, request: &FieldRequest) -> Result<FieldMapping> {
        let request_id = Uuid::new_v4();
        info!(
            "[{}] Generating fields {:?} for intent: {}",
            request_id,
            request.fields(),
            request.main_intent()
        );
        if let Some(prompt) = request.override_prompt() {
            debug!("[{}] Ignoring custom prompt: {}", request_id, prompt);
        }

        let instruction =
            compose_field_instruction(request.fields(), request.main_intent(), request.theme());
        debug!("[{}] Text instruction:\n{}", request_id, instruction);

        let raw = self.text.generate_text(&instruction).await.map_err(|e| {
            error!("[{}] Text generation failed: {}", request_id, e);
            e
        })?;
        debug!("[{}] Raw text reply:\n{}", request_id, raw);

        let mapping = parse_fields(&raw)?;

        let missing = missing_fields(request.fields(), &mapping);
        if !missing.is_empty() {
            warn!(
                "[{}] Text model omitted requested fields: {:?}",
                request_id, missing
            );
        }

        info!("[{}] Generated {} field(s)", request_id, mapping.len());
        Ok(mapping)
    }

    /// Stage two: render the poster image from field copy.
    pub async fn generate_poster(
        &self,
        fields: &FieldMapping,
        theme: Option<&str>,
    ) -> Result<PosterImage> {
        let request_id = Uuid::new_v4();
        let theme = resolve_theme(fields, theme);
        info!(
            "[{}] Generating poster from {} field(s)",
            request_id,
            fields.len()
        );

        let prompt = compose_poster_prompt(fields, &theme);
        debug!("[{}] Image prompt:\n{}", request_id, prompt);

        let bytes = self.image.generate_image(&prompt).await.map_err(|e| {
            error!("[{}] Image generation failed: {}", request_id, e);
            e
        })?;
        if bytes.is_empty() {
            error!("[{}] Image provider returned no bytes", request_id);
            return Err(Error::AiProvider("Empty image returned".to_string()));
        }

        let mime_type = image_mime_or_default(&bytes);
        info!(
            "[{}] Generated poster ({} bytes, {})",
            request_id,
            bytes.len(),
            mime_type
        );
        Ok(PosterImage { bytes, mime_type })
    }
}
