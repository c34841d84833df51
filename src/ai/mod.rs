//! AI service integration for poster copy and poster images
//!
//! Defines the two gateway seams the pipeline depends on and their
//! provider-backed and in-memory implementations.

pub mod gemini;
pub mod mime;
pub mod mock;
pub mod openai;

pub use gemini::{GeminiImageClient, GeminiTextClient};
pub use mock::{MockImageClient, MockTextClient};
pub use openai::{OpenAiImageClient, OpenAiTextClient};

use crate::Result;
use async_trait::async_trait;

/// Sends one instruction to a text model and returns its raw reply.
#[async_trait]
pub trait TextGenerationService: Send + Sync {
    async fn generate_text(&self, instruction: &str) -> Result<String>;
}

/// Renders one prompt with an image model and returns the image bytes.
#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>>;
}
