//! OpenAI-compatible providers. Groq speaks the same chat protocol under a
//! different base URL.

pub mod chat;
pub mod client;
pub mod image;
pub mod types;

pub use chat::OpenAiTextClient;
pub use client::{GROQ_BASE_URL, OPENAI_BASE_URL};
pub use image::OpenAiImageClient;
