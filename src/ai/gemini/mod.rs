pub mod chat;
pub mod client;
pub mod image;
pub mod types;

pub use chat::GeminiTextClient;
pub use image::GeminiImageClient;
