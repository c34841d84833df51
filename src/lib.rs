//! Backend for AI-generated posters
//!
//! Turns a short description of a poster into structured copy (headline,
//! subline, call to action, ...) with a text-generation model, then renders
//! the final poster from that copy with an image-generation model.

pub mod ai;
pub mod app;
pub mod error;
pub mod fields;
pub mod models;
pub mod prompts;
pub mod server;

pub use error::{Error, Result};
