use super::{ImageGenerationService, TextGenerationService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
enum MockReply<T> {
    Ok(T),
    Fail(String),
}

impl<T: Clone> MockReply<T> {
    fn into_result(self) -> Result<T> {
        match self {
            MockReply::Ok(value) => Ok(value),
            MockReply::Fail(message) => Err(Error::AiProvider(message)),
        }
    }
}

/// Picks the reply for the `count`-th call, cycling through the queue.
fn next_reply<T: Clone>(replies: &Mutex<Vec<MockReply<T>>>, count: usize) -> Option<MockReply<T>> {
    let replies = replies.lock().unwrap();
    if replies.is_empty() {
        None
    } else {
        Some(replies[(count - 1) % replies.len()].clone())
    }
}

/// In-memory text gateway that records every instruction it receives.
#[derive(Clone)]
pub struct MockTextClient {
    replies: Arc<Mutex<Vec<MockReply<String>>>>,
    instructions: Arc<Mutex<Vec<String>>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            instructions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_text_response(self, response: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Ok(response));
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Fail(message));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.instructions.lock().unwrap().len()
    }

    pub fn last_instruction(&self) -> Option<String> {
        self.instructions.lock().unwrap().last().cloned()
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn generate_text(&self, instruction: &str) -> Result<String> {
        let count = {
            let mut instructions = self.instructions.lock().unwrap();
            instructions.push(instruction.to_string());
            instructions.len()
        };

        match next_reply(&self.replies, count) {
            Some(reply) => reply.into_result(),
            None => Ok("{}".to_string()),
        }
    }
}

/// In-memory image gateway that records every prompt it receives.
#[derive(Clone)]
pub struct MockImageClient {
    replies: Arc<Mutex<Vec<MockReply<Vec<u8>>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.replies.lock().unwrap().push(MockReply::Ok(response));
        self
    }

    pub fn with_failure(self, message: String) -> Self {
        self.replies.lock().unwrap().push(MockReply::Fail(message));
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<Vec<u8>> {
        let count = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };

        match next_reply(&self.replies, count) {
            Some(reply) => reply.into_result(),
            // 1x1 PNG
            None => Ok(vec![
                0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
                0x44, 0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00,
                0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x08,
                0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2, 0x25, 0x00,
                0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
            ]),
        }
    }
}
