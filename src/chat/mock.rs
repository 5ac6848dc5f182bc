use super::ChatApi;
use crate::models::Message;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Scripted chat backend for tests: replies cycle through the queued
/// responses in order, and both trait methods share one call counter.
#[derive(Clone)]
pub struct MockChatApi {
    responses: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
    failure: Arc<Mutex<Option<String>>>,
}

impl MockChatApi {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            failure: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_response(self, response: String) -> Self {
        self.responses.lock().unwrap().push(response);
        self
    }

    /// Make every call fail with the given message.
    pub fn failing(self, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    fn next_response(&self, messages: &[Message]) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        if let Some(message) = self.failure.lock().unwrap().as_ref() {
            return Err(Error::AiProvider(message.clone()));
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            let last_user = messages
                .iter()
                .rev()
                .find(|m| m.role == crate::models::Role::User)
                .map(|m| m.content.as_str())
                .unwrap_or("");
            Ok(format!("mock reply to: {}", last_user))
        } else {
            let index = (*count - 1) % responses.len();
            Ok(responses[index].clone())
        }
    }
}

impl Default for MockChatApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatApi for MockChatApi {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        self.next_response(messages)
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<String> {
        self.next_response(messages)
    }
}
