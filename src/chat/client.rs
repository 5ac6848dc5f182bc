use super::ChatApi;
use crate::models::{ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, Message};
use crate::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api-inference.modelscope.cn";

/// Chat client for a ModelScope (OpenAI-compatible) completion endpoint.
pub struct ModelScopeChatClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ModelScopeChatClient {
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn send_request(&self, messages: &[Message], stream: bool) -> Result<Response> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: messages.to_vec(),
            stream,
        };

        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send chat request: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Chat API error (status {}): {}", status, error_text);
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                return Err(Error::Auth(format!(
                    "Chat API rejected the access token (status {}): {}",
                    status, error_text
                )));
            }
            return Err(Error::AiProvider(format!(
                "Chat API error (status {}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatApi for ModelScopeChatClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        tracing::debug!("Sending chat completion request ({} messages)", messages.len());
        let response = self.send_request(messages, false).await?;

        let body = response.text().await?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse chat response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse chat response: {}", e))
        })?;

        parsed
            .choices
            .first()
            .map(|choice| choice.message.content.clone())
            .ok_or_else(|| Error::AiProvider("No choices in chat response".to_string()))
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<String> {
        tracing::debug!(
            "Sending streaming chat completion request ({} messages)",
            messages.len()
        );
        let response = self.send_request(messages, true).await?;

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut content = String::new();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.push_str(&String::from_utf8_lossy(&chunk));

            // SSE frames are newline-delimited `data: {...}` lines.
            while let Some(pos) = buffer.find('\n') {
                let line: String = buffer.drain(..=pos).collect();
                let line = line.trim();
                let Some(data) = line.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data.is_empty() || data == "[DONE]" {
                    continue;
                }
                match serde_json::from_str::<ChatCompletionChunk>(data) {
                    Ok(chunk) => {
                        if let Some(delta) =
                            chunk.choices.first().and_then(|c| c.delta.content.as_deref())
                        {
                            content.push_str(delta);
                        }
                    }
                    Err(e) => {
                        tracing::warn!("Skipping malformed stream chunk: {}", e);
                    }
                }
            }
        }

        Ok(content)
    }
}
