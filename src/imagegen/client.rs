use super::ImageTaskApi;
use crate::models::{ImageTaskRequest, ImageTaskStatusResponse, ImageTaskSubmitResponse};
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api-inference.modelscope.cn";

/// HTTP client for the ModelScope asynchronous image generation API.
pub struct ModelScopeImageApi {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ModelScopeImageApi {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn check(&self, response: Response, context: &str) -> Result<Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let error_text = response.text().await?;
        tracing::error!("{} failed (status {}): {}", context, status, error_text);
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(format!(
                "{} rejected the access token (status {}): {}",
                context, status, error_text
            )));
        }
        Err(Error::AiProvider(format!(
            "{} failed (status {}): {}",
            context, status, error_text
        )))
    }
}

#[async_trait]
impl ImageTaskApi for ModelScopeImageApi {
    async fn submit_task(&self, request: ImageTaskRequest) -> Result<String> {
        tracing::debug!("Submitting image task (model: {})", request.model);

        let url = format!("{}/v1/images/generations", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-ModelScope-Async-Mode", "true")
            .json(&request)
            .send()
            .await?;
        let response = self.check(response, "Image task submission").await?;

        let parsed: ImageTaskSubmitResponse = response.json().await?;
        Ok(parsed.task_id)
    }

    async fn task_status(&self, task_id: &str) -> Result<ImageTaskStatusResponse> {
        let url = format!("{}/v1/tasks/{}", self.base_url, task_id);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("X-ModelScope-Task-Type", "image_generation")
            .send()
            .await?;
        let response = self.check(response, "Image task status poll").await?;

        Ok(response.json().await?)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let response = self.check(response, "Image download").await?;
        Ok(response.bytes().await?.to_vec())
    }
}
