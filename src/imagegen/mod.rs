//! Asynchronous image generation integration
//!
//! The upstream API is job-based: submit a prompt, receive a task id, poll
//! until the task reaches a terminal status, then download the result. The
//! HTTP seam is the [`ImageTaskApi`] trait; [`ImageJobClient`] adds the
//! bounded poll loop and the hash-keyed local cache on top.

pub mod client;
pub mod job;
pub mod mock;

pub use client::ModelScopeImageApi;
pub use job::{ImageJobClient, PollConfig};
pub use mock::MockImageTaskApi;

use crate::models::{ImageTaskRequest, ImageTaskStatusResponse};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageTaskApi: Send + Sync {
    /// Submit a generation task, returning its opaque id.
    async fn submit_task(&self, request: ImageTaskRequest) -> Result<String>;

    /// Fetch the current status of a task.
    async fn task_status(&self, task_id: &str) -> Result<ImageTaskStatusResponse>;

    /// Download a finished image by URL.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}
