use super::ImageTaskApi;
use crate::models::{ImageTaskRequest, TaskStatus};
use crate::{Error, Result};
use image::{DynamicImage, ImageFormat};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Bounds for the status poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 100,
        }
    }
}

/// Submits image generation jobs and caches results on local disk.
///
/// Output files are keyed by a hash of the prompt, so regenerating the same
/// prompt overwrites the same file. Jobs are independent; callers may run
/// several concurrently.
pub struct ImageJobClient {
    api: Arc<dyn ImageTaskApi>,
    output_dir: PathBuf,
    default_model: String,
    poll: PollConfig,
}

impl ImageJobClient {
    pub fn new(
        api: Arc<dyn ImageTaskApi>,
        output_dir: impl Into<PathBuf>,
        default_model: String,
    ) -> Self {
        Self {
            api,
            output_dir: output_dir.into(),
            default_model,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Deterministic cache path for a prompt.
    pub fn image_path(&self, prompt: &str) -> PathBuf {
        let digest = Sha256::digest(prompt.as_bytes());
        self.output_dir.join(format!("{}.jpg", hex::encode(digest)))
    }

    /// Submit a generation job, returning the upstream task id.
    ///
    /// Rejects empty or whitespace-only prompts before any network call.
    pub async fn submit(
        &self,
        prompt: &str,
        model: Option<&str>,
        extra: serde_json::Map<String, serde_json::Value>,
    ) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::EmptyPrompt);
        }

        let request = ImageTaskRequest {
            model: model.unwrap_or(&self.default_model).to_string(),
            prompt: prompt.to_string(),
            extra,
        };

        let task_id = self.api.submit_task(request).await?;
        tracing::info!("Submitted image task {}", task_id);
        Ok(task_id)
    }

    /// Poll a task to completion and persist the result.
    ///
    /// The loop is bounded by [`PollConfig::max_attempts`] and can be
    /// stopped early through the cancellation token; both cases surface as
    /// distinct errors rather than hanging the caller.
    pub async fn poll(
        &self,
        task_id: &str,
        prompt: &str,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let path = self.image_path(prompt);

        for attempt in 1..=self.poll.max_attempts {
            let status = self.api.task_status(task_id).await?;

            match status.task_status {
                TaskStatus::Succeed => {
                    let url = status.output_images.first().ok_or_else(|| {
                        Error::AiProvider("Task succeeded but returned no images".to_string())
                    })?;
                    let bytes = self.api.download(url).await?;
                    save_as_jpeg(bytes, &path).await?;
                    tracing::info!("Image task {} saved to {}", task_id, path.display());
                    return Ok(path);
                }
                TaskStatus::Failed => {
                    let message = status
                        .error_message
                        .unwrap_or_else(|| "image generation failed".to_string());
                    return Err(Error::TaskFailed(message));
                }
                TaskStatus::Pending | TaskStatus::Running | TaskStatus::Unknown => {
                    tracing::debug!(
                        "Image task {} still in progress (attempt {}/{})",
                        task_id,
                        attempt,
                        self.poll.max_attempts
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = tokio::time::sleep(self.poll.interval) => {}
                    }
                }
            }
        }

        Err(Error::PollTimeout(self.poll.max_attempts))
    }

    /// Submit a job and poll it to completion in one call.
    pub async fn submit_and_save(
        &self,
        prompt: &str,
        model: Option<&str>,
        extra: serde_json::Map<String, serde_json::Value>,
        cancel: &CancellationToken,
    ) -> Result<PathBuf> {
        let task_id = self.submit(prompt, model, extra).await?;
        self.poll(&task_id, prompt, cancel).await
    }
}

/// Decode the downloaded bytes and re-encode them as JPEG at `path`,
/// overwriting any previous file for the same prompt.
async fn save_as_jpeg(bytes: Vec<u8>, path: &Path) -> Result<()> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let img = image::load_from_memory(&bytes)?;
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
        rgb.save_with_format(&path, ImageFormat::Jpeg)?;
        Ok(())
    })
    .await
    .map_err(|e| Error::Generic(format!("Image save task join error: {}", e)))?
}
