//! Data models and structures
//!
//! Defines the core data structures for the game state, the chat and image
//! generation wire formats, and environment-driven configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// Chat completion API (OpenAI-compatible) request/response models
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub stream: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: Message,
    pub finish_reason: Option<String>,
}

/// One SSE frame of a streaming chat completion.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionChunk {
    pub choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
}

#[derive(Debug, Deserialize)]
pub struct ChunkDelta {
    pub content: Option<String>,
}

// Async image generation API request/response models
#[derive(Debug, Serialize)]
pub struct ImageTaskRequest {
    pub model: String,
    pub prompt: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct ImageTaskSubmitResponse {
    pub task_id: String,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "SUCCEED")]
    Succeed,
    #[serde(rename = "FAILED")]
    Failed,
    // Provider statuses we do not recognize are treated as still in-flight.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct ImageTaskStatusResponse {
    pub task_status: TaskStatus,
    #[serde(default)]
    pub output_images: Vec<String>,
    pub error_message: Option<String>,
}

// Game state exchanged with the front-end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicInfo {
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub mbti: String,
    #[serde(default)]
    pub zodiac: String,
    #[serde(default)]
    pub background: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageRecord {
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub choice: String,
    #[serde(default)]
    pub outcome: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub basic_info: BasicInfo,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub current_stage: usize,
    #[serde(default)]
    pub stages_data: Vec<StageRecord>,
}

/// A generated image as returned to the front-end: a URL path under
/// `/images/` plus a one-line caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub path: String,
    pub description: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub chat_model: String,
    pub image_model: String,
    pub images_dir: String,
    pub poll_interval: Duration,
    pub poll_max_attempts: u32,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("MODELSCOPE_KEY")
            .map_err(|_| crate::Error::Generic("MODELSCOPE_KEY not set".to_string()))?;

        let poll_interval_secs = std::env::var("POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3u64);
        let poll_max_attempts = std::env::var("POLL_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(100u32);

        Ok(Self {
            api_key,
            api_base_url: std::env::var("MODELSCOPE_BASE_URL")
                .unwrap_or_else(|_| "https://api-inference.modelscope.cn".to_string()),
            chat_model: std::env::var("CHAT_MODEL")
                .unwrap_or_else(|_| "Qwen/Qwen2.5-Coder-32B-Instruct".to_string()),
            image_model: std::env::var("IMAGE_MODEL")
                .unwrap_or_else(|_| "Qwen/Qwen-Image".to_string()),
            images_dir: std::env::var("IMAGES_DIR").unwrap_or_else(|_| "images".to_string()),
            poll_interval: Duration::from_secs(poll_interval_secs),
            poll_max_attempts,
        })
    }
}
