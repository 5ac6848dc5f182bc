//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Invalid stage index: {0}")]
    InvalidStage(usize),

    #[error("Image generation failed: {0}")]
    TaskFailed(String),

    #[error("Image task still pending after {0} poll attempts")]
    PollTimeout(u32),

    #[error("Image task polling was cancelled")]
    Cancelled,

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Generic error: {0}")]
    Generic(String),
}

pub type Result<T> = std::result::Result<T, Error>;
