//! Common error type and alias used across the crate.
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Transport-level failure talking to the WebUI.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The WebUI answered with a non-success status.
    #[error("{0}")]
    Api(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Configuration error: {0}")]
    Config(String),
}
