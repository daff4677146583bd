use thiserror::Error;

/// Brandsmith crate-specific Result type alias
pub type Result<T> = std::result::Result<T, GatewayError>;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Candle operation error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HF Hub API error: {0}")]
    HfHub(#[from] hf_hub::api::sync::ApiError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parsing error: {0}")]
    Json5(#[from] json5::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    // tokenizers::Error is a boxed dyn error, kept as text
    #[error("Tokenization error: {0}")]
    Tokenizer(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Inference task failed: {0}")]
    Task(String),
}
