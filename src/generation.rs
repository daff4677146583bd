//! Request and result values shared by every backend.
//!
//! Failures are data here, not errors: a `GenerationResult` with
//! `success == false` is an ordinary return value that callers can render.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sampling defaults used by the remote chat backend.
pub const DEFAULT_TEMPERATURE: f64 = 0.8;
pub const DEFAULT_TOP_P: f64 = 0.95;

/// One generation call. Built fresh per request and never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt_text: String,
    pub system_text: Option<String>,
    pub max_output_tokens: usize,
    pub temperature: f64,
    pub top_p: f64,
}

impl GenerationRequest {
    pub fn new(prompt_text: impl Into<String>, max_output_tokens: usize) -> Self {
        Self {
            prompt_text: prompt_text.into(),
            system_text: None,
            max_output_tokens,
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
        }
    }

    pub fn with_system(mut self, system_text: impl Into<String>) -> Self {
        let system_text = system_text.into();
        self.system_text = if system_text.is_empty() {
            None
        } else {
            Some(system_text)
        };
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Failure taxonomy carried inside a failed `GenerationResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// A required credential is absent; no network call was made.
    ConfigurationError,
    /// The HTTP client failed (connect, timeout, undecodable body).
    TransportError,
    /// The upstream answered with a non-success status.
    ProviderError,
    /// Local decoding failed.
    InferenceError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::ConfigurationError => "configuration error",
            ErrorKind::TransportError => "transport error",
            ErrorKind::ProviderError => "provider error",
            ErrorKind::InferenceError => "inference error",
        };
        f.write_str(name)
    }
}

/// Tagged outcome of one generation call.
///
/// Exactly one of `text` (success) or `error_detail` (failure) is meaningful;
/// the other is always the empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    pub text: String,
    pub error_kind: Option<ErrorKind>,
    pub error_detail: String,
}

impl GenerationResult {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            success: true,
            text: text.into(),
            error_kind: None,
            error_detail: String::new(),
        }
    }

    pub fn failure(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            text: String::new(),
            error_kind: Some(kind),
            error_detail: detail.into(),
        }
    }

    /// Text a caller can always show: the generation on success, otherwise
    /// a short description of what went wrong.
    pub fn display_text(&self) -> String {
        match self.error_kind {
            Some(kind) if !self.success => format!("Error ({}): {}", kind, self.error_detail),
            _ => self.text.clone(),
        }
    }
}
