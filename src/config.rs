//! Startup configuration: credentials, local model selection, artifact layout.
//!
//! Resolved once (file, then environment) and never mutated afterwards.

use crate::error::{GatewayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const DEFAULT_CHAT_ENDPOINT: &str = "https://api.groq.com/openai/v1/chat/completions";
const DEFAULT_CHAT_MODEL: &str = "llama-3.3-70b-versatile";
const DEFAULT_IMAGE_ENDPOINT: &str =
    "https://router.huggingface.co/hf-inference/models/stabilityai/stable-diffusion-xl-base-1.0";
const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub credentials: BackendCredentials,
    pub local: LocalModelConfig,
    pub artifacts: ArtifactConfig,
}

/// API keys, model ids and endpoints for the hosted backends.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendCredentials {
    pub chat_api_key: Option<String>,
    pub chat_model: String,
    pub chat_endpoint: String,
    pub image_api_key: Option<String>,
    pub image_endpoint: String,
    pub image_timeout_secs: u64,
}

impl Default for BackendCredentials {
    fn default() -> Self {
        Self {
            chat_api_key: None,
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            chat_endpoint: DEFAULT_CHAT_ENDPOINT.to_string(),
            image_api_key: None,
            image_endpoint: DEFAULT_IMAGE_ENDPOINT.to_string(),
            image_timeout_secs: DEFAULT_IMAGE_TIMEOUT_SECS,
        }
    }
}

// Keys must never reach the logs.
impl fmt::Debug for BackendCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(key: &Option<String>) -> &'static str {
            if key.is_some() { "<set>" } else { "<unset>" }
        }
        f.debug_struct("BackendCredentials")
            .field("chat_api_key", &redact(&self.chat_api_key))
            .field("chat_model", &self.chat_model)
            .field("chat_endpoint", &self.chat_endpoint)
            .field("image_api_key", &redact(&self.image_api_key))
            .field("image_endpoint", &self.image_endpoint)
            .field("image_timeout_secs", &self.image_timeout_secs)
            .finish()
    }
}

/// Which GGUF model the local backend loads, and its decoding limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalModelConfig {
    pub enabled: bool,
    pub repo: String,
    pub model_file: String,
    pub tokenizer_repo: String,
    pub hf_token: Option<String>,
    pub max_input_tokens: usize,
    pub max_new_tokens: usize,
    /// Fixed sampling seed; a fresh random seed per decode when unset.
    pub seed: Option<u64>,
}

impl Default for LocalModelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            repo: "unsloth/Qwen3-0.6B-GGUF".to_string(),
            model_file: "Qwen3-0.6B-Q4_K_M.gguf".to_string(),
            tokenizer_repo: "Qwen/Qwen3-0.6B".to_string(),
            hf_token: None,
            max_input_tokens: 512,
            max_new_tokens: 300,
            seed: None,
        }
    }
}

/// Where generated images are written and how they are addressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    pub directory: PathBuf,
    pub url_prefix: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("static/generated_logos"),
            url_prefix: "/static/generated_logos".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Reads an optional JSON5 file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_json5(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_json5(source: &str) -> Result<Self> {
        Ok(json5::from_str(source)?)
    }

    /// Applies `GROQ_*`, `HF_API_KEY`, `LOCAL_*` and `ARTIFACTS_DIR` overrides
    /// from `lookup`. Empty values count as unset.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("GROQ_API_KEY") {
            self.credentials.chat_api_key = Some(key);
        }
        if let Some(model) = get("GROQ_MODEL") {
            self.credentials.chat_model = model;
        }
        if let Some(key) = get("HF_API_KEY") {
            self.credentials.image_api_key = Some(key.clone());
            self.local.hf_token = Some(key);
        }
        if let Some(repo) = get("LOCAL_MODEL_REPO") {
            self.local.repo = repo;
        }
        if let Some(file) = get("LOCAL_MODEL_FILE") {
            self.local.model_file = file;
        }
        if let Some(repo) = get("LOCAL_TOKENIZER_REPO") {
            self.local.tokenizer_repo = repo;
        }
        if let Some(enabled) = get("LOCAL_MODEL_ENABLED") {
            self.local.enabled = !matches!(enabled.as_str(), "0" | "false" | "no" | "off");
        }
        if let Some(dir) = get("ARTIFACTS_DIR") {
            self.artifacts.directory = PathBuf::from(dir);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.credentials.image_timeout_secs == 0 {
            return Err(GatewayError::Config(
                "image_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.local.max_input_tokens == 0 || self.local.max_new_tokens == 0 {
            return Err(GatewayError::Config(
                "local token limits must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
