//! Two-stage logo flow: logo prompt text from the gateway, then one call to
//! the image-synthesis endpoint whose bytes are persisted as an artifact.

use crate::backends::remote::{ERROR_BODY_CHARS, truncate_chars};
use crate::config::{ArtifactConfig, BackendCredentials};
use crate::error::Result;
use crate::gateway::{Feature, TextGenerationGateway};
use crate::generation::{GenerationRequest, GenerationResult};
use crate::prompts;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};

pub const MISSING_IMAGE_KEY: &str = "credential not configured";

const ARTIFACT_PREFIX: &str = "logo_";
const STYLE_SUFFIX: &str = "Modern minimalist vector design, clean lines, white background, \
high quality, professional branding.";

/// A persisted synthesis output. Never mutated or deleted here.
#[derive(Debug, Clone)]
pub struct ImageArtifact {
    pub source_prompt: String,
    pub enhanced_prompt: String,
    pub bytes: Vec<u8>,
    /// Location under the artifact directory, never absolute.
    pub relative_path: PathBuf,
    pub url: String,
}

#[derive(Debug, Clone, Default)]
pub struct SynthesisOutcome {
    pub success: bool,
    pub url: Option<String>,
    pub error: Option<String>,
    pub artifact: Option<ImageArtifact>,
}

impl SynthesisOutcome {
    fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Structured result of the full logo flow.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogoResult {
    pub prompt_text: String,
    pub image_url: Option<String>,
    pub image_generated: bool,
    pub image_error: Option<String>,
}

#[derive(Serialize)]
struct SynthesisRequest<'a> {
    inputs: &'a str,
}

#[derive(Clone)]
pub struct ImageArtifactPipeline {
    http: reqwest::Client,
    api_key: Option<String>,
    endpoint: String,
    timeout: Duration,
    artifacts: ArtifactConfig,
}

impl ImageArtifactPipeline {
    pub fn new(
        http: reqwest::Client,
        credentials: &BackendCredentials,
        artifacts: &ArtifactConfig,
    ) -> Self {
        Self {
            http,
            api_key: credentials.image_api_key.clone(),
            endpoint: credentials.image_endpoint.clone(),
            timeout: Duration::from_secs(credentials.image_timeout_secs),
            artifacts: artifacts.clone(),
        }
    }

    /// Stage 1: logo prompt text, always via the remote tier.
    pub async fn build_logo_prompt(
        &self,
        gateway: &TextGenerationGateway,
        brand_name: &str,
        industry: &str,
        keywords: &str,
    ) -> GenerationResult {
        let pair = prompts::logo_prompt(brand_name, industry, keywords);
        let request = GenerationRequest::new(pair.prompt, Feature::LogoPrompt.max_output_tokens())
            .with_system(pair.system)
            .with_temperature(Feature::LogoPrompt.temperature());
        gateway.dispatch(Feature::LogoPrompt, request).await
    }

    /// Both stages. A failed stage 1 skips synthesis but still yields a result.
    pub async fn generate_logo(
        &self,
        gateway: &TextGenerationGateway,
        brand_name: &str,
        industry: &str,
        keywords: &str,
    ) -> LogoResult {
        let prompt = self
            .build_logo_prompt(gateway, brand_name, industry, keywords)
            .await;
        if !prompt.success {
            warn!("logo prompt unavailable, skipping image synthesis");
            return LogoResult {
                prompt_text: prompt.display_text(),
                image_url: None,
                image_generated: false,
                image_error: Some(format!("logo prompt unavailable: {}", prompt.error_detail)),
            };
        }

        let outcome = self.synthesize(&prompt.text).await;
        LogoResult {
            prompt_text: prompt.text,
            image_url: outcome.url,
            image_generated: outcome.success,
            image_error: outcome.error,
        }
    }

    /// Stage 2: one POST, no retry.
    pub async fn synthesize(&self, text_prompt: &str) -> SynthesisOutcome {
        let Some(api_key) = &self.api_key else {
            warn!("image synthesis requested without a credential");
            return SynthesisOutcome::failed(MISSING_IMAGE_KEY);
        };

        let enhanced = enhance_prompt(text_prompt);
        debug!(endpoint = %self.endpoint, "requesting image synthesis");

        let response = match self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .timeout(self.timeout)
            .json(&SynthesisRequest { inputs: &enhanced })
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                error!("image synthesis transport error: {}", e);
                return SynthesisOutcome::failed(e.to_string());
            }
        };

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "image synthesis rejected by provider");
            return SynthesisOutcome::failed(format!(
                "image synthesis failed with status {}: {}",
                status.as_u16(),
                truncate_chars(&body, ERROR_BODY_CHARS)
            ));
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                error!("image synthesis body could not be read: {}", e);
                return SynthesisOutcome::failed(e.to_string());
            }
        };

        match self.persist(&bytes).await {
            Ok((relative_path, url)) => {
                info!(url = %url, size = bytes.len(), "logo artifact written");
                SynthesisOutcome {
                    success: true,
                    url: Some(url.clone()),
                    error: None,
                    artifact: Some(ImageArtifact {
                        source_prompt: text_prompt.to_string(),
                        enhanced_prompt: enhanced,
                        bytes,
                        relative_path,
                        url,
                    }),
                }
            }
            Err(e) => {
                error!("logo artifact could not be written: {}", e);
                SynthesisOutcome::failed(e.to_string())
            }
        }
    }

    /// The single persistence path: create the directory on demand, then
    /// write to a fresh name that must not exist yet. Returns the path
    /// relative to the artifact directory and the public URL.
    async fn persist(&self, bytes: &[u8]) -> Result<(PathBuf, String)> {
        tokio::fs::create_dir_all(&self.artifacts.directory).await?;
        let name = artifact_name(unix_seconds());
        let path = self.artifacts.directory.join(&name);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await?;

        Ok((PathBuf::from(&name), artifact_url(&self.artifacts.url_prefix, &name)))
    }
}

pub fn enhance_prompt(text_prompt: &str) -> String {
    format!("Professional brand logo: {text_prompt}. {STYLE_SUFFIX}")
}

/// `logo_<unix-seconds>_<8 hex>.png`; the random part keeps two artifacts
/// written within the same second apart.
pub fn artifact_name(unix_seconds: u64) -> String {
    format!(
        "{ARTIFACT_PREFIX}{unix_seconds}_{:08x}.png",
        rand::random::<u32>()
    )
}

fn artifact_url(prefix: &str, name: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), name)
}

fn unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
