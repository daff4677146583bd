//! Backend selection and fallback policy.
//!
//! Two tiers only. Every feature except chat goes straight to the remote
//! backend. Chat prefers the local model; when the model never loaded it is
//! served remotely under the default persona. A local decode failure is final.

use crate::backends::{LocalInferenceBackend, RemoteChatBackend};
use crate::generation::{DEFAULT_TEMPERATURE, GenerationRequest, GenerationResult};
use crate::prompts::DEFAULT_PERSONA_SYSTEM;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Text features the gateway can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    BrandNames,
    MarketingContent,
    SentimentAnalysis,
    ColorPalette,
    Chat,
    LogoPrompt,
}

impl Feature {
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::BrandNames => "brand_names",
            Feature::MarketingContent => "marketing_content",
            Feature::SentimentAnalysis => "sentiment_analysis",
            Feature::ColorPalette => "color_palette",
            Feature::Chat => "chat",
            Feature::LogoPrompt => "logo_prompt",
        }
    }

    pub fn max_output_tokens(&self) -> usize {
        match self {
            Feature::BrandNames | Feature::SentimentAnalysis => 600,
            Feature::MarketingContent | Feature::ColorPalette | Feature::LogoPrompt => 500,
            Feature::Chat => 300,
        }
    }

    pub fn temperature(&self) -> f64 {
        match self {
            Feature::Chat => 0.7,
            _ => DEFAULT_TEMPERATURE,
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which backend a dispatch will use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Remote,
    Local,
    RemoteFallback,
}

#[derive(Clone)]
pub struct TextGenerationGateway {
    remote: RemoteChatBackend,
    local: LocalInferenceBackend,
    // read once at construction; the handle never changes afterwards
    local_ready: bool,
}

impl TextGenerationGateway {
    pub fn new(remote: RemoteChatBackend, local: LocalInferenceBackend) -> Self {
        let local_ready = local.is_available();
        info!(
            local_ready,
            remote_configured = remote.is_configured(),
            "text generation gateway ready"
        );
        Self {
            remote,
            local,
            local_ready,
        }
    }

    pub fn route(&self, feature: Feature) -> Route {
        match feature {
            Feature::Chat if self.local_ready => Route::Local,
            Feature::Chat => Route::RemoteFallback,
            _ => Route::Remote,
        }
    }

    pub async fn dispatch(&self, feature: Feature, request: GenerationRequest) -> GenerationResult {
        let route = self.route(feature);
        debug!(%feature, ?route, "dispatching generation");
        match route {
            Route::Remote => self.remote.complete(&request).await,
            Route::Local => self.local.generate(&request).await,
            Route::RemoteFallback => {
                info!(%feature, "local model absent, serving from remote backend");
                // remote sampling applies, not the local chat temperature
                let request = request
                    .with_system(DEFAULT_PERSONA_SYSTEM)
                    .with_temperature(DEFAULT_TEMPERATURE);
                self.remote.complete(&request).await
            }
        }
    }
}
