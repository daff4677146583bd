//! Feature requests in, shaped results out. No policy lives here: each
//! feature is a prompt build plus one gateway or pipeline call, and failures
//! pass through untouched.

use crate::context::GatewayContext;
use crate::gateway::Feature;
use crate::generation::{GenerationRequest, GenerationResult};
use crate::pipeline::LogoResult;
use crate::prompts::{self, ContentType, PromptPair};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::info;

fn default_industry() -> String {
    "Technology".to_string()
}

fn default_tone() -> String {
    "Professional".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// One inbound request. Missing fields take the service defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "feature", rename_all = "snake_case")]
pub enum FeatureRequest {
    BrandNames {
        #[serde(default = "default_industry")]
        industry: String,
        #[serde(default)]
        keywords: String,
        #[serde(default = "default_tone")]
        tone: String,
        #[serde(default = "default_language")]
        language: String,
    },
    MarketingContent {
        #[serde(default)]
        brand_description: String,
        #[serde(default = "default_tone")]
        tone: String,
        #[serde(default)]
        content_type: ContentType,
        #[serde(default = "default_language")]
        language: String,
    },
    SentimentAnalysis {
        #[serde(default)]
        text: String,
        #[serde(default = "default_tone")]
        brand_tone: String,
    },
    ColorPalette {
        #[serde(default = "default_tone")]
        tone: String,
        #[serde(default = "default_industry")]
        industry: String,
    },
    Chat {
        #[serde(default)]
        message: String,
    },
    LogoPrompt {
        #[serde(default)]
        brand_name: String,
        #[serde(default = "default_industry")]
        industry: String,
        #[serde(default)]
        keywords: String,
    },
    LogoImage {
        #[serde(default)]
        brand_name: String,
        #[serde(default = "default_industry")]
        industry: String,
        #[serde(default)]
        keywords: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FeatureResult {
    Text {
        feature: Feature,
        result: GenerationResult,
    },
    Logo(LogoResult),
}

/// Wire shape handed to the outer boundary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl FeatureResponse {
    /// Generation failures still render as data, so the caller can show them.
    pub fn from_result(result: &FeatureResult) -> Self {
        let data = match result {
            FeatureResult::Text {
                feature: Feature::Chat,
                result,
            } => json!({ "content": result.display_text() }),
            FeatureResult::Text { result, .. } => Value::String(result.display_text()),
            FeatureResult::Logo(logo) => json!({
                "logo_prompt": logo.prompt_text,
                "image_url": logo.image_url,
                "image_generated": logo.image_generated,
                "image_error": logo.image_error,
            }),
        };
        Self {
            success: true,
            data: Some(data),
            detail: None,
        }
    }

    /// Last-resort response for failures outside the normal contract.
    pub fn service_failure(detail: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Clone)]
pub struct FeatureOrchestrator {
    context: Arc<GatewayContext>,
}

impl FeatureOrchestrator {
    pub fn new(context: Arc<GatewayContext>) -> Self {
        Self { context }
    }

    pub async fn handle(&self, request: FeatureRequest) -> FeatureResult {
        match request {
            FeatureRequest::BrandNames {
                industry,
                keywords,
                tone,
                language,
            } => {
                self.text(
                    Feature::BrandNames,
                    prompts::brand_names(&industry, &keywords, &tone, &language),
                )
                .await
            }
            FeatureRequest::MarketingContent {
                brand_description,
                tone,
                content_type,
                language,
            } => {
                self.text(
                    Feature::MarketingContent,
                    prompts::marketing_content(&brand_description, &tone, content_type, &language),
                )
                .await
            }
            FeatureRequest::SentimentAnalysis { text, brand_tone } => {
                self.text(
                    Feature::SentimentAnalysis,
                    prompts::sentiment_analysis(&text, &brand_tone),
                )
                .await
            }
            FeatureRequest::ColorPalette { tone, industry } => {
                self.text(Feature::ColorPalette, prompts::color_palette(&tone, &industry))
                    .await
            }
            FeatureRequest::Chat { message } => {
                self.text(Feature::Chat, prompts::chat(&message)).await
            }
            FeatureRequest::LogoPrompt {
                brand_name,
                industry,
                keywords,
            } => {
                let result = self
                    .context
                    .pipeline
                    .build_logo_prompt(&self.context.gateway, &brand_name, &industry, &keywords)
                    .await;
                FeatureResult::Text {
                    feature: Feature::LogoPrompt,
                    result,
                }
            }
            FeatureRequest::LogoImage {
                brand_name,
                industry,
                keywords,
            } => {
                info!(brand = %brand_name, "generating logo");
                let logo = self
                    .context
                    .pipeline
                    .generate_logo(&self.context.gateway, &brand_name, &industry, &keywords)
                    .await;
                FeatureResult::Logo(logo)
            }
        }
    }

    async fn text(&self, feature: Feature, pair: PromptPair) -> FeatureResult {
        let request = GenerationRequest::new(pair.prompt, feature.max_output_tokens())
            .with_system(pair.system)
            .with_temperature(feature.temperature());
        let result = self.context.gateway.dispatch(feature, request).await;
        FeatureResult::Text { feature, result }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_service_defaults() {
        let request: FeatureRequest =
            serde_json::from_str(r#"{"feature": "brand_names", "keywords": "ocean"}"#).unwrap();
        assert_eq!(
            request,
            FeatureRequest::BrandNames {
                industry: "Technology".to_string(),
                keywords: "ocean".to_string(),
                tone: "Professional".to_string(),
                language: "en".to_string(),
            }
        );

        let request: FeatureRequest =
            serde_json::from_str(r#"{"feature": "marketing_content"}"#).unwrap();
        assert!(matches!(
            request,
            FeatureRequest::MarketingContent {
                content_type: ContentType::ProductDescription,
                ..
            }
        ));
    }

    #[test]
    fn chat_response_wraps_content() {
        let result = FeatureResult::Text {
            feature: Feature::Chat,
            result: GenerationResult::ok("Try a shorter name."),
        };
        let response = serde_json::to_value(FeatureResponse::from_result(&result)).unwrap();
        assert_eq!(response["success"], true);
        assert_eq!(response["data"]["content"], "Try a shorter name.");
    }

    #[test]
    fn logo_response_keeps_null_url() {
        let result = FeatureResult::Logo(LogoResult {
            prompt_text: "A minimalist fox".to_string(),
            image_url: None,
            image_generated: false,
            image_error: Some("credential not configured".to_string()),
        });
        let response = serde_json::to_value(FeatureResponse::from_result(&result)).unwrap();
        assert!(response["data"]["image_url"].is_null());
        assert_eq!(response["data"]["image_generated"], false);
        assert_eq!(response["data"]["image_error"], "credential not configured");
    }
}
