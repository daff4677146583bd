//! Prompt templates, one builder per feature.
//!
//! Every function here is pure: the same fields always produce the same
//! `PromptPair`. Field values are substituted as-is; length limits are the
//! caller's job.

use serde::{Deserialize, Serialize};

/// Persona the gateway substitutes when chat falls back to the remote backend.
pub const DEFAULT_PERSONA_SYSTEM: &str = "You are Brandsmith, an expert AI branding assistant. \
Give concise, actionable branding advice.";

const CHAT_SYSTEM: &str = "You are Brandsmith, an expert AI branding assistant running on a \
local model. You help startups and entrepreneurs with branding strategy, naming, identity, \
marketing, and business growth. Be concise, warm, and actionable.";

/// System instruction plus user prompt for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub prompt: String,
}

/// Kind of marketing copy requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    ProductDescription,
    SocialPost,
    Email,
    AdCopy,
    Tagline,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::ProductDescription => "product description",
            ContentType::SocialPost => "social media post (Instagram/LinkedIn)",
            ContentType::Email => "professional marketing email",
            ContentType::AdCopy => "advertisement copy",
            ContentType::Tagline => "brand tagline and slogan options",
        }
    }
}

pub fn brand_names(industry: &str, keywords: &str, tone: &str, language: &str) -> PromptPair {
    PromptPair {
        system: "You are Brandsmith, a creative AI branding expert. Generate unique, memorable, \
                 brand-ready names. Be creative and original."
            .to_string(),
        prompt: format!(
            "Generate 10 unique brand name suggestions for a {tone} {industry} brand. \
             Keywords/themes: {keywords}. \
             For each name, provide: the name in bold, a one-line tagline, and why it works. \
             Format as a numbered list. Language: {language}.",
            tone = tone.to_lowercase(),
        ),
    }
}

pub fn marketing_content(
    brand_description: &str,
    tone: &str,
    content_type: ContentType,
    language: &str,
) -> PromptPair {
    PromptPair {
        system: "You are Brandsmith, an expert marketing copywriter. Create compelling, \
                 on-brand marketing content that converts."
            .to_string(),
        prompt: format!(
            "Create a {tone}-toned {label} for this brand: '{brand_description}'. \
             Make it engaging, authentic, and persuasive. Language: {language}.",
            tone = tone.to_lowercase(),
            label = content_type.label(),
        ),
    }
}

/// Always asks for exactly five labeled sections.
pub fn sentiment_analysis(text: &str, brand_tone: &str) -> PromptPair {
    PromptPair {
        system: "You are Brandsmith, an expert in brand communication and sentiment analysis. \
                 Provide structured, actionable insights."
            .to_string(),
        prompt: format!(
            "Analyze this customer review/text and provide:\n\
             1. **Overall Sentiment**: (Positive/Neutral/Negative) with confidence %\n\
             2. **Key Points Mentioned**: bullet list\n\
             3. **Emotional Tone**: description\n\
             4. **Brand Tone Alignment**: how well it aligns with '{brand_tone}' brand tone\n\
             5. **Professional Rewrite**: rewrite it in a professional, polished tone\n\n\
             Text to analyze:\n\"{text}\""
        ),
    }
}

/// Always asks for exactly seven labeled fields, colors as HEX codes.
pub fn color_palette(tone: &str, industry: &str) -> PromptPair {
    PromptPair {
        system: "You are Brandsmith, a professional brand identity designer. \
                 Provide specific, actionable color recommendations."
            .to_string(),
        prompt: format!(
            "Create a complete brand color palette for a {tone} {industry} brand. Provide:\n\
             1. **Primary Color**: HEX code + name + why it works\n\
             2. **Secondary Color**: HEX code + name + usage\n\
             3. **Accent Color**: HEX code + name + usage\n\
             4. **Background Color**: HEX code\n\
             5. **Text Color**: HEX code\n\
             6. **Font Pairing**: recommended heading + body font\n\
             7. **Overall Mood**: 2-sentence description\n\
             Format clearly with HEX codes prominently displayed.",
            tone = tone.to_lowercase(),
        ),
    }
}

pub fn chat(message: &str) -> PromptPair {
    PromptPair {
        system: CHAT_SYSTEM.to_string(),
        prompt: format!("User question: {message}"),
    }
}

pub fn logo_prompt(brand_name: &str, industry: &str, keywords: &str) -> PromptPair {
    PromptPair {
        system: "You are Brandsmith, an expert brand designer. Generate professional, \
                 detailed logo prompts suitable for AI image generation."
            .to_string(),
        prompt: format!(
            "Create a detailed, professional logo generation prompt for:\n\
             - Brand Name: {brand_name}\n\
             - Industry: {industry}\n\
             - Keywords/Style: {keywords}\n\n\
             Provide:\n\
             1. **Logo Concept**: detailed description of the logo design\n\
             2. **Image Generation Prompt**: ready-to-use text-to-image prompt\n\
             3. **Style Notes**: colors, typography, iconography guidance\n\
             4. **Logo Variations**: suggest 2-3 alternative concepts"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_sections(prompt: &str) -> usize {
        prompt
            .lines()
            .filter(|line| {
                line.split_once(". **")
                    .is_some_and(|(n, _)| n.chars().all(|c| c.is_ascii_digit()))
            })
            .count()
    }

    #[test]
    fn identical_fields_produce_identical_prompts() {
        let a = brand_names("Coffee", "bold, urban", "Playful", "en");
        let b = brand_names("Coffee", "bold, urban", "Playful", "en");
        assert_eq!(a, b);

        let a = marketing_content("Solar roofing", "Warm", ContentType::Email, "fr");
        let b = marketing_content("Solar roofing", "Warm", ContentType::Email, "fr");
        assert_eq!(a, b);
    }

    #[test]
    fn sentiment_requests_five_sections() {
        let pair = sentiment_analysis("Loved the service!", "Friendly");
        assert_eq!(numbered_sections(&pair.prompt), 5);
        assert!(pair.prompt.contains("'Friendly' brand tone"));
        assert!(pair.prompt.ends_with("\"Loved the service!\""));
    }

    #[test]
    fn palette_requests_seven_fields_with_hex() {
        let pair = color_palette("Luxury", "Fashion");
        assert_eq!(numbered_sections(&pair.prompt), 7);
        assert!(pair.prompt.contains("luxury Fashion brand"));
        assert!(pair.prompt.contains("HEX codes prominently"));
    }

    #[test]
    fn content_type_label_is_substituted() {
        let pair = marketing_content("Eco bottles", "Bold", ContentType::AdCopy, "en");
        assert!(pair.prompt.contains("bold-toned advertisement copy"));
    }

    #[test]
    fn fields_are_not_escaped() {
        let pair = chat("what about {braces} and 'quotes'?");
        assert_eq!(pair.prompt, "User question: what about {braces} and 'quotes'?");
    }

    #[test]
    fn content_type_parses_snake_case() {
        let parsed: ContentType = serde_json::from_str("\"social_post\"").unwrap();
        assert_eq!(parsed, ContentType::SocialPost);
    }
}
