use super::LLMBackend;
use crate::config::LocalModelConfig;
use crate::error::{GatewayError, Result};
use crate::generation::GenerationRequest;

use candle_core::{Device, Tensor};
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::quantized_qwen3::ModelWeights as Qwen3;
use hf_hub::api::sync::ApiBuilder;
use tokenizers::Tokenizer;
use tracing::debug;

const STOP_TOKENS: [&str; 2] = ["<|im_end|>", "<|endoftext|>"];

/// Quantized Qwen3 running on the CPU.
pub struct CandleQwen {
    model: Qwen3,
    tokenizer: Tokenizer,
    device: Device,
    stop_ids: Vec<u32>,
    max_input_tokens: usize,
    max_new_tokens: usize,
    seed: Option<u64>,
}

impl CandleQwen {
    pub fn load(config: &LocalModelConfig) -> Result<Self> {
        let device = Device::Cpu;
        //huggingface api
        let api = ApiBuilder::new()
            .with_token(config.hf_token.clone())
            .build()?;

        //tokenizer
        let tokenizer_path = api
            .model(config.tokenizer_repo.clone())
            .get("tokenizer.json")?;
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| GatewayError::Tokenizer(e.to_string()))?;

        //model
        let model_path = api.model(config.repo.clone()).get(&config.model_file)?;
        let mut file = std::fs::File::open(&model_path)?;
        let content = candle_core::quantized::gguf_file::Content::read(&mut file)?;
        let model = Qwen3::from_gguf(content, &mut file, &device)?;

        let stop_ids = STOP_TOKENS
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token))
            .collect();

        Ok(Self {
            model,
            tokenizer,
            device,
            stop_ids,
            max_input_tokens: config.max_input_tokens,
            max_new_tokens: config.max_new_tokens,
            seed: config.seed,
        })
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .tokenizer
            .encode(text, false)
            .map_err(|e| GatewayError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_ids().to_vec())
    }

    fn decode(&self, ids: &[u32]) -> Result<String> {
        self.tokenizer
            .decode(ids, true)
            .map_err(|e| GatewayError::Tokenizer(e.to_string()))
    }
}

impl LLMBackend for CandleQwen {
    fn generate(&mut self, request: &GenerationRequest) -> Result<String> {
        self.model.clear_kv_cache();

        let parts = ChatmlParts::new(request);
        let prompt_ids = fit_prompt(
            &self.encode(&parts.head)?,
            &self.encode(parts.content)?,
            &self.encode(parts.tail)?,
            self.max_input_tokens,
        );
        if prompt_ids.is_empty() {
            return Err(GatewayError::Tokenizer("prompt encoded to no tokens".to_string()));
        }

        let seed = self.seed.unwrap_or_else(rand::random);
        let mut logits_processor =
            LogitsProcessor::new(seed, Some(request.temperature), Some(request.top_p));
        let budget = request.max_output_tokens.min(self.max_new_tokens);

        let mut generated = Vec::with_capacity(budget);
        let mut input = Tensor::new(prompt_ids.as_slice(), &self.device)?.unsqueeze(0)?;
        let mut pos = 0;

        for _ in 0..budget {
            let logits = self.model.forward(&input, pos)?;
            let logits = logits.squeeze(0)?;
            let next_token = logits_processor.sample(&logits)?;

            if self.stop_ids.contains(&next_token) {
                break;
            }
            generated.push(next_token);

            let (_b, seq_len) = input.dims2()?;
            pos += seq_len;
            input = Tensor::new(&[next_token], &self.device)?.unsqueeze(0)?;
        }
        debug!(
            prompt_tokens = prompt_ids.len(),
            new_tokens = generated.len(),
            "local decode finished"
        );

        let echoed = self.decode(&prompt_ids)?;
        let mut full_ids = prompt_ids;
        full_ids.extend_from_slice(&generated);
        let full = self.decode(&full_ids)?;

        Ok(strip_echo(&full, &echoed))
    }
}

const ASSISTANT_TAIL: &str = "<|im_end|>\n<|im_start|>assistant\n";

/// Qwen chat template split around the user content: optional system turn
/// and the opening of the user turn, the content, then the close of the user
/// turn and the open assistant turn.
pub struct ChatmlParts<'a> {
    pub head: String,
    pub content: &'a str,
    pub tail: &'static str,
}

impl<'a> ChatmlParts<'a> {
    pub fn new(request: &'a GenerationRequest) -> Self {
        let mut head = String::new();
        if let Some(system) = &request.system_text {
            head.push_str(&format!("<|im_start|>system\n{}<|im_end|>\n", system));
        }
        head.push_str("<|im_start|>user\n");
        Self {
            head,
            content: &request.prompt_text,
            tail: ASSISTANT_TAIL,
        }
    }

    pub fn render(&self) -> String {
        format!("{}{}{}", self.head, self.content, self.tail)
    }
}

/// Joins the template and content ids, cutting only the content so the
/// sequence fits `max_tokens`. The template is never cut: if it alone
/// exceeds the limit the content is dropped and the template kept whole.
pub fn fit_prompt(head: &[u32], content: &[u32], tail: &[u32], max_tokens: usize) -> Vec<u32> {
    let budget = max_tokens.saturating_sub(head.len() + tail.len());
    let kept = &content[..content.len().min(budget)];

    let mut ids = Vec::with_capacity(head.len() + kept.len() + tail.len());
    ids.extend_from_slice(head);
    ids.extend_from_slice(kept);
    ids.extend_from_slice(tail);
    ids
}

/// Drops the decoded prompt from the front of the decoded sequence.
/// Falls back to the whole text when nothing new remains.
pub fn strip_echo(full: &str, prompt: &str) -> String {
    match full.strip_prefix(prompt).map(str::trim) {
        Some(rest) if !rest.is_empty() => rest.to_string(),
        _ => full.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_echo_returns_only_new_text() {
        assert_eq!(
            strip_echo("User question: hi\n  Hello there! ", "User question: hi"),
            "Hello there!"
        );
    }

    #[test]
    fn strip_echo_keeps_full_text_when_prefix_differs() {
        assert_eq!(strip_echo("  normalized output ", "original"), "normalized output");
    }

    #[test]
    fn strip_echo_falls_back_when_nothing_new() {
        assert_eq!(strip_echo("same ", "same "), "same");
    }

    #[test]
    fn chatml_includes_system_turn_only_when_present() {
        let request = GenerationRequest::new("User question: hi", 300);
        let rendered = ChatmlParts::new(&request).render();
        assert!(!rendered.contains("system"));
        assert!(rendered.ends_with("<|im_start|>assistant\n"));

        let rendered = ChatmlParts::new(&request.with_system("Be brief.")).render();
        assert!(rendered.starts_with("<|im_start|>system\nBe brief.<|im_end|>\n"));
    }

    #[test]
    fn over_long_content_is_cut_before_the_assistant_header() {
        let head = [1, 2, 3];
        let content: Vec<u32> = (100..700).collect();
        let tail = [7, 8, 9, 10];

        let ids = fit_prompt(&head, &content, &tail, 512);
        assert_eq!(ids.len(), 512);
        assert_eq!(&ids[..3], &head);
        assert_eq!(&ids[ids.len() - 4..], &tail);
        assert_eq!(&ids[3..ids.len() - 4], &content[..505]);
    }

    #[test]
    fn short_prompt_is_kept_whole() {
        let ids = fit_prompt(&[1], &[5, 6], &[9], 512);
        assert_eq!(ids, vec![1, 5, 6, 9]);
    }

    #[test]
    fn template_survives_even_without_room_for_content() {
        let ids = fit_prompt(&[1, 2, 3], &[5, 6], &[8, 9], 4);
        assert_eq!(ids, vec![1, 2, 3, 8, 9]);
    }

    #[test]
    fn over_long_message_still_renders_the_assistant_turn() {
        let request = GenerationRequest::new(format!("User question: {}", "word ".repeat(2000)), 300)
            .with_system("persona");
        let parts = ChatmlParts::new(&request);
        assert!(parts.head.ends_with("<|im_start|>user\n"));
        assert_eq!(parts.content, request.prompt_text);
        assert!(parts.render().ends_with("<|im_end|>\n<|im_start|>assistant\n"));
    }
}
