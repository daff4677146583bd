//! In-process backend over the shared `ModelHandle`.

use crate::config::LocalModelConfig;
use crate::error::{GatewayError, Result};
use crate::generation::{ErrorKind, GenerationRequest, GenerationResult};
use crate::models::qwen3::CandleQwen;
use crate::models::{LLMBackend, ModelHandle};
use tracing::{debug, error, info};

pub const LOCAL_UNAVAILABLE: &str = "local model is not loaded";

#[derive(Clone, Debug)]
pub struct LocalInferenceBackend {
    handle: ModelHandle,
}

impl LocalInferenceBackend {
    /// Loads the configured model once at startup. Failure is logged and
    /// leaves the backend permanently absent; it is never raised.
    ///
    /// Blocking (downloads and reads weights); run it on a blocking thread.
    pub fn initialize(config: &LocalModelConfig) -> Self {
        if !config.enabled {
            info!("local model disabled by configuration");
            return Self::absent();
        }
        match load_handle(config) {
            Ok(handle) => {
                info!(repo = %config.repo, file = %config.model_file, "local model loaded");
                Self { handle }
            }
            Err(e) => {
                error!(repo = %config.repo, "local model load failed: {}", e);
                Self::absent()
            }
        }
    }

    pub fn absent() -> Self {
        Self {
            handle: ModelHandle::Absent,
        }
    }

    pub fn from_model(model: Box<dyn LLMBackend>) -> Self {
        Self {
            handle: ModelHandle::loaded(model),
        }
    }

    pub fn is_available(&self) -> bool {
        self.handle.is_loaded()
    }

    /// Runs one decode. Decodes are serialized through the handle's single
    /// slot; waiting callers are served in arrival order.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let ModelHandle::Loaded(model) = &self.handle else {
            return GenerationResult::failure(ErrorKind::InferenceError, LOCAL_UNAVAILABLE);
        };

        let mut slot = model.clone().lock_owned().await;
        debug!("local decode slot acquired");
        let request = request.clone();

        // the guard moves into the blocking task, so the slot stays held
        // until the decode finishes even if this future is dropped
        let outcome = tokio::task::spawn_blocking(move || slot.generate(&request))
            .await
            .map_err(|e| GatewayError::Task(e.to_string()));

        match outcome {
            Ok(Ok(text)) => GenerationResult::ok(text),
            Ok(Err(e)) | Err(e) => {
                error!("local decode failed: {}", e);
                GenerationResult::failure(ErrorKind::InferenceError, e.to_string())
            }
        }
    }
}

fn load_handle(config: &LocalModelConfig) -> Result<ModelHandle> {
    let model = CandleQwen::load(config)?;
    Ok(ModelHandle::loaded(Box::new(model)))
}
