use crate::error::Result;
use crate::generation::GenerationRequest;
use std::sync::Arc;
use tokio::sync::Mutex;

pub mod qwen3;

/// The core trait that any in-process model must implement.
///
/// `generate` is blocking and CPU-bound; callers run it off the async executor.
pub trait LLMBackend: Send {
    /// Generate only the newly produced text for the request.
    fn generate(&mut self, request: &GenerationRequest) -> Result<String>;
}

/// Process-wide local model state: fully loaded or fully absent.
///
/// The mutex is the single decode slot. `tokio::sync::Mutex` hands the lock
/// out in FIFO order, so queued callers are served in submission order.
#[derive(Clone)]
pub enum ModelHandle {
    Loaded(Arc<Mutex<Box<dyn LLMBackend>>>),
    Absent,
}

impl ModelHandle {
    pub fn loaded(model: Box<dyn LLMBackend>) -> Self {
        ModelHandle::Loaded(Arc::new(Mutex::new(model)))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelHandle::Loaded(_))
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelHandle::Loaded(_) => f.write_str("ModelHandle::Loaded"),
            ModelHandle::Absent => f.write_str("ModelHandle::Absent"),
        }
    }
}
