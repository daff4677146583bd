pub mod backends;
pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod generation;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod prompts;

pub use backends::{LocalInferenceBackend, RemoteChatBackend};
pub use config::{ArtifactConfig, BackendCredentials, GatewayConfig, LocalModelConfig};
pub use context::GatewayContext;
pub use error::{GatewayError, Result};
pub use gateway::{Feature, TextGenerationGateway};
pub use generation::{ErrorKind, GenerationRequest, GenerationResult};
pub use models::{LLMBackend, ModelHandle};
pub use orchestrator::{FeatureOrchestrator, FeatureRequest, FeatureResponse, FeatureResult};
pub use pipeline::{ImageArtifact, ImageArtifactPipeline, LogoResult, SynthesisOutcome};
