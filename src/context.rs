//! Everything resolved at process start, built once and shared read-only.

use crate::backends::{LocalInferenceBackend, RemoteChatBackend};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, Result};
use crate::gateway::TextGenerationGateway;
use crate::pipeline::ImageArtifactPipeline;
use tracing::info;

pub struct GatewayContext {
    pub config: GatewayConfig,
    pub gateway: TextGenerationGateway,
    pub pipeline: ImageArtifactPipeline,
}

impl GatewayContext {
    /// Loads the local model (on a blocking thread) and wires the backends.
    pub async fn initialize(config: GatewayConfig) -> Result<Self> {
        let local_config = config.local.clone();
        let local = tokio::task::spawn_blocking(move || {
            LocalInferenceBackend::initialize(&local_config)
        })
        .await
        .map_err(|e| GatewayError::Task(e.to_string()))?;

        let http = reqwest::Client::builder().build()?;
        Ok(Self::assemble(config, http, local))
    }

    /// Wires an already-initialized local backend; no I/O.
    pub fn assemble(
        config: GatewayConfig,
        http: reqwest::Client,
        local: LocalInferenceBackend,
    ) -> Self {
        info!(credentials = ?config.credentials, "assembling gateway context");
        let remote = RemoteChatBackend::new(http.clone(), &config.credentials);
        let gateway = TextGenerationGateway::new(remote, local);
        let pipeline = ImageArtifactPipeline::new(http, &config.credentials, &config.artifacts);
        Self {
            config,
            gateway,
            pipeline,
        }
    }
}
