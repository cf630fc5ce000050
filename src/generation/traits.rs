use std::pin::Pin;

use async_trait::async_trait;
use futures::stream::Stream;

use crate::error::ChatError;

use super::request::{GenerationRequest, ModelInfo};

/// Raw text fragments as the runtime produces them, markers included.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ChatError>> + Send>>;

/// Reports whether a model runtime is reachable and has its model available.
#[async_trait]
pub trait HealthProvider: Send + Sync {
    async fn health_check(&self) -> Result<(), ChatError> {
        Err(ChatError::Generic(
            "health check not implemented for this generator".to_string(),
        ))
    }
}

/// A pretrained model behind some runtime.
#[async_trait]
pub trait TextGenerator: HealthProvider {
    fn info(&self) -> ModelInfo;

    /// Generates the whole completion, reasoning markers included.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, ChatError>;

    async fn generate_stream(
        &self,
        _request: &GenerationRequest,
    ) -> Result<FragmentStream, ChatError> {
        Err(ChatError::Generic(
            "Streaming not supported for this generator".to_string(),
        ))
    }
}
