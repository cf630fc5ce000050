//! HTTP surface of the inference service.

#[path = "inference/handlers.rs"]
mod handlers;

#[path = "inference/types.rs"]
mod types;


use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::generation::{SamplingParams, TextGenerator, DEFAULT_MAX_TOKENS};

pub use types::{
    HealthResponse, HealthStatus, ModelResponse, QuestionRequest, QuestionResponse, ServiceInfo,
};

/// Per-request knobs resolved from configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceSettings {
    pub default_max_tokens: u32,
    pub stream_buffer: usize,
    pub sampling: SamplingParams,
}

impl Default for InferenceSettings {
    fn default() -> Self {
        Self {
            default_max_tokens: DEFAULT_MAX_TOKENS,
            stream_buffer: 32,
            sampling: SamplingParams::default(),
        }
    }
}

#[derive(Clone)]
pub struct InferenceState {
    pub generator: Arc<dyn TextGenerator>,
    pub settings: Arc<InferenceSettings>,
}

impl InferenceState {
    pub fn new(generator: Arc<dyn TextGenerator>, settings: InferenceSettings) -> Self {
        Self {
            generator,
            settings: Arc::new(settings),
        }
    }
}

pub fn router(state: InferenceState) -> Router {
    Router::new()
        .route("/", get(handlers::service_info))
        .route("/saude", get(handlers::health))
        .route("/pergunta", post(handlers::ask))
        .route("/pergunta-stream", post(handlers::ask_stream))
        .route("/modelo", get(handlers::model_info))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
