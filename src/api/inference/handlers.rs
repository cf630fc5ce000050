use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::StreamExt;

use super::types::{
    HealthResponse, HealthStatus, ModelResponse, QuestionRequest, QuestionResponse, ServiceInfo,
};
use super::InferenceState;
use crate::api::helpers::{bad_request, internal_error, ApiError, ApiResult};
use crate::chat::{segment_stream, split_reasoning};
use crate::generation::{spawn_generation, GenerationRequest, MAX_MAX_TOKENS, MIN_MAX_TOKENS};

const EMPTY_QUESTION: &str = "A pergunta não pode estar vazia";
const MAX_TOKENS_OUT_OF_RANGE: &str = "max_tokens deve estar entre 1 e 1024";

pub async fn service_info(State(state): State<InferenceState>) -> Json<ServiceInfo> {
    let endpoints = [
        ("saude", "/saude (GET) - Verifica status da API"),
        ("pergunta", "/pergunta (POST) - Envia pergunta ao modelo"),
        (
            "pergunta-stream",
            "/pergunta-stream (POST) - Envia pergunta com resposta em streaming",
        ),
        ("modelo", "/modelo (GET) - Informações do modelo"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(ServiceInfo {
        message: "Chat API com LLM".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.generator.info().name,
        endpoints,
    })
}

pub async fn health(State(state): State<InferenceState>) -> Json<HealthResponse> {
    let model_loaded = match state.generator.health_check().await {
        Ok(()) => true,
        Err(err) => {
            log::warn!("model runtime unavailable: {err}");
            false
        }
    };
    Json(HealthResponse {
        status: if model_loaded {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unavailable
        },
        model_loaded,
        model_name: state.generator.info().name,
    })
}

pub async fn model_info(State(state): State<InferenceState>) -> Json<ModelResponse> {
    let info = state.generator.info();
    Json(ModelResponse {
        model_name: info.name,
        device: info.device,
        model_type: info.kind,
    })
}

pub async fn ask(
    State(state): State<InferenceState>,
    Json(req): Json<QuestionRequest>,
) -> ApiResult<Json<QuestionResponse>> {
    let request = validate(&state, &req)?;
    let raw = state
        .generator
        .generate(&request)
        .await
        .map_err(|e| processing_error(e.to_string()))?;
    let (thinking, response) = split_reasoning(&raw);

    Ok(Json(QuestionResponse {
        question: req.question,
        thinking,
        response,
    }))
}

/// Streams segmenter events as `data: {json}` frames. The response body owns
/// the generation handle, so dropping it on disconnect cancels the producer.
pub async fn ask_stream(
    State(state): State<InferenceState>,
    Json(req): Json<QuestionRequest>,
) -> ApiResult<impl IntoResponse> {
    let request = validate(&state, &req)?;
    let handle = spawn_generation(
        state.generator.clone(),
        request,
        state.settings.stream_buffer,
    );
    let events = segment_stream(Box::pin(handle.into_stream()))
        .map(|event| Event::default().json_data(event));

    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(events).keep_alive(KeepAlive::default()),
    ))
}

fn validate(state: &InferenceState, req: &QuestionRequest) -> ApiResult<GenerationRequest> {
    if req.question.trim().is_empty() {
        return Err(bad_request(EMPTY_QUESTION).detail());
    }
    let max_tokens = req
        .max_tokens
        .map_or(Some(state.settings.default_max_tokens), |n| u32::try_from(n).ok())
        .filter(|n| (MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(n))
        .ok_or_else(|| bad_request(MAX_TOKENS_OUT_OF_RANGE).detail())?;

    Ok(GenerationRequest::new(req.question.clone(), max_tokens).sampling(state.settings.sampling))
}

fn processing_error(message: String) -> ApiError {
    internal_error(format!("Erro ao processar pergunta: {message}")).detail()
}
