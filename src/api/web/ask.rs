use std::convert::Infallible;

use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::Json;
use futures::StreamExt;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::types::{AskRequest, AskResponse};
use super::WebState;
use crate::api::helpers::{bad_request, ApiError, ApiResult};
use crate::chat::{StreamEvent, WordBuffer};
use crate::error::ChatError;
use crate::generation::{MAX_MAX_TOKENS, MIN_MAX_TOKENS};
use crate::store::auto_title;

const MISSING_QUESTION: &str = "Pergunta não fornecida";
const MAX_TOKENS_OUT_OF_RANGE: &str = "max_tokens deve estar entre 1 e 1024";
const EMPTY_ANSWER: &str = "Desculpe, não consegui processar sua pergunta.";
const CONNECT_ERROR: &str = "Erro ao conectar com o modelo de IA. Tente novamente.";

const RELAY_BUFFER: usize = 32;

pub async fn ask(
    State(state): State<WebState>,
    Json(req): Json<AskRequest>,
) -> ApiResult<Json<AskResponse>> {
    let question = require_question(&req)?;
    let max_tokens = checked_max_tokens(&req)?;

    let response = match state.client.ask(&question, max_tokens).await {
        Ok(answer) if !answer.response.trim().is_empty() => answer.response,
        Ok(_) => EMPTY_ANSWER.to_string(),
        Err(err) => upstream_error_message(&err),
    };

    let chat_id = ensure_chat(&state, req.chat_id, &question).await?;
    state.store.append(&chat_id, &question, &response).await?;

    Ok(Json(AskResponse { response, chat_id }))
}

/// Relays the inference stream as named events with whole words and
/// persists the exchange once the upstream reports completion.
pub async fn ask_stream(
    State(state): State<WebState>,
    Json(req): Json<AskRequest>,
) -> ApiResult<impl IntoResponse> {
    let question = require_question(&req)?;
    let max_tokens = checked_max_tokens(&req)?;
    let (tx, rx) = mpsc::channel(RELAY_BUFFER);
    let relay = Relay {
        state,
        question,
        chat_id: req.chat_id,
        max_tokens,
        tx,
    };
    tokio::spawn(relay.run());

    let events = ReceiverStream::new(rx).map(Ok::<_, Infallible>);
    Ok((
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(events).keep_alive(KeepAlive::default()),
    ))
}

/// The question is forwarded and stored exactly as sent.
fn require_question(req: &AskRequest) -> ApiResult<String> {
    req.question
        .as_deref()
        .filter(|q| !q.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| bad_request(MISSING_QUESTION))
}

fn checked_max_tokens(req: &AskRequest) -> ApiResult<Option<u32>> {
    req.max_tokens
        .map(|n| {
            u32::try_from(n)
                .ok()
                .filter(|n| (MIN_MAX_TOKENS..=MAX_MAX_TOKENS).contains(n))
                .ok_or_else(|| bad_request(MAX_TOKENS_OUT_OF_RANGE))
        })
        .transpose()
}

async fn ensure_chat(
    state: &WebState,
    chat_id: Option<String>,
    question: &str,
) -> ApiResult<String> {
    match chat_id.filter(|id| !id.is_empty()) {
        Some(id) => Ok(id),
        None => Ok(state.store.create(Some(auto_title(question))).await?),
    }
}

fn upstream_error_message(err: &ChatError) -> String {
    match err {
        ChatError::UpstreamStatus { status, body } => {
            format!("Erro na API do modelo: {status} - {body}")
        }
        other => {
            log::warn!("inference service unreachable: {other}");
            CONNECT_ERROR.to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RelayPhase {
    Idle,
    Thinking,
    Answering,
}

struct Relay {
    state: WebState,
    question: String,
    chat_id: Option<String>,
    max_tokens: Option<u32>,
    tx: mpsc::Sender<Event>,
}

/// The consumer left; stop relaying.
struct Disconnected;

impl Relay {
    async fn run(self) {
        let tx = self.tx.clone();
        tokio::select! {
            _ = tx.closed() => log::debug!("stream client disconnected"),
            result = self.relay() => {
                if result.is_err() {
                    log::debug!("stream client disconnected");
                }
            }
        }
    }

    async fn relay(&self) -> Result<(), Disconnected> {
        self.send("start", json!({ "question": self.question })).await?;

        let mut upstream = match self
            .state
            .client
            .ask_stream(&self.question, self.max_tokens)
            .await
        {
            Ok(stream) => stream,
            Err(err) => return self.fail(upstream_error_message(&err)).await,
        };

        let mut phase = RelayPhase::Idle;
        let mut thinking_words = WordBuffer::new();
        let mut answer_words = WordBuffer::new();
        let mut answer = String::new();

        while let Some(item) = upstream.next().await {
            match item {
                Ok(StreamEvent::Thinking { content }) => {
                    if phase == RelayPhase::Idle {
                        self.send("thinking_start", json!({})).await?;
                        phase = RelayPhase::Thinking;
                    }
                    for word in thinking_words.push(&content) {
                        self.send("thinking", json!({ "word": word })).await?;
                    }
                }
                Ok(StreamEvent::Response { content }) => {
                    if phase != RelayPhase::Answering {
                        self.close_thinking(phase, &mut thinking_words).await?;
                        self.send("response_start", json!({})).await?;
                        phase = RelayPhase::Answering;
                    }
                    answer.push_str(&content);
                    for word in answer_words.push(&content) {
                        self.send("response", json!({ "word": word })).await?;
                    }
                }
                Ok(StreamEvent::Error { message }) => return self.fail(message).await,
                Ok(StreamEvent::Done) => break,
                Err(err) => {
                    log::warn!("inference stream broke: {err}");
                    return self.fail(CONNECT_ERROR.to_string()).await;
                }
            }
        }

        self.close_thinking(phase, &mut thinking_words).await?;
        if let Some(word) = answer_words.flush() {
            self.send("response", json!({ "word": word })).await?;
        }

        let response = match answer.trim() {
            "" => EMPTY_ANSWER.to_string(),
            text => text.to_string(),
        };
        match self.persist(&response).await {
            Ok(chat_id) => {
                self.send(
                    "complete",
                    json!({ "chat_id": chat_id, "response": response }),
                )
                .await
            }
            Err(message) => self.fail(message).await,
        }
    }

    async fn close_thinking(
        &self,
        phase: RelayPhase,
        words: &mut WordBuffer,
    ) -> Result<(), Disconnected> {
        if phase != RelayPhase::Thinking {
            return Ok(());
        }
        if let Some(word) = words.flush() {
            self.send("thinking", json!({ "word": word })).await?;
        }
        self.send("thinking_end", json!({})).await
    }

    async fn persist(&self, response: &str) -> Result<String, String> {
        let chat_id = ensure_chat(&self.state, self.chat_id.clone(), &self.question)
            .await
            .map_err(|e| e.message)?;
        self.state
            .store
            .append(&chat_id, &self.question, response)
            .await
            .map_err(|e| ApiError::from(e).message)?;
        Ok(chat_id)
    }

    async fn fail(&self, message: String) -> Result<(), Disconnected> {
        self.send("error", json!({ "message": message })).await
    }

    async fn send(&self, name: &str, payload: serde_json::Value) -> Result<(), Disconnected> {
        let event = match Event::default().event(name).json_data(payload) {
            Ok(event) => event,
            Err(err) => {
                log::warn!("dropping unencodable {name} event: {err}");
                return Ok(());
            }
        };
        self.tx.send(event).await.map_err(|_| Disconnected)
    }
}
