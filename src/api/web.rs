//! HTTP surface of the web app: chat CRUD, question relay and downloads.

#[path = "web/ask.rs"]
mod ask;

#[path = "web/downloads.rs"]
mod downloads;

#[path = "web/handlers.rs"]
mod handlers;

#[path = "web/types.rs"]
mod types;


use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::client::InferenceClient;
use crate::store::ConversationStore;

pub use types::{
    AskRequest, AskResponse, ChatListResponse, ChatResponse, CreateChatResponse, MessageResponse,
    TitleRequest,
};

#[derive(Clone)]
pub struct WebState {
    pub store: Arc<dyn ConversationStore>,
    pub client: InferenceClient,
}

impl WebState {
    pub fn new(store: Arc<dyn ConversationStore>, client: InferenceClient) -> Self {
        Self { store, client }
    }
}

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/pergunta", post(ask::ask))
        .route("/pergunta-stream", post(ask::ask_stream))
        .route("/chats/", get(handlers::list_chats))
        .route("/chats/criar", post(handlers::create_chat))
        .route("/chats/:id", get(handlers::get_chat))
        .route("/chats/:id/deletar", delete(handlers::delete_chat))
        .route("/chats/:id/titulo", put(handlers::rename_chat))
        .route("/download-json/:id", get(downloads::download_json))
        .route("/download-csv/:id", get(downloads::download_csv))
        .with_state(state)
}
