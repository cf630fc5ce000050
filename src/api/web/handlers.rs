use axum::extract::{Path, State};
use axum::response::Html;
use axum::Json;

use super::types::{
    ChatListResponse, ChatResponse, CreateChatResponse, MessageResponse, TitleRequest,
};
use super::WebState;
use crate::api::helpers::{bad_request, not_found, ApiResult, CHAT_NOT_FOUND};
use crate::store::DEFAULT_TITLE;

const INDEX_HTML: &str = include_str!("../../../assets/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn list_chats(State(state): State<WebState>) -> ApiResult<Json<ChatListResponse>> {
    let chats = state.store.list().await?;
    Ok(Json(ChatListResponse { chats }))
}

/// The body is optional; without a title the chat gets the placeholder.
pub async fn create_chat(
    State(state): State<WebState>,
    body: Option<Json<TitleRequest>>,
) -> ApiResult<Json<CreateChatResponse>> {
    let title = body
        .and_then(|Json(req)| req.title)
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let chat_id = state.store.create(Some(title.clone())).await?;
    log::info!("created chat {chat_id}");

    Ok(Json(CreateChatResponse {
        chat_id,
        title,
        message: "Chat criado com sucesso".to_string(),
    }))
}

pub async fn get_chat(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ChatResponse>> {
    let chat = state
        .store
        .get(&id)
        .await?
        .ok_or_else(|| not_found(CHAT_NOT_FOUND))?;
    Ok(Json(ChatResponse { chat }))
}

pub async fn delete_chat(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.store.delete(&id).await? {
        return Err(not_found(CHAT_NOT_FOUND));
    }
    log::info!("deleted chat {id}");
    Ok(Json(MessageResponse {
        message: "Chat deletado com sucesso".to_string(),
    }))
}

pub async fn rename_chat(
    State(state): State<WebState>,
    Path(id): Path<String>,
    body: Option<Json<TitleRequest>>,
) -> ApiResult<Json<MessageResponse>> {
    let title = body
        .and_then(|Json(req)| req.title)
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| bad_request("Título não fornecido"))?;
    if !state.store.rename(&id, &title).await? {
        return Err(not_found(CHAT_NOT_FOUND));
    }
    Ok(Json(MessageResponse {
        message: "Título atualizado com sucesso".to_string(),
    }))
}
