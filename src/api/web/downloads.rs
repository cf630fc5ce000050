use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use super::WebState;
use crate::api::helpers::{internal_error, not_found, ApiResult, CHAT_NOT_FOUND};
use crate::export::{attachment_name, to_csv, to_json};
use crate::store::Conversation;

pub async fn download_json(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let conversation = load(&state, &id).await?;
    let body = to_json(&conversation).map_err(|e| internal_error(e.to_string()))?;
    Ok(attachment(&id, "json", "application/json; charset=utf-8", body))
}

pub async fn download_csv(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let conversation = load(&state, &id).await?;
    Ok(attachment(&id, "csv", "text/csv; charset=utf-8", to_csv(&conversation)))
}

async fn load(state: &WebState, id: &str) -> ApiResult<Conversation> {
    state
        .store
        .get(id)
        .await?
        .ok_or_else(|| not_found(CHAT_NOT_FOUND))
}

fn attachment(id: &str, extension: &str, content_type: &'static str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, attachment_name(id, extension)),
        ],
        body,
    )
        .into_response()
}
