use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::store::StoreError;

pub type ApiResult<T> = Result<T, ApiError>;

/// An HTTP error rendered as a one-field JSON object.
///
/// The inference service reports `{"detail": ...}`; the web app reports
/// `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    key: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            key: "error",
        }
    }

    /// Renders under `detail` instead of `error`.
    pub fn detail(mut self) -> Self {
        self.key = "detail";
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            log::warn!("request failed with {}: {}", self.status, self.message);
        }
        let mut body = serde_json::Map::new();
        body.insert(self.key.to_string(), self.message.into());
        (self.status, Json(serde_json::Value::Object(body))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => not_found(CHAT_NOT_FOUND),
            other => internal_error(other.to_string()),
        }
    }
}

pub const CHAT_NOT_FOUND: &str = "Chat não encontrado";

pub fn bad_request(msg: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, msg)
}

pub fn not_found(msg: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, msg)
}

pub fn internal_error(msg: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let resp = err.into_response();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_error_key_by_default() {
        let (status, body) = body_json(bad_request("Pergunta não fornecida")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, serde_json::json!({"error": "Pergunta não fornecida"}));
    }

    #[tokio::test]
    async fn detail_switches_key() {
        let (_, body) = body_json(internal_error("boom").detail()).await;
        assert_eq!(body, serde_json::json!({"detail": "boom"}));
    }

    #[test]
    fn store_not_found_maps_to_404() {
        let err = ApiError::from(StoreError::NotFound("x".into()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        assert_eq!(err.message, CHAT_NOT_FOUND);
    }
}
