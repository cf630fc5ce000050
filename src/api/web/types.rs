use serde::{Deserialize, Serialize};

use crate::store::Conversation;

/// Body of the web app's `POST /pergunta` and `POST /pergunta-stream`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub chat_id: Option<String>,
    /// Signed so out-of-range values reach validation instead of failing
    /// deserialization.
    #[serde(default)]
    pub max_tokens: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskResponse {
    pub response: String,
    pub chat_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TitleRequest {
    #[serde(default, alias = "titulo")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatResponse {
    pub chat_id: String,
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatListResponse {
    pub chats: Vec<Conversation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub chat: Conversation,
}
