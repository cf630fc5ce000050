use serde::{Deserialize, Serialize};

/// One event of a segmented generation stream, as sent on the wire by the
/// inference service (`data: {"type": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Reasoning-channel content
    #[serde(rename = "thinking_chunk")]
    Thinking { content: String },
    /// Answer-channel content
    #[serde(rename = "response_chunk")]
    Response { content: String },
    /// Generation failed; `Done` still follows
    Error { message: String },
    /// Terminal sentinel, emitted exactly once
    Done,
}

impl StreamEvent {
    pub fn thinking(content: impl Into<String>) -> Self {
        StreamEvent::Thinking {
            content: content.into(),
        }
    }

    pub fn response(content: impl Into<String>) -> Self {
        StreamEvent::Response {
            content: content.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, StreamEvent::Done)
    }
}
