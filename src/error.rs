use thiserror::Error;

/// Error types that can occur while generating, relaying or decoding answers.
#[derive(Debug, Error)]
pub enum ChatError {
    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Errors returned by the model runtime
    #[error("Provider error: {0}")]
    ProviderError(String),
    /// A peer service answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    UpstreamStatus { status: u16, body: String },
    /// Response parsing or format error
    #[error("Response format error: {message}. Raw response: {raw_response}")]
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// JSON serialization/deserialization errors
    #[error("JSON parse error: {0}")]
    JsonError(String),
    /// Generic error
    #[error("Generic error: {0}")]
    Generic(String),
}

impl ChatError {
    /// True when the peer could not be reached at all (connect/timeout),
    /// as opposed to answering with an error.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ChatError::HttpError(_))
    }
}

/// Converts reqwest HTTP errors into ChatErrors
impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => ChatError::UpstreamStatus {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => ChatError::HttpError(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(err: serde_json::Error) -> Self {
        ChatError::JsonError(format!(
            "{} at line {} column {}",
            err,
            err.line(),
            err.column()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_errors_carry_position() {
        let err = serde_json::from_str::<serde_json::Value>("{\"a\": ").unwrap_err();
        let converted = ChatError::from(err);
        let text = converted.to_string();
        assert!(text.starts_with("JSON parse error:"));
        assert!(text.contains("line 1"));
    }

    #[test]
    fn only_transport_failures_are_unreachable() {
        assert!(ChatError::HttpError("connection refused".into()).is_unreachable());
        assert!(!ChatError::UpstreamStatus {
            status: 500,
            body: "boom".into()
        }
        .is_unreachable());
    }
}
