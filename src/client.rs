//! HTTP client the web app uses to reach the inference service.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::api::inference::{HealthResponse, QuestionRequest, QuestionResponse};
use crate::chat::{create_sse_stream, sse_data, ParsedStream, StreamEvent};
use crate::error::ChatError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct InferenceClient {
    base_url: Arc<str>,
    timeout: Duration,
    client: Client,
}

impl InferenceClient {
    /// `timeout` bounds each synchronous call. Streams are only bounded by
    /// the connect timeout so long generations are not cut short.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ChatError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').into(),
            timeout,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn ask(
        &self,
        question: &str,
        max_tokens: Option<u32>,
    ) -> Result<QuestionResponse, ChatError> {
        let resp = self
            .client
            .post(format!("{}/pergunta", self.base_url))
            .timeout(self.timeout)
            .json(&QuestionRequest {
                question: question.to_string(),
                max_tokens: max_tokens.map(i64::from),
            })
            .send()
            .await?;

        log::debug!("inference service HTTP status: {}", resp.status());
        let resp = check_status(resp).await?;

        let raw = resp.text().await?;
        serde_json::from_str(&raw).map_err(|e| ChatError::ResponseFormatError {
            message: e.to_string(),
            raw_response: raw,
        })
    }

    /// Opens `/pergunta-stream` and decodes its events.
    pub async fn ask_stream(
        &self,
        question: &str,
        max_tokens: Option<u32>,
    ) -> Result<ParsedStream<StreamEvent>, ChatError> {
        let resp = self
            .client
            .post(format!("{}/pergunta-stream", self.base_url))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&QuestionRequest {
                question: question.to_string(),
                max_tokens: max_tokens.map(i64::from),
            })
            .send()
            .await?;

        log::debug!("inference stream HTTP status: {}", resp.status());
        let resp = check_status(resp).await?;
        Ok(create_sse_stream(resp, parse_stream_event))
    }

    pub async fn health(&self) -> Result<HealthResponse, ChatError> {
        let resp = self
            .client
            .get(format!("{}/saude", self.base_url))
            .timeout(self.timeout)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ChatError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ChatError::UpstreamStatus {
        status: status.as_u16(),
        body,
    })
}

fn parse_stream_event(event: &str) -> Result<Option<StreamEvent>, ChatError> {
    match sse_data(event) {
        Some(data) => Ok(Some(serde_json::from_str(&data)?)),
        None => Ok(None),
    }
}
