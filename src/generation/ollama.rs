//! Generator backed by an Ollama-compatible model runtime.
//!
//! Prompts are rendered locally with the ChatML template and sent in raw mode,
//! so the runtime returns the model's reasoning markers untouched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::prompt::{build_chat_prompt, DEFAULT_SYSTEM_PROMPT};
use super::request::{GenerationRequest, ModelInfo};
use super::traits::{FragmentStream, HealthProvider, TextGenerator};
use crate::chat::create_ndjson_stream;
use crate::error::ChatError;

pub const DEFAULT_RUNTIME_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen3:0.6b";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for the Ollama generator.
#[derive(Debug)]
pub struct OllamaConfig {
    /// Runtime base URL, without trailing slash.
    pub base_url: String,
    /// Model tag as known to the runtime.
    pub model: String,
    /// Device label reported in model metadata.
    pub device: String,
    /// System instruction rendered into every prompt.
    pub system_prompt: String,
}

/// The config sits behind an `Arc` so clones share it.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    pub config: Arc<OllamaConfig>,
    pub client: Client,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    raw: bool,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerateOptions>,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_predict: u32,
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

#[derive(Deserialize, Debug)]
struct GenerateChunk {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize, Debug)]
struct TagModel {
    name: String,
}

impl OllamaGenerator {
    pub fn new(
        base_url: impl Into<String>,
        model: Option<String>,
        device: Option<String>,
        system_prompt: Option<String>,
    ) -> Result<Self, ChatError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self::with_client(client, base_url, model, device, system_prompt))
    }

    /// Creates a generator with a caller-provided HTTP client.
    pub fn with_client(
        client: Client,
        base_url: impl Into<String>,
        model: Option<String>,
        device: Option<String>,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            config: Arc::new(OllamaConfig {
                base_url: base_url.into().trim_end_matches('/').to_string(),
                model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                device: device.unwrap_or_else(|| "cpu".to_string()),
                system_prompt: system_prompt.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
            }),
            client,
        }
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Asks the runtime to load the model so the first question does not pay
    /// for it.
    pub async fn warm_up(&self) -> Result<(), ChatError> {
        let body = GenerateRequest {
            model: &self.config.model,
            prompt: "",
            raw: false,
            stream: false,
            options: None,
        };
        let resp = self.post_generate(&body).await?;
        log::info!("model {} loaded by runtime ({})", self.config.model, resp.status());
        Ok(())
    }

    fn request_body<'a>(
        &'a self,
        prompt: &'a str,
        request: &GenerationRequest,
        stream: bool,
    ) -> GenerateRequest<'a> {
        GenerateRequest {
            model: &self.config.model,
            prompt,
            raw: true,
            stream,
            options: Some(GenerateOptions {
                num_predict: request.max_tokens,
                temperature: request.sampling.temperature,
                top_p: request.sampling.top_p,
                repeat_penalty: request.sampling.repeat_penalty,
            }),
        }
    }

    async fn post_generate(
        &self,
        body: &GenerateRequest<'_>,
    ) -> Result<reqwest::Response, ChatError> {
        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(body) {
                log::trace!("runtime request payload: {json}");
            }
        }

        let resp = self
            .client
            .post(format!("{}/api/generate", self.config.base_url))
            .json(body)
            .send()
            .await?;

        log::debug!("runtime HTTP status: {}", resp.status());

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ChatError::ProviderError(format!(
                "runtime returned {status}: {}",
                runtime_error_message(&text)
            )));
        }
        Ok(resp)
    }
}

#[async_trait]
impl HealthProvider for OllamaGenerator {
    async fn health_check(&self) -> Result<(), ChatError> {
        let resp = self
            .client
            .get(format!("{}/api/tags", self.config.base_url))
            .send()
            .await?
            .error_for_status()?;
        let tags: TagsResponse = resp.json().await?;

        let wanted = self.config.model.as_str();
        let base = wanted.split(':').next().unwrap_or(wanted);
        let tagged = format!("{base}:");
        let available = tags.models.iter().any(|m| {
            m.name == wanted || (!wanted.contains(':') && m.name.starts_with(&tagged))
        });
        if available {
            Ok(())
        } else {
            Err(ChatError::ProviderError(format!(
                "model '{wanted}' is not available in the runtime"
            )))
        }
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    fn info(&self) -> ModelInfo {
        ModelInfo {
            name: self.config.model.clone(),
            device: self.config.device.clone(),
            kind: "ollama".to_string(),
        }
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, ChatError> {
        let prompt = build_chat_prompt(&self.config.system_prompt, &request.question);
        let body = self.request_body(&prompt, request, false);
        let resp = self.post_generate(&body).await?;
        let raw = resp.text().await?;
        let chunk: GenerateChunk =
            serde_json::from_str(&raw).map_err(|e| ChatError::ResponseFormatError {
                message: e.to_string(),
                raw_response: raw.clone(),
            })?;
        if let Some(error) = chunk.error {
            return Err(ChatError::ProviderError(error));
        }
        Ok(chunk.response)
    }

    async fn generate_stream(
        &self,
        request: &GenerationRequest,
    ) -> Result<FragmentStream, ChatError> {
        let prompt = build_chat_prompt(&self.config.system_prompt, &request.question);
        let body = self.request_body(&prompt, request, true);
        let resp = self.post_generate(&body).await?;
        Ok(create_ndjson_stream(resp, parse_stream_line))
    }
}

fn parse_stream_line(line: &str) -> Result<Option<String>, ChatError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let chunk: GenerateChunk = serde_json::from_str(line)?;
    if let Some(error) = chunk.error {
        return Err(ChatError::ProviderError(error));
    }
    if chunk.response.is_empty() {
        return Ok(None);
    }
    Ok(Some(chunk.response))
}

fn runtime_error_message(body: &str) -> String {
    serde_json::from_str::<GenerateChunk>(body)
        .ok()
        .and_then(|chunk| chunk.error)
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;
    use mockito::Matcher;

    use super::*;

    fn generator(url: &str) -> OllamaGenerator {
        OllamaGenerator::new(url, Some("qwen3:0.6b".into()), None, Some("sys".into()))
            .expect("client")
    }

    #[tokio::test]
    async fn generate_sends_raw_chatml_prompt() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/generate")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "qwen3:0.6b",
                "raw": true,
                "stream": false,
                "prompt": concat!(
                    "<|im_start|>system\nsys<|im_end|>\n",
                    "<|im_start|>user\nquem?<|im_end|>\n",
                    "<|im_start|>assistant\n",
                ),
                "options": { "num_predict": 64 }
            })))
            .with_body(r#"{"response":"<think>hm</think>Gagarin","done":true}"#)
            .create_async()
            .await;

        let text = generator(&server.url())
            .generate(&GenerationRequest::new("quem?", 64))
            .await
            .unwrap();

        assert_eq!(text, "<think>hm</think>Gagarin");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn stream_yields_fragments_until_done() {
        let mut server = mockito::Server::new_async().await;
        let body = concat!(
            "{\"response\":\"<think>\",\"done\":false}\n",
            "{\"response\":\"plan\",\"done\":false}\n",
            "{\"response\":\"</think>\",\"done\":false}\n",
            "{\"response\":\"ok\",\"done\":false}\n",
            "{\"response\":\"\",\"done\":true}\n",
        );
        server
            .mock("POST", "/api/generate")
            .with_body(body)
            .create_async()
            .await;

        let stream = generator(&server.url())
            .generate_stream(&GenerationRequest::new("q", 16))
            .await
            .unwrap();
        let fragments: Vec<String> = stream.map(|f| f.unwrap()).collect().await;

        assert_eq!(fragments, vec!["<think>", "plan", "</think>", "ok"]);
    }

    #[tokio::test]
    async fn runtime_errors_surface_as_provider_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/generate")
            .with_status(404)
            .with_body(r#"{"error":"model 'qwen3:0.6b' not found"}"#)
            .create_async()
            .await;

        let err = generator(&server.url())
            .generate(&GenerationRequest::new("q", 16))
            .await
            .unwrap_err();

        assert!(matches!(&err, ChatError::ProviderError(msg) if msg.contains("not found")));
    }

    #[tokio::test]
    async fn health_requires_model_in_tags() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_body(r#"{"models":[{"name":"llama3:8b"},{"name":"qwen3:0.6b"}]}"#)
            .create_async()
            .await;
        assert!(generator(&server.url()).health_check().await.is_ok());

        let missing = OllamaGenerator::new(server.url(), Some("phi4".into()), None, None).unwrap();
        assert!(missing.health_check().await.is_err());
    }

    #[tokio::test]
    async fn unreachable_runtime_is_an_http_error() {
        let err = generator("http://127.0.0.1:9")
            .generate(&GenerationRequest::new("q", 1))
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
    }
}
