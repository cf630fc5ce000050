use serde::{Deserialize, Serialize};

use crate::api::inference::InferenceSettings;
use crate::generation::{
    SamplingParams, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_RUNTIME_URL, DEFAULT_SYSTEM_PROMPT,
};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct InferenceConfig {
    pub bind: String,
    pub runtime_url: String,
    pub model: String,
    pub device: String,
    pub system_prompt: String,
    pub default_max_tokens: u32,
    pub stream_buffer: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        let sampling = SamplingParams::default();
        Self {
            bind: "127.0.0.1:8000".to_string(),
            runtime_url: DEFAULT_RUNTIME_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            device: "cpu".to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            default_max_tokens: DEFAULT_MAX_TOKENS,
            stream_buffer: 32,
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            repeat_penalty: sampling.repeat_penalty,
        }
    }
}

impl InferenceConfig {
    pub fn sampling(&self) -> SamplingParams {
        SamplingParams {
            temperature: self.temperature,
            top_p: self.top_p,
            repeat_penalty: self.repeat_penalty,
        }
    }

    pub fn settings(&self) -> InferenceSettings {
        InferenceSettings {
            default_max_tokens: self.default_max_tokens,
            stream_buffer: self.stream_buffer,
            sampling: self.sampling(),
        }
    }
}
