use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TOKENS: u32 = 256;
pub const MIN_MAX_TOKENS: u32 = 1;
pub const MAX_MAX_TOKENS: u32 = 1024;

/// Sampling knobs forwarded to the model runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            repeat_penalty: 1.1,
        }
    }
}

/// A single question to answer.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub question: String,
    pub max_tokens: u32,
    pub sampling: SamplingParams,
}

impl GenerationRequest {
    pub fn new(question: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            question: question.into(),
            max_tokens,
            sampling: SamplingParams::default(),
        }
    }

    pub fn sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }
}

/// Describes the model behind a generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub device: String,
    pub kind: String,
}
