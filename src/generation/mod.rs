//! Text generation: the model seam, the Ollama-backed implementation and the
//! background worker that streams fragments out of it.

mod ollama;
mod prompt;
mod request;
mod traits;
mod worker;

pub use ollama::{OllamaConfig, OllamaGenerator, DEFAULT_MODEL, DEFAULT_RUNTIME_URL};
pub use prompt::{build_chat_prompt, DEFAULT_SYSTEM_PROMPT};
pub use request::{
    GenerationRequest, ModelInfo, SamplingParams, DEFAULT_MAX_TOKENS, MAX_MAX_TOKENS,
    MIN_MAX_TOKENS,
};
pub use traits::{FragmentStream, HealthProvider, TextGenerator};
pub use worker::{spawn_generation, GenerationHandle};
