//! thinkchat: question answering over a reasoning model.
//!
//! Two services share this crate. The inference service wraps a model runtime
//! and streams the model's `<think>` reasoning separately from its answer. The
//! web app relays questions to it, re-cuts the stream into whole words for the
//! browser and keeps conversation history in a [`store::ConversationStore`].

pub mod api;
pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod generation;
pub mod logging;
pub mod store;

pub use error::ChatError;
