//! Conversation persistence.
//!
//! The web app only talks to [`ConversationStore`]; the backend is picked from
//! configuration at startup.

mod error;
mod json_store;
mod memory;
mod record;
mod traits;

pub use error::StoreError;
pub use json_store::JsonDirStore;
pub use memory::MemoryStore;
pub use record::{auto_title, Conversation, Message, DEFAULT_TITLE};
pub use traits::ConversationStore;
