use async_trait::async_trait;

use super::error::StoreError;
use super::record::{Conversation, Message};

/// Owns the lifecycle of conversation records.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Creates an empty conversation and returns its id. A missing or blank
    /// title becomes the default placeholder.
    async fn create(&self, title: Option<String>) -> Result<String, StoreError>;

    /// Appends one exchange. Unknown ids yield `StoreError::NotFound`.
    async fn append(&self, id: &str, question: &str, answer: &str) -> Result<Message, StoreError>;

    async fn get(&self, id: &str) -> Result<Option<Conversation>, StoreError>;

    /// All conversations, most recently updated first.
    async fn list(&self) -> Result<Vec<Conversation>, StoreError>;

    /// Returns whether a conversation was removed.
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Returns whether the title was applied.
    async fn rename(&self, id: &str, title: &str) -> Result<bool, StoreError>;
}
