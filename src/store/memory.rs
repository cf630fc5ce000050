use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::StoreError;
use super::record::{sort_by_recency, Conversation, Message};
use super::traits::ConversationStore;

/// Keeps conversations in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    conversations: RwLock<HashMap<String, Conversation>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn create(&self, title: Option<String>) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        let conversation = Conversation::new(id.clone(), title);
        self.conversations.write().await.insert(id.clone(), conversation);
        Ok(id)
    }

    async fn append(&self, id: &str, question: &str, answer: &str) -> Result<Message, StoreError> {
        let mut conversations = self.conversations.write().await;
        let conversation = conversations
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let message = Message::new(question, answer);
        conversation.push_message(message.clone());
        Ok(message)
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        let mut items: Vec<_> = self.conversations.read().await.values().cloned().collect();
        sort_by_recency(&mut items);
        Ok(items)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.conversations.write().await.remove(id).is_some())
    }

    async fn rename(&self, id: &str, title: &str) -> Result<bool, StoreError> {
        match self.conversations.write().await.get_mut(id) {
            Some(conversation) => {
                conversation.rename(title);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
