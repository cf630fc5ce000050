use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::error::StoreError;
use super::record::{sort_by_recency, Conversation, Message};
use super::traits::ConversationStore;

/// One pretty-printed JSON document per conversation under `dir`.
#[derive(Debug)]
pub struct JsonDirStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonDirStore {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        let Some(path) = self.path_for(id) else {
            return Ok(None);
        };
        match read_if_present(&path).await? {
            Some(data) => Ok(Some(serde_json::from_slice(&data)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, conversation: &Conversation) -> Result<(), StoreError> {
        let path = self
            .path_for(&conversation.id)
            .ok_or_else(|| StoreError::NotFound(conversation.id.clone()))?;
        fs::create_dir_all(&self.dir).await?;
        let payload = serde_json::to_vec_pretty(conversation)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Only store-issued ids map to a file; anything else cannot name a path.
    fn path_for(&self, id: &str) -> Option<PathBuf> {
        let id = Uuid::parse_str(id).ok()?;
        Some(self.dir.join(format!("{}.json", id.hyphenated())))
    }
}

async fn read_if_present(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
    match fs::read(path).await {
        Ok(data) => Ok(Some(data)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl ConversationStore for JsonDirStore {
    async fn create(&self, title: Option<String>) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let conversation = Conversation::new(Uuid::new_v4().to_string(), title);
        self.save(&conversation).await?;
        log::debug!("created conversation {}", conversation.id);
        Ok(conversation.id)
    }

    async fn append(&self, id: &str, question: &str, answer: &str) -> Result<Message, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut conversation = self
            .load(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let message = Message::new(question, answer);
        conversation.push_message(message.clone());
        self.save(&conversation).await?;
        Ok(message)
    }

    async fn get(&self, id: &str) -> Result<Option<Conversation>, StoreError> {
        self.load(id).await
    }

    async fn list(&self) -> Result<Vec<Conversation>, StoreError> {
        let mut items = Vec::new();
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(items),
            Err(err) => return Err(err.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            // deleted between the directory scan and the read
            let Some(data) = read_if_present(&path).await? else {
                continue;
            };
            match serde_json::from_slice::<Conversation>(&data) {
                Ok(conversation) => items.push(conversation),
                Err(err) => log::warn!("skipping unreadable record {}: {err}", path.display()),
            }
        }
        sort_by_recency(&mut items);
        Ok(items)
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let Some(path) = self.path_for(id) else {
            return Ok(false);
        };
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn rename(&self, id: &str, title: &str) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;
        let Some(mut conversation) = self.load(id).await? else {
            return Ok(false);
        };
        conversation.rename(title);
        self.save(&conversation).await?;
        Ok(true)
    }
}
