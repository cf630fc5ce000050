use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TITLE: &str = "Novo Chat";
const AUTO_TITLE_PREFIX: &str = "Chat - ";
const AUTO_TITLE_CHARS: usize = 30;

/// One question/answer exchange. Never edited once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub question: String,
    pub answer: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: normalize_title(title),
            created_at: now,
            updated_at: now,
            messages: Vec::new(),
        }
    }

    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    pub fn rename(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }
}

/// Title for a conversation opened implicitly by its first question.
pub fn auto_title(question: &str) -> String {
    let head: String = question.chars().take(AUTO_TITLE_CHARS).collect();
    format!("{AUTO_TITLE_PREFIX}{head}")
}

fn normalize_title(title: Option<String>) -> String {
    match title {
        Some(title) if !title.trim().is_empty() => title,
        _ => DEFAULT_TITLE.to_string(),
    }
}

/// Most recently updated first.
pub(crate) fn sort_by_recency(conversations: &mut [Conversation]) {
    conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_titles_fall_back_to_placeholder() {
        assert_eq!(Conversation::new("a", None).title, DEFAULT_TITLE);
        assert_eq!(Conversation::new("a", Some("  ".into())).title, DEFAULT_TITLE);
        assert_eq!(Conversation::new("a", Some("Física".into())).title, "Física");
    }

    #[test]
    fn auto_title_keeps_thirty_chars() {
        let question = "Quem foi a primeira pessoa a viajar para o espaço?";
        assert_eq!(auto_title(question), "Chat - Quem foi a primeira pessoa a v");
        assert_eq!(auto_title("Olá"), "Chat - Olá");
    }

    #[test]
    fn push_message_bumps_updated_at() {
        let mut conversation = Conversation::new("a", None);
        let before = conversation.updated_at;
        conversation.push_message(Message::new("q", "a"));
        assert!(conversation.updated_at >= before);
        assert_eq!(conversation.messages.len(), 1);
    }

    #[test]
    fn record_shape_matches_documents() {
        let conversation = Conversation::new("abc", Some("t".into()));
        let value = serde_json::to_value(&conversation).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        for key in ["id", "title", "created_at", "updated_at", "messages"] {
            assert!(keys.iter().any(|k| k == key), "missing {key}");
        }
    }
}
