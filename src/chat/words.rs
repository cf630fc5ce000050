/// Re-cuts arbitrary text chunks into whole words.
///
/// A word is released once whitespace after it has been seen; the trailing
/// partial word stays buffered until more text or [`WordBuffer::flush`].
#[derive(Debug, Default)]
pub struct WordBuffer {
    pending: String,
}

impl WordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);
        let Some(boundary) = self.pending.rfind(char::is_whitespace) else {
            return Vec::new();
        };
        let tail = self.pending.split_off(boundary);
        let complete = std::mem::replace(&mut self.pending, tail);
        complete.split_whitespace().map(str::to_string).collect()
    }

    pub fn flush(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.pending);
        let word = rest.trim();
        if word.is_empty() {
            None
        } else {
            Some(word.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_words_split_across_chunks() {
        let mut buffer = WordBuffer::new();
        let mut words = Vec::new();
        for chunk in ["Yu", "ri Gag", "arin foi", " o primeiro."] {
            words.extend(buffer.push(chunk));
        }
        words.extend(buffer.flush());
        assert_eq!(words, vec!["Yuri", "Gagarin", "foi", "o", "primeiro."]);
    }

    #[test]
    fn whitespace_only_chunks_release_nothing_new() {
        let mut buffer = WordBuffer::new();
        assert!(buffer.push("   ").is_empty());
        assert!(buffer.push("\n").is_empty());
        assert_eq!(buffer.flush(), None);
    }

    #[test]
    fn multibyte_boundaries_are_respected() {
        let mut buffer = WordBuffer::new();
        assert_eq!(buffer.push("olá mundo\u{3000}ação"), vec!["olá", "mundo"]);
        assert_eq!(buffer.flush().as_deref(), Some("ação"));
    }
}
