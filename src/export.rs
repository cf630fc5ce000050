//! Download renderings of a stored conversation.

use crate::store::Conversation;

const CSV_HEADER: [&str; 3] = ["Pergunta", "Resposta", "Timestamp"];
const UTF8_BOM: &str = "\u{feff}";

/// The full record, pretty-printed.
pub fn to_json(conversation: &Conversation) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(conversation)
}

/// One row per message, prefixed with a BOM so spreadsheet tools pick UTF-8.
pub fn to_csv(conversation: &Conversation) -> String {
    let mut out = String::from(UTF8_BOM);
    push_row(&mut out, CSV_HEADER);
    for message in &conversation.messages {
        let timestamp = message.timestamp.to_rfc3339();
        push_row(
            &mut out,
            [
                message.question.as_str(),
                message.answer.as_str(),
                timestamp.as_str(),
            ],
        );
    }
    out
}

fn push_row<const N: usize>(out: &mut String, fields: [&str; N]) {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

/// `Content-Disposition` value for a download of `id` with `extension`.
pub fn attachment_name(id: &str, extension: &str) -> String {
    format!("attachment; filename=\"chat-{id}.{extension}\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Message;

    fn conversation() -> Conversation {
        let mut conversation = Conversation::new("c1", Some("Espaço".into()));
        conversation.push_message(Message::new("Quem foi?", "Gagarin, em 1961."));
        conversation.push_message(Message::new("Disse \"oi\"?", "linha1\nlinha2"));
        conversation
    }

    #[test]
    fn csv_quotes_only_when_needed() {
        let conversation = conversation();
        let csv = to_csv(&conversation);
        let body = csv.strip_prefix('\u{feff}').expect("bom");
        let rows: Vec<&str> = body.split("\r\n").collect();

        assert_eq!(rows[0], "Pergunta,Resposta,Timestamp");
        assert!(rows[1].starts_with("Quem foi?,\"Gagarin, em 1961.\","));
        assert!(rows[2].starts_with("\"Disse \"\"oi\"\"?\",\"linha1\nlinha2\","));
        assert_eq!(rows.last(), Some(&""));
    }

    #[test]
    fn empty_conversation_has_header_only() {
        let csv = to_csv(&Conversation::new("c2", None));
        assert_eq!(csv, "\u{feff}Pergunta,Resposta,Timestamp\r\n");
    }

    #[test]
    fn json_export_is_the_stored_record() {
        let conversation = conversation();
        let json = to_json(&conversation).unwrap();
        assert!(json.contains("\n  \"id\": \"c1\""));
        let back: Conversation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, conversation);
    }
}
