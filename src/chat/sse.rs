use std::pin::Pin;

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};

use crate::error::ChatError;

const SSE_DELIMITER: &str = "\n\n";
const NDJSON_DELIMITER: &str = "\n";

pub type ParsedStream<T> = Pin<Box<dyn Stream<Item = Result<T, ChatError>> + Send>>;

/// Splits a Server-Sent-Events body into events (blank-line delimited) and
/// hands each one to `parser`.
pub fn create_sse_stream<T, F>(response: reqwest::Response, parser: F) -> ParsedStream<T>
where
    T: Send + 'static,
    F: Fn(&str) -> Result<Option<T>, ChatError> + Send + 'static,
{
    create_delimited_stream(response, SSE_DELIMITER, parser)
}

/// Splits a newline-delimited JSON body into lines and hands each one to
/// `parser`.
pub fn create_ndjson_stream<T, F>(response: reqwest::Response, parser: F) -> ParsedStream<T>
where
    T: Send + 'static,
    F: Fn(&str) -> Result<Option<T>, ChatError> + Send + 'static,
{
    create_delimited_stream(response, NDJSON_DELIMITER, parser)
}

fn create_delimited_stream<T, F>(
    response: reqwest::Response,
    delimiter: &'static str,
    parser: F,
) -> ParsedStream<T>
where
    T: Send + 'static,
    F: Fn(&str) -> Result<Option<T>, ChatError> + Send + 'static,
{
    let body = response.bytes_stream().map(Some).chain(futures::stream::once(async { None }));
    let stream = body
        .scan(FrameState::new(delimiter), move |state, chunk| {
            let results = match chunk {
                Some(chunk) => handle_chunk(state, chunk, &parser),
                None => state.drain_tail(&parser),
            };
            async move { Some(results) }
        })
        .flat_map(futures::stream::iter);

    Box::pin(stream)
}

struct FrameState {
    delimiter: &'static str,
    buffer: String,
    utf8_buffer: Vec<u8>,
}

fn handle_chunk<T, F>(
    state: &mut FrameState,
    chunk: Result<Bytes, reqwest::Error>,
    parser: &F,
) -> Vec<Result<T, ChatError>>
where
    F: Fn(&str) -> Result<Option<T>, ChatError>,
{
    let bytes = match chunk {
        Ok(bytes) => bytes,
        Err(err) => return vec![Err(ChatError::HttpError(err.to_string()))],
    };

    state.push_bytes(&bytes);
    state.drain_events(parser)
}

impl FrameState {
    fn new(delimiter: &'static str) -> Self {
        Self {
            delimiter,
            buffer: String::new(),
            utf8_buffer: Vec::new(),
        }
    }

    fn push_bytes(&mut self, bytes: &[u8]) {
        self.utf8_buffer.extend_from_slice(bytes);
        match std::str::from_utf8(&self.utf8_buffer) {
            Ok(text) => {
                self.buffer.push_str(&text.replace("\r\n", "\n"));
                self.utf8_buffer.clear();
            }
            Err(err) => self.consume_valid_prefix(err.valid_up_to()),
        }
    }

    fn consume_valid_prefix(&mut self, valid_up_to: usize) {
        if valid_up_to == 0 {
            return;
        }

        let valid = String::from_utf8_lossy(&self.utf8_buffer[..valid_up_to]);
        self.buffer.push_str(&valid.replace("\r\n", "\n"));
        self.utf8_buffer.drain(..valid_up_to);
    }

    fn drain_events<T, F>(&mut self, parser: &F) -> Vec<Result<T, ChatError>>
    where
        F: Fn(&str) -> Result<Option<T>, ChatError>,
    {
        let mut results = Vec::new();
        while let Some(event) = self.next_event() {
            push_parsed(&mut results, parser(&event));
        }
        results
    }

    /// A body that ends without a trailing delimiter still carries one frame.
    fn drain_tail<T, F>(&mut self, parser: &F) -> Vec<Result<T, ChatError>>
    where
        F: Fn(&str) -> Result<Option<T>, ChatError>,
    {
        let mut results = Vec::new();
        let tail = std::mem::take(&mut self.buffer);
        if !tail.trim().is_empty() {
            push_parsed(&mut results, parser(&tail));
        }
        results
    }

    fn next_event(&mut self) -> Option<String> {
        let pos = self.buffer.find(self.delimiter)?;
        let end = pos + self.delimiter.len();
        let event = self.buffer[..end].to_string();
        self.buffer.drain(..end);
        Some(event)
    }
}

fn push_parsed<T>(results: &mut Vec<Result<T, ChatError>>, parsed: Result<Option<T>, ChatError>) {
    match parsed {
        Ok(Some(content)) => results.push(Ok(content)),
        Ok(None) => {}
        Err(err) => results.push(Err(err)),
    }
}

/// Extracts the joined `data:` payload of one SSE event, if any.
pub fn sse_data(event: &str) -> Option<String> {
    let lines: Vec<&str> = event
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
#[path = "sse_tests.rs"]
mod tests;
