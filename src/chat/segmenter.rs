//! Splits a raw generation stream into reasoning and answer channels.
//!
//! Reasoning models interleave `<think>`/`</think>` control markers with
//! content inside the same incremental fragments, and fragment boundaries do
//! not line up with marker boundaries. The [`Segmenter`] scans each fragment
//! with a single phase flag and holds back any trailing text that could be the
//! beginning of a marker until the next fragment arrives.

use std::collections::VecDeque;

use futures::stream::{self, Stream, StreamExt};

use super::event::StreamEvent;
use crate::error::ChatError;

/// Opens the reasoning block.
pub const THINK_START: &str = "<think>";
/// Closes the reasoning block.
pub const THINK_END: &str = "</think>";
/// End-of-sequence sentinels stripped from every fragment.
pub const END_SENTINELS: [&str; 3] = ["<|endoftext|>", "<|im_end|>", "<|end|>"];

const MARKERS: [&str; 5] = [
    THINK_START,
    THINK_END,
    END_SENTINELS[0],
    END_SENTINELS[1],
    END_SENTINELS[2],
];

/// Where the segmenter is relative to the reasoning block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// No boundary marker seen yet; content is dropped.
    #[default]
    Pending,
    /// Inside `<think>` ... `</think>`.
    Reasoning,
    /// After `</think>`.
    Answer,
}

#[derive(Debug, Default)]
pub struct Segmenter {
    phase: Phase,
    carry: String,
    finished: bool,
}

impl Segmenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Feeds one fragment and returns the channel events it completes.
    pub fn push(&mut self, fragment: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished || fragment.is_empty() {
            return events;
        }
        let mut text = std::mem::take(&mut self.carry);
        text.push_str(fragment);
        let held = carry_start(&text);
        self.carry = text.split_off(held);
        self.scan(&text, &mut events);
        events
    }

    /// Flushes held-back text and emits the terminal `Done`. Calling it again
    /// yields nothing.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }
        let rest = std::mem::take(&mut self.carry);
        self.scan(&rest, &mut events);
        events.push(StreamEvent::Done);
        self.finished = true;
        events
    }

    fn scan(&mut self, mut text: &str, events: &mut Vec<StreamEvent>) {
        loop {
            let start = text.find(THINK_START);
            let end = text.find(THINK_END);
            match (start, end) {
                (Some(s), e) if e.map_or(true, |e| s < e) => {
                    self.emit(&text[..s], events);
                    self.phase = Phase::Reasoning;
                    text = &text[s + THINK_START.len()..];
                }
                (_, Some(e)) => {
                    // whatever precedes the end marker closes the reasoning block,
                    // even when no start marker was seen
                    if let Some(content) = clean_chunk(&text[..e]) {
                        events.push(StreamEvent::Thinking { content });
                    }
                    self.phase = Phase::Answer;
                    text = &text[e + THINK_END.len()..];
                }
                _ => {
                    self.emit(text, events);
                    return;
                }
            }
        }
    }

    fn emit(&self, text: &str, events: &mut Vec<StreamEvent>) {
        let Some(content) = clean_chunk(text) else {
            return;
        };
        match self.phase {
            Phase::Pending => {}
            Phase::Reasoning => events.push(StreamEvent::Thinking { content }),
            Phase::Answer => events.push(StreamEvent::Response { content }),
        }
    }
}

/// Segments a whole fragment sequence at once.
pub fn segment<I, S>(fragments: I) -> Vec<StreamEvent>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut segmenter = Segmenter::new();
    let mut events = Vec::new();
    for fragment in fragments {
        events.extend(segmenter.push(fragment.as_ref()));
    }
    events.extend(segmenter.finish());
    events
}

struct SegmentState<S> {
    fragments: S,
    segmenter: Segmenter,
    queue: VecDeque<StreamEvent>,
    exhausted: bool,
}

/// Adapts a fragment stream into a stream of channel events.
///
/// An upstream error is reported as a single `Error` event; the remaining
/// fragments are not consumed and `Done` still terminates the stream.
pub fn segment_stream<S>(fragments: S) -> impl Stream<Item = StreamEvent> + Send
where
    S: Stream<Item = Result<String, ChatError>> + Send + Unpin,
{
    let state = SegmentState {
        fragments,
        segmenter: Segmenter::new(),
        queue: VecDeque::new(),
        exhausted: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.queue.pop_front() {
                return Some((event, state));
            }
            if state.exhausted {
                return None;
            }
            match state.fragments.next().await {
                Some(Ok(fragment)) => {
                    let events = state.segmenter.push(&fragment);
                    state.queue.extend(events);
                }
                Some(Err(err)) => {
                    log::warn!("generation stream failed: {err}");
                    state.queue.push_back(StreamEvent::Error {
                        message: err.to_string(),
                    });
                    let events = state.segmenter.finish();
                    state.queue.extend(events);
                    state.exhausted = true;
                }
                None => {
                    let events = state.segmenter.finish();
                    state.queue.extend(events);
                    state.exhausted = true;
                }
            }
        }
    })
}

/// Splits a complete generation into `(thinking, response)` at the last end
/// marker. Without an end marker everything is response.
pub fn split_reasoning(text: &str) -> (String, String) {
    match text.rfind(THINK_END) {
        Some(idx) => (
            clean_whole(&text[..idx]),
            clean_whole(&text[idx + THINK_END.len()..]),
        ),
        None => (String::new(), clean_whole(text)),
    }
}

fn clean_whole(text: &str) -> String {
    strip_sentinels(&text.replace(THINK_START, ""))
        .trim_matches('\n')
        .to_string()
}

fn clean_chunk(text: &str) -> Option<String> {
    let cleaned = strip_sentinels(text);
    if cleaned.trim().is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn strip_sentinels(text: &str) -> String {
    let mut cleaned = text.to_string();
    for sentinel in END_SENTINELS {
        if cleaned.contains(sentinel) {
            cleaned = cleaned.replace(sentinel, "");
        }
    }
    cleaned
}

/// Where the held-back carry begins. A whitespace-only run between the last
/// complete marker and a trailing marker prefix stays with the prefix, so it
/// is judged together with whatever completes it.
fn carry_start(text: &str) -> usize {
    let held = partial_marker_start(text);
    if held == text.len() {
        return held;
    }
    let before = &text[..held];
    let piece = MARKERS
        .iter()
        .filter_map(|&marker| before.rfind(marker).map(|idx| idx + marker.len()))
        .max()
        .unwrap_or(0);
    if before[piece..].trim().is_empty() {
        piece
    } else {
        held
    }
}

/// Byte offset of a trailing proper prefix of a marker, or `text.len()`.
fn partial_marker_start(text: &str) -> usize {
    for (idx, _) in text.match_indices('<') {
        let tail = &text[idx..];
        if MARKERS
            .iter()
            .any(|marker| marker.len() > tail.len() && marker.starts_with(tail))
        {
            return idx;
        }
    }
    text.len()
}

#[cfg(test)]
#[path = "segmenter_tests.rs"]
mod tests;
