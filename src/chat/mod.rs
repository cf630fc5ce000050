mod event;
pub mod segmenter;
mod sse;
mod words;

pub use event::StreamEvent;
pub use segmenter::{segment, segment_stream, split_reasoning, Phase, Segmenter};
pub use sse::{create_ndjson_stream, create_sse_stream, sse_data, ParsedStream};
pub use words::WordBuffer;
