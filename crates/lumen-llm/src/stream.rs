use std::fmt::Display;

use futures_util::{Stream, StreamExt};

use crate::{ChatResponse, LlmError};

const DATA_PREFIX: &str = "data:";
const DONE_SENTINEL: &str = "[DONE]";

/// Consume a server-sent-event body of chat-completion chunks
///
/// Partial lines are buffered across reads. Every complete `data:` line is
/// parsed as its own chunk and handed to `on_chunk` in arrival order, so both
/// `\n` and `\n\n` framing work. Returns the chunk whose first choice finished
/// with `stop`, or an empty response if none did. Unparseable chunks are
/// logged and skipped.
pub(crate) async fn read_event_stream<S, B, E, F>(body: S, mut on_chunk: F) -> Result<ChatResponse, LlmError>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
    F: FnMut(&ChatResponse),
{
    futures_util::pin_mut!(body);

    let mut buffer: Vec<u8> = Vec::new();
    let mut terminal = None;

    while let Some(bytes) = body.next().await {
        let bytes = bytes.map_err(|e| LlmError::Streaming(e.to_string()))?;
        buffer.extend_from_slice(bytes.as_ref());

        while let Some(newline) = buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = buffer.drain(..=newline).collect();
            if handle_line(&line, &mut terminal, &mut on_chunk) == Flow::Done {
                return Ok(terminal.unwrap_or_default());
            }
        }
    }

    // The last line may arrive without a trailing newline
    if !buffer.is_empty() {
        handle_line(&buffer, &mut terminal, &mut on_chunk);
    }

    Ok(terminal.unwrap_or_default())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Done,
}

fn handle_line<F>(line: &[u8], terminal: &mut Option<ChatResponse>, on_chunk: &mut F) -> Flow
where
    F: FnMut(&ChatResponse),
{
    let line = String::from_utf8_lossy(line);
    let Some(data) = line.trim_end_matches(['\r', '\n']).strip_prefix(DATA_PREFIX) else {
        return Flow::Continue;
    };

    let data = data.trim();
    if data.is_empty() {
        return Flow::Continue;
    }
    if data == DONE_SENTINEL {
        return Flow::Done;
    }

    match serde_json::from_str::<ChatResponse>(data) {
        Ok(chunk) => {
            on_chunk(&chunk);
            if chunk.is_terminal() {
                *terminal = Some(chunk);
            }
        }
        Err(e) => {
            tracing::debug!(error = %e, data = %data, "skipping unparseable SSE chunk");
        }
    }

    Flow::Continue
}

/// Collects streamed deltas into the final text
#[derive(Debug, Default, Clone)]
pub struct StreamAccumulator {
    text: String,
    finish_reason: Option<String>,
    chunks: usize,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the first choice's delta content
    pub fn push(&mut self, chunk: &ChatResponse) {
        self.chunks += 1;

        let Some(choice) = chunk.choices.first() else {
            return;
        };

        if let Some(content) = choice.delta.as_ref().and_then(|d| d.content.as_deref()) {
            self.text.push_str(content);
        }
        if let Some(reason) = &choice.finish_reason {
            self.finish_reason = Some(reason.clone());
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    /// Number of chunks seen, including ones without content
    pub const fn chunks(&self) -> usize {
        self.chunks
    }

    pub fn into_text(self) -> String {
        self.text
    }
}
