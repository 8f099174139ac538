//! Server-sent-event framing for streamed chat completions.

use serde::Deserialize;

/// One complete frame extracted from the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Payload of a `data:` line.
    Data(String),
    /// The `[DONE]` end-of-stream sentinel.
    Done,
}

/// Reassembles SSE frames from arbitrarily chunked transport bytes.
///
/// A single chunk may carry several frames, or a frame may be split across
/// chunks; incomplete trailing lines are buffered until the next chunk.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    buf: String,
}

impl FrameBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a transport chunk and return the frames it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buf.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(pos) = self.buf.find('\n') {
            let mut line: String = self.buf.drain(..=pos).collect();
            while line.ends_with('\n') || line.ends_with('\r') {
                line.pop();
            }

            let line = line.trim();
            // Blank keep-alives and comment lines carry nothing.
            if line.is_empty() || line.starts_with(':') {
                continue;
            }
            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };

            let data = data.trim();
            if data == "[DONE]" {
                frames.push(SseFrame::Done);
            } else {
                frames.push(SseFrame::Data(data.to_string()));
            }
        }
        frames
    }
}

#[derive(Debug, Deserialize)]
struct StreamFrame {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: StreamDelta,
}

#[derive(Debug, Default, Deserialize)]
struct StreamDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the incremental text fragment from one `data:` payload.
///
/// Returns `Ok(None)` for well-formed frames that carry no text (role
/// announcements, finish markers).
///
/// # Errors
///
/// Returns the parse error for malformed frames; callers skip these.
pub fn delta_fragment(data: &str) -> Result<Option<String>, serde_json::Error> {
    let frame: StreamFrame = serde_json::from_str(data)?;
    Ok(frame
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content))
}
