//! Server-sent-events line framing and per-line event decoding.
//!
//! The framer is purely syntactic: it turns arbitrarily sized byte chunks
//! into `\n`-terminated lines and never fails. The decoder classifies one
//! framed line at a time and reports `Deferred` instead of an error when a
//! data payload is not (yet) valid JSON.

use serde_json::Value;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

// ── Line framer ──────────────────────────────────────────────────────────

/// Splits an incoming byte stream into lines.
///
/// A line is only emitted once its terminating `\n` has arrived; a trailing
/// `\r` is stripped. Multi-byte characters split across chunks are held
/// back until complete.
#[derive(Debug, Default)]
pub struct LineFramer {
    /// Decoded text not yet emitted as a line.
    pending: String,
    /// Tail of an incomplete UTF-8 sequence from the previous chunk.
    partial_utf8: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) {
        self.partial_utf8.extend_from_slice(chunk);
        drain_utf8(&mut self.partial_utf8, &mut self.pending);
    }

    /// Pop the next complete line, if one is buffered.
    pub fn next_line(&mut self) -> Option<String> {
        let nl = self.pending.find('\n')?;
        let mut line: String = self.pending.drain(..=nl).collect();
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
        Some(line)
    }

    /// Text received but not yet emitted as a line.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.partial_utf8.is_empty()
    }

    /// End of input: emit everything that is left, including an
    /// unterminated final line. Dangling partial UTF-8 becomes U+FFFD.
    pub fn finish(&mut self) -> Vec<String> {
        if !self.partial_utf8.is_empty() {
            self.pending
                .push_str(&String::from_utf8_lossy(&self.partial_utf8));
            self.partial_utf8.clear();
        }
        let rest = std::mem::take(&mut self.pending);
        if rest.is_empty() {
            return Vec::new();
        }
        let mut lines: Vec<String> = rest
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
            .collect();
        if rest.ends_with('\n') {
            lines.pop();
        }
        lines
    }
}

/// Move the longest valid UTF-8 prefix of `bytes` into `out`, replacing
/// invalid sequences and keeping an incomplete trailing sequence in `bytes`.
fn drain_utf8(bytes: &mut Vec<u8>, out: &mut String) {
    loop {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                out.push_str(s);
                bytes.clear();
                return;
            }
            Err(e) => {
                let valid = e.valid_up_to();
                out.push_str(std::str::from_utf8(&bytes[..valid]).unwrap_or_default());
                match e.error_len() {
                    Some(bad) => {
                        out.push(char::REPLACEMENT_CHARACTER);
                        bytes.drain(..valid + bad);
                    }
                    None => {
                        bytes.drain(..valid);
                        return;
                    }
                }
            }
        }
    }
}

// ── Event decoder ────────────────────────────────────────────────────────

/// Syntactic class of one framed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// Starts with `:` (keep-alive / comment).
    Comment,
    Blank,
    /// `data: ` line; carries the trimmed payload.
    Data(&'a str),
    /// Anything else. Skipped, never an error.
    Other,
}

pub fn classify(line: &str) -> SseLine<'_> {
    if line.starts_with(':') {
        SseLine::Comment
    } else if line.trim().is_empty() {
        SseLine::Blank
    } else if let Some(rest) = line.strip_prefix(DATA_PREFIX) {
        SseLine::Data(rest.trim())
    } else {
        SseLine::Other
    }
}

/// One decoded chunk of the upstream's chat-completion stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub raw: String,
    /// `choices[0].delta.content`
    pub content: Option<String>,
    /// `choices[0].finish_reason`, when non-empty.
    pub finish_reason: Option<String>,
}

impl StreamEvent {
    /// `None` when `raw` is not valid JSON. Valid JSON of any other shape
    /// decodes to an event with neither content nor finish reason.
    pub fn parse(raw: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(raw).ok()?;
        let choice = value.pointer("/choices/0");
        let content = choice
            .and_then(|c| c.pointer("/delta/content"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let finish_reason = choice
            .and_then(|c| c.get("finish_reason"))
            .and_then(|f| match f {
                Value::Null | Value::Bool(false) => None,
                Value::String(s) if s.is_empty() => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            });
        Some(Self {
            raw: raw.to_string(),
            content,
            finish_reason,
        })
    }
}

/// Outcome of decoding a single line.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Event(StreamEvent),
    /// The `[DONE]` sentinel.
    Done,
    /// Payload is not valid JSON yet; the line is a fragment of a payload
    /// that continues on a later line.
    Deferred,
    Ignored,
}

pub fn decode_payload(payload: &str) -> Decoded {
    if payload == DONE_SENTINEL {
        return Decoded::Done;
    }
    // A bare "data:" carries nothing worth waiting for.
    if payload.is_empty() {
        return Decoded::Ignored;
    }
    match StreamEvent::parse(payload) {
        Some(ev) => Decoded::Event(ev),
        None => Decoded::Deferred,
    }
}

pub fn decode_line(line: &str) -> Decoded {
    match classify(line) {
        SseLine::Data(payload) => decode_payload(payload),
        SseLine::Comment | SseLine::Blank | SseLine::Other => Decoded::Ignored,
    }
}
