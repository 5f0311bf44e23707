//! Reassembles the model's streamed reply from raw SSE bytes.

use std::fmt::Display;

use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::error::AnalysisFailure;
use crate::progress::ProgressReporter;
use crate::sse::{classify, decode_payload, Decoded, LineFramer, SseLine, StreamEvent};

/// Accumulates `choices[0].delta.content` fragments until the stream
/// terminates, either through `[DONE]` or a non-empty `finish_reason`.
///
/// A data payload that fails to decode is held back and retried with the
/// following line appended, so a JSON object that the upstream broke over
/// several lines is never lost.
#[derive(Debug)]
pub struct DeltaAccumulator {
    framer: LineFramer,
    content: String,
    content_chars: usize,
    stream_done: bool,
    finish_reason: Option<String>,
    /// Payload text that has not yet formed valid JSON.
    deferred: Option<String>,
    progress: ProgressReporter,
    events: usize,
}

impl DeltaAccumulator {
    pub fn new(progress: ProgressReporter) -> Self {
        Self {
            framer: LineFramer::new(),
            content: String::new(),
            content_chars: 0,
            stream_done: false,
            finish_reason: None,
            deferred: None,
            progress,
            events: 0,
        }
    }

    /// Feed one transport chunk. Returns the progress labels that became
    /// due while processing it.
    pub fn ingest(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut labels = Vec::new();
        if self.stream_done {
            return labels;
        }
        self.framer.push(chunk);
        while !self.stream_done {
            let Some(line) = self.framer.next_line() else {
                break;
            };
            self.handle_line(&line, &mut labels);
        }
        labels
    }

    /// End of input. Flushes the unterminated remainder best-effort; a
    /// payload that still does not decode is dropped since nothing more is
    /// coming to complete it.
    pub fn finish(&mut self) -> Vec<String> {
        let mut labels = Vec::new();
        if self.stream_done {
            return labels;
        }
        for line in self.framer.finish() {
            if self.stream_done {
                break;
            }
            self.handle_line(&line, &mut labels);
        }
        if let Some(fragment) = self.deferred.take() {
            if !self.stream_done {
                debug!(
                    category = "relay",
                    len = fragment.len(),
                    "dropping undecodable trailing payload"
                );
            }
        }
        labels
    }

    fn handle_line(&mut self, line: &str, labels: &mut Vec<String>) {
        let Some(fragment) = self.deferred.take() else {
            match classify(line) {
                SseLine::Data(payload) => match decode_payload(payload) {
                    Decoded::Deferred => self.deferred = Some(payload.to_string()),
                    decoded => self.apply(decoded, labels),
                },
                SseLine::Comment | SseLine::Blank | SseLine::Other => {}
            }
            return;
        };

        let (continuation, is_data) = match classify(line) {
            SseLine::Comment | SseLine::Blank => {
                self.deferred = Some(fragment);
                return;
            }
            SseLine::Data(payload) => (payload, true),
            SseLine::Other => (line.trim(), false),
        };

        let merged = format!("{fragment}\n{continuation}");
        match decode_payload(&merged) {
            Decoded::Deferred => {}
            decoded => {
                self.apply(decoded, labels);
                return;
            }
        }

        // Only a new `data:` line that decodes on its own starts a new
        // event. A bare line is always part of the fragment.
        if !is_data {
            self.deferred = Some(merged);
            return;
        }
        match decode_payload(continuation) {
            decoded @ (Decoded::Event(_) | Decoded::Done) => {
                warn!(
                    category = "relay",
                    len = fragment.len(),
                    "abandoning incomplete payload, next event already started"
                );
                self.apply(decoded, labels);
            }
            Decoded::Deferred | Decoded::Ignored => self.deferred = Some(merged),
        }
    }

    fn apply(&mut self, decoded: Decoded, labels: &mut Vec<String>) {
        match decoded {
            Decoded::Event(event) => self.apply_event(event, labels),
            Decoded::Done => {
                debug!(category = "relay", events = self.events, "stream sentinel received");
                self.stream_done = true;
            }
            Decoded::Deferred | Decoded::Ignored => {}
        }
    }

    fn apply_event(&mut self, event: StreamEvent, labels: &mut Vec<String>) {
        self.events += 1;
        if let Some(text) = event.content {
            self.content_chars += text.chars().count();
            self.content.push_str(&text);
            if let Some(label) = self.progress.observe(self.content_chars) {
                labels.push(label.to_string());
            }
        }
        if let Some(reason) = event.finish_reason {
            debug!(category = "relay", reason = %reason, "stream finished");
            self.finish_reason = Some(reason);
            self.stream_done = true;
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }

    /// Content length in characters, as seen by the progress reporter.
    pub fn content_chars(&self) -> usize {
        self.content_chars
    }

    pub fn is_done(&self) -> bool {
        self.stream_done
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    /// Number of decoded events so far.
    pub fn events(&self) -> usize {
        self.events
    }

    pub fn has_deferred(&self) -> bool {
        self.deferred.is_some()
    }
}

/// Drive `stream` to termination, feeding every chunk into `acc` and
/// handing each due progress label to `on_label`.
///
/// Reading stops as soon as the accumulator reports the stream done; a
/// transport error mid-stream fails the whole consumption.
pub async fn consume<S, E>(
    mut stream: S,
    acc: &mut DeltaAccumulator,
    mut on_label: impl FnMut(String),
) -> Result<(), AnalysisFailure>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    while !acc.is_done() {
        match stream.next().await {
            Some(Ok(chunk)) => acc.ingest(&chunk).into_iter().for_each(&mut on_label),
            Some(Err(e)) => {
                warn!(category = "relay", "stream read failed: {e}");
                return Err(AnalysisFailure::Transport(e.to_string()));
            }
            None => break,
        }
    }
    acc.finish().into_iter().for_each(&mut on_label);
    Ok(())
}
