//! Stream assembler: raw answer bytes in, message updates out
//!
//! [`StreamAssembler`] owns a [`LineDecoder`] and the running answer. Each
//! call to [`push`](StreamAssembler::push) returns the updates produced by
//! the lines that chunk completed, in receipt order. A `[DONE]` or
//! `[ERROR]` frame terminates the stream; anything after it, including
//! lines already buffered, is ignored.

use super::decoder::LineDecoder;
use super::frame::Frame;
use crate::chat::entities::{Message, Source};

/// Updates emitted while assembling an answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamUpdate {
    /// A fragment was appended; `content` is the whole answer so far
    Content { delta: String, content: String },
    /// A sources payload was received (attached on `Done`)
    Sources(Vec<Source>),
    /// A sources payload could not be parsed and was dropped
    SourcesDiscarded { reason: String },
    /// `[DONE]`: the final message with its sources attached
    Done(Message),
    /// `[ERROR]`: backend-signaled failure
    Error(String),
    /// Input ended without `[DONE]`: the message has no sources
    Closed(Message),
}

impl StreamUpdate {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StreamUpdate::Done(_) | StreamUpdate::Error(_) | StreamUpdate::Closed(_)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Streaming,
    Done,
    Failed,
    Closed,
    Aborted,
}

/// Incremental parser for one answer stream
#[derive(Debug)]
pub struct StreamAssembler {
    decoder: LineDecoder,
    content: String,
    sources: Vec<Source>,
    phase: Phase,
    frames: usize,
}

impl Default for StreamAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self {
            decoder: LineDecoder::new(),
            content: String::new(),
            sources: Vec::new(),
            phase: Phase::Streaming,
            frames: 0,
        }
    }

    /// Feed one chunk read from the response body.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamUpdate> {
        let mut updates = Vec::new();
        if self.is_terminated() {
            return updates;
        }

        for line in self.decoder.push(chunk) {
            self.process_line(&line, &mut updates);
            if self.is_terminated() {
                break;
            }
        }
        updates
    }

    /// Signal end of input.
    ///
    /// A residual line without a trailing newline is processed as a frame.
    /// If no terminal frame was seen the answer is closed without sources.
    pub fn finish(&mut self) -> Vec<StreamUpdate> {
        let mut updates = Vec::new();
        if self.is_terminated() {
            return updates;
        }

        if let Some(line) = self.decoder.finish() {
            self.process_line(&line, &mut updates);
        }

        if !self.is_terminated() {
            self.phase = Phase::Closed;
            updates.push(StreamUpdate::Closed(Message::assistant(self.content.clone())));
        }
        updates
    }

    /// Stop accepting input; later chunks no longer touch the answer.
    pub fn abort(&mut self) {
        if !self.is_terminated() {
            self.phase = Phase::Aborted;
        }
    }

    /// Answer text assembled so far
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Sources received so far (not yet attached unless finished)
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    /// Number of `data:` frames processed
    pub fn frames_seen(&self) -> usize {
        self.frames
    }

    pub fn is_terminated(&self) -> bool {
        self.phase != Phase::Streaming
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    pub fn is_aborted(&self) -> bool {
        self.phase == Phase::Aborted
    }

    /// The answer as a message; sources are attached only after `[DONE]`.
    pub fn message(&self) -> Message {
        let message = Message::assistant(self.content.clone());
        if self.is_done() {
            message.with_sources(self.sources.clone())
        } else {
            message
        }
    }

    fn process_line(&mut self, line: &str, updates: &mut Vec<StreamUpdate>) {
        let Some(frame) = Frame::parse_line(line) else {
            return;
        };
        self.frames += 1;

        match frame {
            Frame::Content(delta) => {
                if delta.is_empty() {
                    return;
                }
                self.content.push_str(&delta);
                updates.push(StreamUpdate::Content {
                    delta,
                    content: self.content.clone(),
                });
            }
            Frame::Sources(sources) => {
                self.sources = sources.clone();
                updates.push(StreamUpdate::Sources(sources));
            }
            Frame::MalformedSources(reason) => {
                self.sources.clear();
                updates.push(StreamUpdate::SourcesDiscarded { reason });
            }
            Frame::Done => {
                self.phase = Phase::Done;
                updates.push(StreamUpdate::Done(self.message()));
            }
            Frame::Error(message) => {
                self.phase = Phase::Failed;
                updates.push(StreamUpdate::Error(message));
            }
        }
    }
}
