// src/stream/session.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::extractors::{self, Fallbacks, ParsedDocument};
use crate::stream::sse::{decode_frame, StreamEvent};

// --- Accumulator ---
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Done,
    Failed(String),
}

/// Concatenates streamed chunks until a terminal event arrives.
#[derive(Debug, Clone)]
pub struct StreamAccumulator {
    text: String,
    model: Option<String>,
    state: StreamState,
}

impl Default for StreamAccumulator {
    fn default() -> Self {
        Self { text: String::new(), model: None, state: StreamState::Open }
    }
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one event. Returns false if the stream had already finished.
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        if self.is_finished() {
            tracing::trace!("Ignoring {:?} after stream finished", event);
            return false;
        }
        match event {
            StreamEvent::Start { model } => self.model = model,
            StreamEvent::Chunk(chunk) => self.text.push_str(&chunk),
            StreamEvent::Done => self.state = StreamState::Done,
            StreamEvent::Error(message) => {
                tracing::warn!("Stream failed after {} bytes: {}", self.text.len(), message);
                self.state = StreamState::Failed(message);
            }
        }
        true
    }

    pub fn is_finished(&self) -> bool {
        self.state != StreamState::Open
    }

    pub fn state(&self) -> &StreamState {
        &self.state
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Document parsed from the text received so far.
    pub fn snapshot(&self) -> ParsedDocument {
        extractors::parse(&self.text)
    }

    pub fn snapshot_with(&self, fallbacks: &mut dyn Fallbacks) -> ParsedDocument {
        extractors::parse_with(&self.text, fallbacks)
    }
}

// --- Generations ---
/// Identifies one request; only the most recent ticket is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Shared request counter. Cloning shares the same counter.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new request, superseding every earlier ticket.
    pub fn begin(&self) -> Ticket {
        Ticket(self.current.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.current.load(Ordering::SeqCst) == ticket.0
    }
}

// --- Preview Session ---
/// Live preview state: one accumulator per request, and updates for a
/// superseded request are dropped.
#[derive(Debug, Default)]
pub struct PreviewSession {
    generation: Generation,
    current: Option<(Ticket, StreamAccumulator)>,
}

/// A stream line tagged with the request it belongs to.
#[derive(Debug, Clone)]
pub struct Update {
    pub ticket: Ticket,
    pub line: String,
}

impl PreviewSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation.clone()
    }

    pub fn begin(&mut self) -> Ticket {
        let ticket = self.generation.begin();
        self.current = Some((ticket, StreamAccumulator::new()));
        tracing::debug!("Started stream generation {:?}", ticket);
        ticket
    }

    /// Applies `event` if `ticket` is still current. Returns whether it was applied.
    pub fn apply(&mut self, ticket: Ticket, event: StreamEvent) -> bool {
        if !self.generation.is_current(ticket) {
            tracing::debug!("Discarding event from stale generation {:?}", ticket);
            return false;
        }
        match &mut self.current {
            Some((active, accumulator)) if *active == ticket => accumulator.apply(event),
            _ => false,
        }
    }

    pub fn accumulator(&self) -> Option<&StreamAccumulator> {
        self.current.as_ref().map(|(_, accumulator)| accumulator)
    }

    pub fn is_finished(&self) -> bool {
        self.accumulator().map_or(false, StreamAccumulator::is_finished)
    }

    pub fn document(&self) -> Option<ParsedDocument> {
        self.accumulator().map(StreamAccumulator::snapshot)
    }

    /// Consumes tagged SSE lines until the current stream finishes or every
    /// sender is dropped.
    pub async fn run(&mut self, mut updates: mpsc::Receiver<Update>) {
        while let Some(update) = updates.recv().await {
            for event in decode_frame(&update.line) {
                self.apply(update.ticket, event);
            }
            if self.is_finished() {
                break;
            }
        }
        if !self.is_finished() {
            tracing::warn!("Stream ended without a done signal; keeping partial content");
        }
    }
}
