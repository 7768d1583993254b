// src/stream/sse.rs
use serde::Deserialize;

/// One decoded event from the summarization backend's event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Start { model: Option<String> },
    Chunk(String),
    Done,
    Error(String),
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::Done | StreamEvent::Error(_))
    }
}

const DONE_MARKER: &str = "[DONE]";

/// JSON payload of a `data:` line. Every field is optional on the wire.
#[derive(Debug, Deserialize)]
struct FramePayload {
    status: Option<String>,
    model: Option<String>,
    content: Option<String>,
    error: Option<String>,
    finish_reason: Option<String>,
}

/// Decodes one line of an SSE transcript into the events it carries, in
/// order. Lines other than `data:` frames (comments, `event:` lines, blank
/// separators) yield nothing. A frame with both content and a
/// `finish_reason` yields the chunk followed by `Done`.
pub fn decode_frame(line: &str) -> Vec<StreamEvent> {
    let Some(payload) = line.trim().strip_prefix("data:").map(str::trim) else {
        return Vec::new();
    };
    if payload.is_empty() {
        return Vec::new();
    }
    if payload == DONE_MARKER {
        return vec![StreamEvent::Done];
    }

    let frame: FramePayload = match serde_json::from_str(payload) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Malformed stream frame {:?}: {}", payload, e);
            return vec![StreamEvent::Error(format!("malformed stream frame: {}", e))];
        }
    };

    if let Some(error) = frame.error {
        return vec![StreamEvent::Error(error)];
    }

    let mut events = Vec::new();
    if frame.status.as_deref() == Some("start") {
        events.push(StreamEvent::Start { model: frame.model });
    }
    if let Some(content) = frame.content {
        events.push(StreamEvent::Chunk(content));
    }
    match frame.finish_reason.as_deref() {
        Some("error") => events.push(StreamEvent::Error("stream finished with an error".to_string())),
        Some(_) => events.push(StreamEvent::Done),
        None => {}
    }

    if events.is_empty() {
        tracing::trace!("Ignoring stream frame without content: {:?}", payload);
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_frames() {
        assert_eq!(
            decode_frame(r#"data: {"model": "qwen", "status": "start"}"#),
            vec![StreamEvent::Start { model: Some("qwen".to_string()) }]
        );
        assert_eq!(
            decode_frame(r#"data: {"content": "<summary>", "finish_reason": null}"#),
            vec![StreamEvent::Chunk("<summary>".to_string())]
        );
        assert_eq!(decode_frame("data: [DONE]"), vec![StreamEvent::Done]);
        assert_eq!(decode_frame(r#"data: {"finish_reason": "stop"}"#), vec![StreamEvent::Done]);
        assert_eq!(
            decode_frame(r#"data: {"error": "quota exceeded", "finish_reason": "error"}"#),
            vec![StreamEvent::Error("quota exceeded".to_string())]
        );
    }

    #[test]
    fn test_final_chunk_carries_finish_reason() {
        let events = decode_frame(r#"data: {"content": "tail", "finish_reason": "stop"}"#);
        assert_eq!(events, vec![StreamEvent::Chunk("tail".to_string()), StreamEvent::Done]);
        assert!(events.last().unwrap().is_terminal());

        let events = decode_frame(r#"data: {"content": "half", "finish_reason": "error"}"#);
        assert_eq!(events[0], StreamEvent::Chunk("half".to_string()));
        assert!(matches!(events[1], StreamEvent::Error(_)));
    }

    #[test]
    fn test_non_data_lines_are_ignored() {
        assert!(decode_frame("").is_empty());
        assert!(decode_frame(": keep-alive").is_empty());
        assert!(decode_frame("event: message").is_empty());
        assert!(decode_frame("data:").is_empty());
        assert!(decode_frame(r#"data: {"finish_reason": null}"#).is_empty());
    }

    #[test]
    fn test_malformed_payload_is_an_error_event() {
        let events = decode_frame("data: {not json");
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], StreamEvent::Error(_)));
        assert!(events[0].is_terminal());
    }
}
